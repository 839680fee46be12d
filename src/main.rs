use clap::Parser;
use knowhub::cli::{
    chat, debug_panel, entities, handle_completions, handle_config_init, load_config, request,
    Cli, Commands, ConfigCommands, GlobalArgs,
};
use knowhub::config::KnowhubConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Config(ConfigCommands::Init(args)) => handle_config_init(&args),
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
        Commands::Request(args) => match setup(&cli.global) {
            Ok(config) => request::handle_request(&args, &config).await.map(print),
            Err(e) => Err(e),
        },
        Commands::Entities(cmd) => match setup(&cli.global) {
            Ok(config) => entities::handle_entities(&cmd, &config).await.map(print),
            Err(e) => Err(e),
        },
        Commands::Chat(args) => match setup(&cli.global) {
            Ok(config) => chat::handle_chat(&args, &config).await,
            Err(e) => Err(e),
        },
        Commands::DebugPanel(cmd) => {
            setup(&cli.global).and_then(|config| {
                debug_panel::handle_debug_panel(&cmd, &config).map(print)
            })
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration and start logging for commands that talk to the API.
fn setup(global: &GlobalArgs) -> anyhow::Result<KnowhubConfig> {
    let config = load_config(global)?;
    if let Err(e) = knowhub::logging::init_tracing(&config.logging) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }
    Ok(config)
}

fn print(output: String) {
    println!("{}", output);
}
