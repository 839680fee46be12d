//! Config loading and `config init`

use crate::cli::{ConfigInitArgs, GlobalArgs};
use crate::config::KnowhubConfig;
use anyhow::Context;
use std::fs;

const EXAMPLE_CONFIG: &str = include_str!("../../knowhub.example.toml");

/// Load configuration with CLI overrides
///
/// A missing config file is not an error; defaults apply.
pub fn load_config(args: &GlobalArgs) -> anyhow::Result<KnowhubConfig> {
    let mut config = if args.config.exists() {
        KnowhubConfig::load(Some(&args.config))
            .with_context(|| format!("loading {}", args.config.display()))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        KnowhubConfig::default()
    };

    config = config.with_env_overrides();

    if let Some(ref url) = args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Handle `knowhub config init` command
pub fn handle_config_init(args: &ConfigInitArgs) -> anyhow::Result<()> {
    if args.output.exists() && !args.force {
        anyhow::bail!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        );
    }

    fs::write(&args.output, EXAMPLE_CONFIG)?;

    println!("✓ Configuration file created: {}", args.output.display());
    println!("  Edit this file to point at your Knowhub instance.");

    Ok(())
}
