//! CLI module for Knowhub
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `request` - Send a raw API call and print the envelope
//! - `entities` - List, show and delete knowledge-graph entities
//! - `chat` - Stream an assistant reply for a conversation
//! - `debug-panel` - Show or change persisted debug panel preferences
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # List projects and show the recorded call log afterwards
//! knowhub request GET /entities --query type=Project --show-debug
//!
//! # Only show failed calls in the debug log from now on
//! knowhub debug-panel filter error
//! ```

pub mod chat;
pub mod completions;
pub mod config;
pub mod debug_panel;
pub mod entities;
pub mod output;
pub mod request;

pub use completions::handle_completions;
pub use config::{handle_config_init, load_config};

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::client::ClientError;
use crate::debug::{DebugFilter, HttpMethod};

/// Knowhub - knowledge platform client
#[derive(Parser, Debug)]
#[command(
    name = "knowhub",
    version,
    about = "Client for the Knowhub knowledge platform API"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "knowhub.toml")]
    pub config: PathBuf,

    /// Override the API base URL
    #[arg(long, global = true, env = "KNOWHUB_API_URL")]
    pub api_url: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, env = "KNOWHUB_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a raw API call
    Request(RequestArgs),
    /// Work with knowledge-graph entities
    #[command(subcommand)]
    Entities(EntitiesCommands),
    /// Stream a chat reply
    Chat(ChatArgs),
    /// Debug panel preferences
    #[command(subcommand)]
    DebugPanel(DebugPanelCommands),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, DELETE)
    pub method: HttpMethod,

    /// Path relative to the API base URL (e.g., /entities)
    pub path: String,

    /// JSON request body
    #[arg(short, long)]
    pub body: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(short, long = "query", value_parser = parse_key_value)]
    pub query: Vec<(String, String)>,

    /// Print the recorded call log after the request
    #[arg(long)]
    pub show_debug: bool,

    /// Print the call log as JSON instead of a table
    #[arg(long, requires = "show_debug")]
    pub debug_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum EntitiesCommands {
    /// List entities
    List(EntitiesListArgs),
    /// Show one entity as JSON
    Get(EntityIdArgs),
    /// Delete an entity
    Delete(EntityIdArgs),
}

#[derive(Args, Debug)]
pub struct EntitiesListArgs {
    /// Restrict to one entity type (e.g., Project, Person)
    #[arg(short = 't', long = "type")]
    pub entity_type: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct EntityIdArgs {
    pub id: String,
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Conversation to reply in
    pub conversation_id: String,

    /// Message text
    #[arg(required = true)]
    pub message: Vec<String>,

    /// Persona to answer as
    #[arg(short, long)]
    pub persona: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum DebugPanelCommands {
    /// Show current preferences
    Show,
    /// Mark the panel open
    Open,
    /// Mark the panel closed
    Close,
    /// Set which calls the panel shows
    Filter(DebugFilterArgs),
}

#[derive(Args, Debug)]
pub struct DebugFilterArgs {
    /// all, success or error
    pub filter: DebugFilter,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "knowhub.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Surface the message a user should see; full details are already logged.
pub(crate) fn user_error(err: ClientError) -> anyhow::Error {
    anyhow::anyhow!(err.user_message())
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .filter(|(k, _)| !k.is_empty())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}
