//! `knowhub debug-panel` - persisted panel preferences

use crate::cli::output::format_preferences;
use crate::cli::DebugPanelCommands;
use crate::config::KnowhubConfig;
use crate::debug::DebugPreferences;

pub fn handle_debug_panel(
    cmd: &DebugPanelCommands,
    config: &KnowhubConfig,
) -> anyhow::Result<String> {
    let state_dir = &config.debug.state_dir;
    let mut prefs = DebugPreferences::load(state_dir)?;

    match cmd {
        DebugPanelCommands::Show => return Ok(format_preferences(&prefs)),
        DebugPanelCommands::Open => prefs.is_open = true,
        DebugPanelCommands::Close => prefs.is_open = false,
        DebugPanelCommands::Filter(args) => prefs.filter = args.filter,
    }

    prefs.save(state_dir)?;
    Ok(format_preferences(&prefs))
}
