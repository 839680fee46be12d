//! Debug call-log settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default ring buffer capacity
pub const DEFAULT_MAX_ENTRIES: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Record every API call into the in-memory debug log
    pub enabled: bool,
    pub max_entries: usize,
    /// Directory holding persisted panel preferences
    pub state_dir: PathBuf,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: DEFAULT_MAX_ENTRIES,
            state_dir: PathBuf::from(".knowhub"),
        }
    }
}
