//! Persisted debug panel preferences
//!
//! Only the panel's view state is written to disk. The call history itself
//! never leaves memory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::debug::types::DebugFilter;

/// File name under the state directory
pub const PREFERENCES_FILE: &str = "debug-panel.json";

#[derive(Error, Debug)]
pub enum PreferencesError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt preferences file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebugPreferences {
    pub is_open: bool,
    pub filter: DebugFilter,
}

impl DebugPreferences {
    pub fn path_in(state_dir: &Path) -> PathBuf {
        state_dir.join(PREFERENCES_FILE)
    }

    /// Read preferences from `state_dir`, falling back to defaults when none
    /// have been saved yet.
    pub fn load(state_dir: &Path) -> Result<Self, PreferencesError> {
        let path = Self::path_in(state_dir);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| PreferencesError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| PreferencesError::Parse {
            path,
            message: e.to_string(),
        })
    }

    pub fn save(&self, state_dir: &Path) -> Result<(), PreferencesError> {
        std::fs::create_dir_all(state_dir).map_err(|source| PreferencesError::Io {
            path: state_dir.to_path_buf(),
            source,
        })?;

        let path = Self::path_in(state_dir);
        let content = serde_json::to_string_pretty(self).map_err(|e| PreferencesError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|source| PreferencesError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = DebugPreferences::load(dir.path()).unwrap();
        assert_eq!(prefs, DebugPreferences::default());
        assert!(!prefs.is_open);
        assert_eq!(prefs.filter, DebugFilter::All);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let state_dir = dir.path().join("nested").join("state");

        let prefs = DebugPreferences {
            is_open: true,
            filter: DebugFilter::Error,
        };
        prefs.save(&state_dir).unwrap();

        assert_eq!(DebugPreferences::load(&state_dir).unwrap(), prefs);
    }

    #[test]
    fn test_file_holds_only_view_state() {
        let dir = tempfile::tempdir().unwrap();
        DebugPreferences {
            is_open: true,
            filter: DebugFilter::Success,
        }
        .save(dir.path())
        .unwrap();

        let raw = std::fs::read_to_string(DebugPreferences::path_in(dir.path())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(value["isOpen"], true);
        assert_eq!(value["filter"], "success");
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(DebugPreferences::path_in(dir.path()), "{not json").unwrap();

        assert!(matches!(
            DebugPreferences::load(dir.path()),
            Err(PreferencesError::Parse { .. })
        ));
    }
}
