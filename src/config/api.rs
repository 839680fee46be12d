//! Backend API connection settings

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Who is calling the backend.
///
/// Sent on every request in the `X-Client-Type` header so the backend can
/// tell interactive users apart from registered agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CallerKind {
    #[default]
    Human,
    Agent,
}

impl CallerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallerKind::Human => "human",
            CallerKind::Agent => "agent",
        }
    }
}

impl FromStr for CallerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(CallerKind::Human),
            "agent" => Ok(CallerKind::Agent),
            _ => Err(format!("Invalid caller kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every request path is appended to
    pub base_url: String,
    pub caller: CallerKind,
    /// Agent identifier, required when `caller = "agent"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Per-request timeout. Unset means the HTTP stack's own behaviour applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Join `path` onto the base URL, tolerating slashes on either side.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            caller: CallerKind::Human,
            client_id: None,
            timeout_seconds: None,
        }
    }
}
