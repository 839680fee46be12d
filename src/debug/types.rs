//! Type definitions for the debug call log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

/// HTTP verb of a recorded call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(format!("Unsupported HTTP method: {}", s)),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A finalized API call record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugEntry {
    pub id: String,
    pub method: HttpMethod,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Milliseconds between dispatch and completion
    #[serde(rename = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Dispatch time
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DebugEntry {
    /// Status in `[200, 400)` with no error attached.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && matches!(self.status, Some(s) if (200..400).contains(&s))
    }

    /// Status missing, status >= 400, or an error attached.
    pub fn is_error(&self) -> bool {
        match self.status {
            None => true,
            Some(s) => s >= 400 || self.error.is_some(),
        }
    }
}

/// The dispatch half of a call record, held until the call completes.
///
/// Consumed by [`PendingEntry::finish`], so a record's duration is computed
/// exactly once.
#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub id: String,
    pub method: HttpMethod,
    pub url: String,
    pub request_body: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
    started: Instant,
}

impl PendingEntry {
    pub fn new(
        id: String,
        method: HttpMethod,
        url: String,
        request_body: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id,
            method,
            url,
            request_body,
            timestamp: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn finish(
        self,
        status: u16,
        response_body: Option<serde_json::Value>,
        error: Option<String>,
    ) -> DebugEntry {
        DebugEntry {
            id: self.id,
            method: self.method,
            url: self.url,
            request_body: self.request_body,
            response_body,
            status: Some(status),
            duration_ms: Some(self.started.elapsed().as_millis() as u64),
            timestamp: self.timestamp,
            error,
        }
    }
}

/// Which slice of the log the debug panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugFilter {
    #[default]
    All,
    Success,
    Error,
}

impl DebugFilter {
    pub fn matches(&self, entry: &DebugEntry) -> bool {
        match self {
            DebugFilter::All => true,
            DebugFilter::Success => entry.is_success(),
            DebugFilter::Error => entry.is_error(),
        }
    }
}

impl fmt::Display for DebugFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DebugFilter::All => "all",
            DebugFilter::Success => "success",
            DebugFilter::Error => "error",
        };
        f.write_str(s)
    }
}

impl FromStr for DebugFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(DebugFilter::All),
            "success" => Ok(DebugFilter::Success),
            "error" => Ok(DebugFilter::Error),
            _ => Err(format!("Invalid debug filter: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: Option<u16>, error: Option<&str>) -> DebugEntry {
        DebugEntry {
            id: "e".to_string(),
            method: HttpMethod::Get,
            url: "http://kb/api/entities".to_string(),
            request_body: None,
            response_body: None,
            status,
            duration_ms: Some(3),
            timestamp: Utc::now(),
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_success_range_boundaries() {
        assert!(!entry(Some(199), None).is_success());
        assert!(entry(Some(200), None).is_success());
        assert!(entry(Some(399), None).is_success());
        assert!(!entry(Some(400), None).is_success());
        assert!(!entry(None, None).is_success());
    }

    #[test]
    fn test_error_classification() {
        assert!(entry(None, None).is_error());
        assert!(entry(Some(403), None).is_error());
        assert!(entry(Some(200), Some("decode failed")).is_error());
        assert!(!entry(Some(204), None).is_error());
    }

    #[test]
    fn test_pending_finish_sets_duration_and_status() {
        let pending = PendingEntry::new(
            "abc".to_string(),
            HttpMethod::Post,
            "http://kb/api/teams".to_string(),
            Some(serde_json::json!({"name": "core"})),
        );
        let dispatched = pending.timestamp;

        let done = pending.finish(201, Some(serde_json::json!({"success": true})), None);
        assert_eq!(done.status, Some(201));
        assert!(done.duration_ms.is_some());
        assert_eq!(done.timestamp, dispatched);
        assert_eq!(done.request_body, Some(serde_json::json!({"name": "core"})));
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let json = serde_json::to_value(entry(Some(200), None)).unwrap();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["duration"], 3);
        assert!(json.get("error").is_none());
        assert!(json.get("requestBody").is_none());
    }

    #[test]
    fn test_filter_parse_and_display() {
        assert_eq!("ERROR".parse::<DebugFilter>().unwrap(), DebugFilter::Error);
        assert_eq!(DebugFilter::Success.to_string(), "success");
        assert!("failed".parse::<DebugFilter>().is_err());
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!("delete".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert_eq!(reqwest::Method::from(HttpMethod::Put), reqwest::Method::PUT);
        assert!("PATCH".parse::<HttpMethod>().is_err());
    }
}
