//! Caller identification headers sent with every request.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};

use crate::client::error::ClientError;
use crate::config::{ApiConfig, CallerKind};

/// Distinguishes interactive users from registered agents.
pub const CLIENT_TYPE_HEADER: &str = "x-client-type";
/// Identifier of the calling agent.
pub const AGENT_ID_HEADER: &str = "x-agent-id";

/// Build the default header set for a client.
pub fn identification_headers(config: &ApiConfig) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static(CLIENT_TYPE_HEADER),
        HeaderValue::from_static(config.caller.as_str()),
    );

    if config.caller == CallerKind::Agent {
        if let Some(client_id) = &config.client_id {
            let value = HeaderValue::from_str(client_id).map_err(|e| {
                ClientError::Configuration(format!("invalid client id '{}': {}", client_id, e))
            })?;
            headers.insert(HeaderName::from_static(AGENT_ID_HEADER), value);
        }
    }

    Ok(headers)
}
