//! Chat events carried over the SSE connection.

use serde::Deserialize;

use crate::streaming::sse::SseEvent;

/// A decoded chat stream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Incremental text to append
    Content(String),
    /// The reply is finished and persisted under `message_key`
    Complete {
        message_key: String,
        content: Option<String>,
    },
    /// The server gave up on this turn
    Error(String),
}

#[derive(Deserialize)]
struct ContentPayload {
    content: String,
}

#[derive(Deserialize)]
struct CompletePayload {
    #[serde(alias = "messageKey", alias = "message_id", alias = "messageId")]
    message_key: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(alias = "error")]
    message: String,
}

#[derive(Deserialize)]
struct Tagged {
    #[serde(rename = "type")]
    kind: String,
}

impl ChatEvent {
    /// Decode an SSE event. Returns `None` for events the chat stream does
    /// not act on (pings, unknown types, undecodable payloads).
    pub fn from_sse(event: &SseEvent) -> Option<ChatEvent> {
        let kind = if event.event == "message" {
            serde_json::from_str::<Tagged>(&event.data).ok()?.kind
        } else {
            event.event.clone()
        };

        match kind.as_str() {
            "content" | "chunk" => Some(ChatEvent::Content(
                serde_json::from_str::<ContentPayload>(&event.data)
                    .map(|p| p.content)
                    .unwrap_or_else(|_| event.data.clone()),
            )),
            "complete" | "done" => match serde_json::from_str::<CompletePayload>(&event.data) {
                Ok(p) => Some(ChatEvent::Complete {
                    message_key: p.message_key,
                    content: p.content,
                }),
                Err(e) => {
                    tracing::warn!(error = %e, data = %event.data, "Completion event without message key");
                    Some(ChatEvent::Error(format!("malformed completion event: {}", e)))
                }
            },
            "error" => Some(ChatEvent::Error(
                serde_json::from_str::<ErrorPayload>(&event.data)
                    .map(|p| p.message)
                    .unwrap_or_else(|_| event.data.clone()),
            )),
            other => {
                tracing::trace!(event = other, "Ignoring chat stream event");
                None
            }
        }
    }
}
