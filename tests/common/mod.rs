//! Shared test utilities for Knowhub integration tests.
//!
//! Builds clients pointed at a wiremock server and SSE bodies for the
//! chat streaming tests.

#![allow(dead_code)]

use knowhub::config::{ApiConfig, CallerKind};
use knowhub::streaming::{ChatUpdate, StreamHandler};
use knowhub::{ApiClient, DebugRecorder, DebugStore};
use std::sync::{Arc, Mutex};
use wiremock::MockServer;

/// Client against `server` with a fresh debug store of `max_entries`.
pub fn client_for(server: &MockServer, max_entries: usize) -> (ApiClient, Arc<DebugStore>) {
    let store = Arc::new(DebugStore::new(max_entries));
    let recorder = DebugRecorder::new(Arc::clone(&store));
    let client = ApiClient::new(api_config(server), Some(recorder)).unwrap();
    (client, store)
}

/// Client against `server` with no recorder attached.
pub fn unrecorded_client(server: &MockServer) -> ApiClient {
    ApiClient::new(api_config(server), None).unwrap()
}

pub fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: format!("{}/api", server.uri()),
        caller: CallerKind::Human,
        client_id: None,
        timeout_seconds: Some(5),
    }
}

pub fn agent_config(server: &MockServer, client_id: &str) -> ApiConfig {
    ApiConfig {
        caller: CallerKind::Agent,
        client_id: Some(client_id.to_string()),
        ..api_config(server)
    }
}

/// One `data:` frame per chunk, then a `complete` event.
pub fn sse_body(chunks: &[&str], message_key: &str) -> String {
    let mut body = String::new();
    for chunk in chunks {
        body.push_str("event: content\n");
        body.push_str(&format!(
            "data: {}\n\n",
            serde_json::json!({ "content": chunk })
        ));
    }
    body.push_str("event: complete\n");
    body.push_str(&format!(
        "data: {}\n\n",
        serde_json::json!({ "message_key": message_key })
    ));
    body
}

pub fn sse_error_body(message: &str) -> String {
    format!(
        "event: error\ndata: {}\n\n",
        serde_json::json!({ "message": message })
    )
}

/// Handler that keeps every callback for later inspection.
#[derive(Clone, Default)]
pub struct RecordingHandler {
    pub updates: Arc<Mutex<Vec<ChatUpdate>>>,
}

impl RecordingHandler {
    pub fn updates(&self) -> Vec<ChatUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

impl StreamHandler for RecordingHandler {
    fn on_content(&mut self, chunk: &str) {
        self.updates
            .lock()
            .unwrap()
            .push(ChatUpdate::Content(chunk.to_string()));
    }

    fn on_complete(&mut self, full_content: String, message_key: String) {
        self.updates.lock().unwrap().push(ChatUpdate::Complete {
            content: full_content,
            message_key,
        });
    }

    fn on_error(&mut self, message: String) {
        self.updates.lock().unwrap().push(ChatUpdate::Error(message));
    }
}
