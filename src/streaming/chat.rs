//! Chat response streaming.
//!
//! [`ChatStream`] drives one SSE connection per chat turn:
//!
//! ```text
//! Idle --start_stream--> Streaming --complete--> Idle  (on_complete)
//!                                  --error-----> Idle  (on_error)
//!                                  --stop------> Idle  (no callback)
//! ```
//!
//! Only one stream may be active per instance. Each start bumps a generation
//! counter; a task whose generation is stale stays silent, so a stream that
//! was stopped can never overwrite the state of the one that replaced it.
//! Content is delivered under a lock that `stop_stream` also takes, so once
//! `stop_stream` returns the handler sees nothing more from that stream.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::StreamExt;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::client::{encode_path, extract_message, ApiClient};
use crate::config::ApiConfig;
use crate::logging::generate_correlation_id;
use crate::streaming::events::ChatEvent;
use crate::streaming::sse::SseParser;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StreamError {
    /// `start_stream` was called while a stream is still active.
    #[error("A response is already streaming")]
    AlreadyStreaming,

    /// Empty, `.` or `..` conversation id.
    #[error("Invalid conversation id")]
    InvalidConversation,

    /// Called outside a Tokio runtime.
    #[error("Chat streaming requires a Tokio runtime")]
    NoRuntime,

    #[error("Failed to encode stream payload: {0}")]
    Encode(String),
}

/// Snapshot of the hook's state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamingState {
    pub is_streaming: bool,
    pub accumulated_content: String,
    /// Placeholder key of the message being built
    pub current_message_key: Option<String>,
}

/// Receives the callbacks of one stream.
///
/// `on_content` runs while `stop_stream` is blocked; it may read
/// [`ChatStream::state`] but must not call `stop_stream` itself.
pub trait StreamHandler: Send + 'static {
    fn on_content(&mut self, chunk: &str);
    fn on_complete(&mut self, full_content: String, message_key: String);
    fn on_error(&mut self, message: String);
}

/// Stream callbacks as channel messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatUpdate {
    Content(String),
    Complete {
        content: String,
        message_key: String,
    },
    Error(String),
}

impl StreamHandler for UnboundedSender<ChatUpdate> {
    fn on_content(&mut self, chunk: &str) {
        let _ = self.send(ChatUpdate::Content(chunk.to_string()));
    }

    fn on_complete(&mut self, full_content: String, message_key: String) {
        let _ = self.send(ChatUpdate::Complete {
            content: full_content,
            message_key,
        });
    }

    fn on_error(&mut self, message: String) {
        let _ = self.send(ChatUpdate::Error(message));
    }
}

#[derive(Default)]
struct Inner {
    state: StreamingState,
    generation: u64,
    cancel: Option<CancellationToken>,
}

/// How a stream ended, before callbacks fire.
enum Finish {
    Completed { content: String, message_key: String },
    Failed(String),
    Superseded,
}

pub struct ChatStream {
    http: Client,
    config: ApiConfig,
    inner: Arc<Mutex<Inner>>,
    /// Held while content is handed to a handler
    delivery: Arc<Mutex<()>>,
}

impl ChatStream {
    /// Share `client`'s connection pool, cookies and identification headers.
    pub fn new(client: &ApiClient) -> Self {
        Self {
            http: client.http().clone(),
            config: client.config().clone(),
            inner: Arc::new(Mutex::new(Inner::default())),
            delivery: Arc::new(Mutex::new(())),
        }
    }

    pub fn state(&self) -> StreamingState {
        lock(&self.inner).state.clone()
    }

    pub fn is_streaming(&self) -> bool {
        lock(&self.inner).state.is_streaming
    }

    /// Open a stream for `conversation_id`.
    ///
    /// The state is `Streaming` by the time this returns. The returned handle
    /// resolves once the stream has finished, failed or been stopped.
    /// Returns [`StreamError::NoRuntime`] when called outside a Tokio runtime.
    pub fn start_stream<P, H>(
        &self,
        conversation_id: &str,
        payload: &P,
        handler: H,
    ) -> Result<JoinHandle<()>, StreamError>
    where
        P: Serialize + ?Sized,
        H: StreamHandler,
    {
        if conversation_id.trim().is_empty() {
            return Err(StreamError::InvalidConversation);
        }
        let path = encode_path(&["conversations", conversation_id, "stream"])
            .map_err(|_| StreamError::InvalidConversation)?;
        let body =
            serde_json::to_value(payload).map_err(|e| StreamError::Encode(e.to_string()))?;
        let runtime = Handle::try_current().map_err(|_| StreamError::NoRuntime)?;

        let (generation, token) = {
            let mut inner = lock(&self.inner);
            if inner.state.is_streaming {
                return Err(StreamError::AlreadyStreaming);
            }
            inner.generation += 1;
            let token = CancellationToken::new();
            inner.cancel = Some(token.clone());
            inner.state = StreamingState {
                is_streaming: true,
                accumulated_content: String::new(),
                current_message_key: Some(generate_correlation_id()),
            };
            (inner.generation, token)
        };

        let url = self.config.url_for(&path);
        tracing::debug!(conversation_id, generation, url = %url, "Starting chat stream");

        let task = StreamTask {
            http: self.http.clone(),
            url,
            body,
            inner: Arc::clone(&self.inner),
            delivery: Arc::clone(&self.delivery),
            generation,
        };
        Ok(runtime.spawn(task.run(token, handler)))
    }

    /// Cancel the active stream without waiting for the server.
    ///
    /// Waits for a content callback already in progress; after that no
    /// callback fires. Returns `false` when nothing was streaming.
    pub fn stop_stream(&self) -> bool {
        let _delivery = lock(&self.delivery);
        let mut inner = lock(&self.inner);
        if !inner.state.is_streaming {
            return false;
        }
        if let Some(token) = inner.cancel.take() {
            token.cancel();
        }
        inner.generation += 1;
        inner.state = StreamingState::default();
        tracing::debug!("Chat stream stopped by caller");
        true
    }
}

impl Drop for ChatStream {
    fn drop(&mut self) {
        if let Some(token) = lock(&self.inner).cancel.take() {
            token.cancel();
        }
    }
}

struct StreamTask {
    http: Client,
    url: String,
    body: serde_json::Value,
    inner: Arc<Mutex<Inner>>,
    delivery: Arc<Mutex<()>>,
    generation: u64,
}

impl StreamTask {
    async fn run<H: StreamHandler>(self, token: CancellationToken, mut handler: H) {
        let finish = tokio::select! {
            biased;
            _ = token.cancelled() => return,
            finish = self.consume(&mut handler) => finish,
        };

        match finish {
            Finish::Completed {
                content,
                message_key,
            } => {
                if self.settle() {
                    tracing::debug!(message_key = %message_key, "Chat stream completed");
                    handler.on_complete(content, message_key);
                }
            }
            Finish::Failed(message) => {
                if self.settle() {
                    tracing::warn!(error = %message, "Chat stream failed");
                    handler.on_error(message);
                }
            }
            Finish::Superseded => {}
        }
    }

    async fn consume<H: StreamHandler>(&self, handler: &mut H) -> Finish {
        let response = match self
            .http
            .post(&self.url)
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .json(&self.body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Finish::Failed(format!("Network error: {}", e)),
        };

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .as_ref()
                .and_then(extract_message)
                .or_else(|| (!text.trim().is_empty()).then(|| text.clone()))
                .unwrap_or_else(|| format!("Stream request failed with status {}", status));
            return Finish::Failed(message);
        }

        let mut parser = SseParser::new();
        let mut bytes = response.bytes_stream();

        while let Some(chunk) = bytes.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => return Finish::Failed(format!("Stream error: {}", e)),
            };
            for event in parser.push(&chunk) {
                if let Some(finish) = self.apply(ChatEvent::from_sse(&event), handler) {
                    return finish;
                }
            }
        }

        if let Some(event) = parser.finish() {
            if let Some(finish) = self.apply(ChatEvent::from_sse(&event), handler) {
                return finish;
            }
        }

        Finish::Failed("Stream ended unexpectedly".to_string())
    }

    /// Apply one event. Returns `Some` once the stream is over.
    fn apply<H: StreamHandler>(
        &self,
        event: Option<ChatEvent>,
        handler: &mut H,
    ) -> Option<Finish> {
        match event? {
            ChatEvent::Content(text) => {
                let _delivery = lock(&self.delivery);
                {
                    let mut inner = lock(&self.inner);
                    if inner.generation != self.generation {
                        return Some(Finish::Superseded);
                    }
                    inner.state.accumulated_content.push_str(&text);
                }
                handler.on_content(&text);
                None
            }
            ChatEvent::Complete {
                message_key,
                content,
            } => {
                let accumulated = lock(&self.inner).state.accumulated_content.clone();
                Some(Finish::Completed {
                    content: content.unwrap_or(accumulated),
                    message_key,
                })
            }
            ChatEvent::Error(message) => Some(Finish::Failed(message)),
        }
    }

    /// Return to Idle if this task still owns the state.
    fn settle(&self) -> bool {
        let mut inner = lock(&self.inner);
        if inner.generation != self.generation || !inner.state.is_streaming {
            return false;
        }
        inner.state = StreamingState::default();
        inner.cancel = None;
        true
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn streamer(base_url: String) -> ChatStream {
        let config = ApiConfig {
            base_url,
            ..Default::default()
        };
        ChatStream::new(&ApiClient::new(config, None).unwrap())
    }

    #[tokio::test]
    async fn test_rejects_empty_conversation() {
        let stream = streamer("http://localhost:1".to_string());
        let (tx, _rx) = mpsc::unbounded_channel();
        assert_eq!(
            stream.start_stream(" ", &json!({}), tx).unwrap_err(),
            StreamError::InvalidConversation
        );
        assert!(!stream.is_streaming());
    }

    #[tokio::test]
    async fn test_full_content_taken_from_completion() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/conversations/c9/stream")
            .match_header("accept", "text/event-stream")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(
                "event: content\ndata: {\"content\":\"draft\"}\n\n\
                 event: complete\ndata: {\"message_key\":\"m9\",\"content\":\"final text\"}\n\n",
            )
            .create_async()
            .await;

        let stream = streamer(server.url());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = stream
            .start_stream("c9", &json!({"message": "hi"}), tx)
            .unwrap();
        handle.await.unwrap();

        assert_eq!(rx.recv().await, Some(ChatUpdate::Content("draft".to_string())));
        assert_eq!(
            rx.recv().await,
            Some(ChatUpdate::Complete {
                content: "final text".to_string(),
                message_key: "m9".to_string()
            })
        );
        assert_eq!(stream.state(), StreamingState::default());
    }

    #[tokio::test]
    async fn test_http_error_reports_backend_message() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/conversations/c1/stream")
            .with_status(404)
            .with_body(r#"{"success":false,"msg":"conversation not found"}"#)
            .create_async()
            .await;

        let stream = streamer(server.url());
        let (tx, mut rx) = mpsc::unbounded_channel();
        stream
            .start_stream("c1", &json!({}), tx)
            .unwrap()
            .await
            .unwrap();

        assert_eq!(
            rx.recv().await,
            Some(ChatUpdate::Error("conversation not found".to_string()))
        );
        assert!(!stream.is_streaming());
    }

    #[tokio::test]
    async fn test_stream_without_terminal_event_is_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/conversations/c2/stream")
            .with_status(200)
            .with_body("event: content\ndata: {\"content\":\"partial\"}\n\n")
            .create_async()
            .await;

        let stream = streamer(server.url());
        let (tx, mut rx) = mpsc::unbounded_channel();
        stream
            .start_stream("c2", &json!({}), tx)
            .unwrap()
            .await
            .unwrap();

        assert_eq!(rx.recv().await, Some(ChatUpdate::Content("partial".to_string())));
        assert_eq!(
            rx.recv().await,
            Some(ChatUpdate::Error("Stream ended unexpectedly".to_string()))
        );
    }

    #[tokio::test]
    async fn test_dot_segment_conversation_rejected() {
        let stream = streamer("http://localhost:1".to_string());
        let (tx, _rx) = mpsc::unbounded_channel();
        assert_eq!(
            stream.start_stream("..", &json!({}), tx).unwrap_err(),
            StreamError::InvalidConversation
        );
        assert!(!stream.is_streaming());
    }

    #[test]
    fn test_start_outside_runtime_is_an_error() {
        let stream = streamer("http://localhost:1".to_string());
        let (tx, _rx) = mpsc::unbounded_channel();
        assert_eq!(
            stream.start_stream("c1", &json!({}), tx).unwrap_err(),
            StreamError::NoRuntime
        );
        assert!(!stream.is_streaming());
        assert_eq!(stream.state(), StreamingState::default());
    }

    #[tokio::test]
    async fn test_stop_when_idle_is_noop() {
        let stream = streamer("http://localhost:1".to_string());
        assert!(!stream.stop_stream());
    }
}
