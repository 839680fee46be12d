//! Chat response streaming over server-sent events.

pub mod chat;
pub mod events;
pub mod sse;

pub use chat::{ChatStream, ChatUpdate, StreamError, StreamHandler, StreamingState};
pub use events::ChatEvent;
pub use sse::{SseEvent, SseParser};
