//! Knowhub - client for the Knowhub knowledge platform
//!
//! Provides the REST client wrapper with its debug call log, the chat
//! response streamer, and typed helpers for the backend's resources.

pub mod cli;
pub mod client;
pub mod config;
pub mod debug;
pub mod entities;
pub mod logging;
pub mod streaming;

pub use client::{ApiClient, ApiEnvelope, ClientError, RequestConfig};
pub use config::KnowhubConfig;
pub use debug::{DebugEntry, DebugFilter, DebugRecorder, DebugStore};
pub use streaming::{ChatStream, StreamHandler, StreamingState};
