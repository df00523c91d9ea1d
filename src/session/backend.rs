//! Decode backend capability interface
//!
//! The protocol negotiation and decoding for a feed is delegated to a
//! backend behind this trait, so software and hardware-accelerated
//! pipelines are interchangeable at build or configuration time. The
//! session driver owns the backend and calls it from a single task.

use crate::feeds::FeedConfig;
use crate::render::VideoFrame;

/// Per-session stream failure
///
/// Always recoverable at the session level; never crosses session
/// boundaries except as a status value.
#[derive(Debug, Clone)]
pub enum StreamError {
    /// Could not reach or negotiate the stream
    Connect(String),
    /// The decode pipeline reported an error
    Decode(String),
    /// The transport closed underneath us
    Disconnected,
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamError::Connect(msg) => write!(f, "connect failed: {}", msg),
            StreamError::Decode(msg) => write!(f, "decode failed: {}", msg),
            StreamError::Disconnected => write!(f, "stream disconnected"),
        }
    }
}

impl std::error::Error for StreamError {}

/// Whether a backend currently holds pipeline resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStatus {
    /// No pipeline resources held
    Stopped,
    /// Stream negotiated, decode pipeline live
    Running,
}

/// Connection + decode pipeline for one feed
///
/// Contract:
/// - `start` is idempotent and negotiates over a reliable transport.
/// - `poll` never blocks; it returns a frame only if one newer than the
///   last returned frame is available. Frame `seq` numbers are monotonic
///   for the lifetime of the backend, across stop/start cycles.
/// - `stop` releases every network and decode resource and is safe to
///   call in any state.
pub trait DecodeBackend: Send {
    /// Negotiate the stream and bring up the decode pipeline
    fn start(&mut self) -> Result<(), StreamError>;

    /// Fetch the newest decoded frame, if any
    fn poll(&mut self) -> Result<Option<VideoFrame>, StreamError>;

    /// Tear down the pipeline and release all resources
    fn stop(&mut self);

    /// Current resource state
    fn status(&self) -> BackendStatus;
}

/// Creates a backend per feed
///
/// Selected once at startup; every session of the viewer uses the same
/// factory, so the decode implementation is uniform across feeds.
pub trait BackendFactory: Send + Sync + 'static {
    /// Backend type produced by this factory
    type Backend: DecodeBackend + 'static;

    /// Build a (not yet started) backend for the given feed
    fn create(&self, feed: &FeedConfig) -> Self::Backend;
}
