//! camcycle: touchscreen camera-feed cycler
//!
//! The control loop for a small framebuffer appliance that continuously
//! shows one of several configured camera feeds, lets an operator switch
//! feeds by touch, and auto-advances after inactivity.
//!
//! # Architecture
//!
//! ```text
//!   FeedRegistry ──configures──► SessionPool (active + pre-warm, ≤ 2)
//!                                     │
//!                        FrameMailbox │ watch<SessionStatus>
//!                                     ▼
//!   TouchSource ─► InputTranslator ─► Viewer loop ─► FrameScheduler
//!                                     │                   │
//!                        CycleController                  ▼
//!                                     │              Compositor
//!                                     ▼                   │
//!                              SessionPool.retain         ▼
//!                                                    DisplaySink
//! ```
//!
//! Sessions decode concurrently in their own tasks; the viewer loop is
//! the only code path touching the display and the touch device. The
//! single-slot mailbox with overwrite semantics is the backpressure
//! policy: nothing queues, and memory stays bounded at one frame per
//! session.
//!
//! Protocol negotiation/decoding, raw framebuffer writes, and raw touch
//! sampling are external collaborators behind the [`session::DecodeBackend`],
//! [`device::DisplaySink`], and [`device::TouchSource`] traits.

pub mod app;
pub mod cycle;
pub mod device;
pub mod error;
pub mod feeds;
pub mod input;
pub mod render;
pub mod session;
pub mod stats;

pub use app::{Viewer, ViewerConfig};
pub use cycle::{CycleController, CycleState, Direction};
pub use error::{Error, Result};
pub use feeds::{ConfigError, FeedConfig, FeedRegistry};
pub use input::{CalibrationProfile, InputTranslator, OverlayLayout};
pub use render::{Compositor, FrameScheduler, PixelFormat, VideoFrame};
pub use session::{DecodeBackend, SessionPhase, StreamError, StreamSession};
