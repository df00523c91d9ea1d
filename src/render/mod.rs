//! Rendering pipeline
//!
//! Decoded frames flow from a session's mailbox through the rate-bounding
//! [`FrameScheduler`] into the [`Compositor`], which produces the final
//! device-format pixel buffer.
//!
//! # Backpressure
//!
//! Nothing in this path ever queues frames. The scheduler only looks at
//! the single most recent frame a session has produced; anything older is
//! already gone. Memory and latency stay bounded no matter how fast a
//! camera decodes.

pub mod compositor;
pub mod frame;
pub mod scheduler;
pub mod surface;

pub use compositor::{Compositor, Scene};
pub use frame::{PixelFormat, VideoFrame};
pub use scheduler::FrameScheduler;
pub use surface::Surface;
