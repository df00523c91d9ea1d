//! Latest-frame mailbox
//!
//! The only channel between a session's decode task and the render loop.
//! A single slot with overwrite semantics: the decoder never blocks on a
//! slow display and the display never queues behind a fast decoder, so
//! memory stays bounded at one frame per session. The lock guards only
//! the slot assignment, never decode work, so the render loop cannot
//! observe a partially written frame.

use std::sync::{Arc, Mutex};

use crate::render::VideoFrame;

/// Single-slot frame handoff with overwrite semantics
#[derive(Debug, Default)]
pub struct FrameMailbox {
    slot: Mutex<Option<Arc<VideoFrame>>>,
}

impl FrameMailbox {
    /// Create an empty mailbox
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a frame, replacing whatever was there
    pub fn publish(&self, frame: VideoFrame) {
        let frame = Arc::new(frame);
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(frame);
    }

    /// Get the stored frame if it is newer than `last_seq`
    ///
    /// The frame stays in the slot (later overwritten by the producer);
    /// the sequence check is what makes each frame current at most once
    /// for a given consumer.
    pub fn take_newer(&self, last_seq: Option<u64>) -> Option<Arc<VideoFrame>> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match (slot.as_ref(), last_seq) {
            (Some(frame), Some(last)) if frame.seq <= last => None,
            (Some(frame), _) => Some(Arc::clone(frame)),
            (None, _) => None,
        }
    }

    /// Sequence number of the stored frame, if any
    pub fn latest_seq(&self) -> Option<u64> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.as_ref().map(|f| f.seq)
    }

    /// Drop the stored frame (used when a stream goes down)
    pub fn clear(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }
}
