//! Presentation-rate scheduler
//!
//! Bounds how often frames reach the display, independent of how fast the
//! camera decodes. The display path on these boards is the bandwidth
//! bottleneck (SPI TFTs in particular), so the decode rate must never set
//! the blit rate.

use std::time::{Duration, Instant};

/// Rate gate for frame presentation
///
/// `admit` answers one question: may this frame be presented now? A frame
/// is admitted when the rate window has elapsed *and* it is newer (by
/// sequence number) than the last frame presented from the same session.
#[derive(Debug)]
pub struct FrameScheduler {
    period: Duration,
    next_allowed: Option<Instant>,
    last_presented: Option<(usize, u64)>,
}

impl FrameScheduler {
    /// Create a scheduler targeting the given presentation rate
    ///
    /// A zero rate is clamped to 1 fps rather than dividing by zero.
    pub fn new(target_fps: u32) -> Self {
        let fps = target_fps.max(1);
        Self {
            period: Duration::from_secs_f64(1.0 / fps as f64),
            next_allowed: None,
            last_presented: None,
        }
    }

    /// Minimum spacing between presented frames
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Decide whether a frame may be presented
    ///
    /// On admit, the gate advances to `now + period`. Frames with a
    /// sequence number at or below the last presented one from the same
    /// session are rejected regardless of timing; a different session
    /// starts fresh sequence tracking.
    pub fn admit(&mut self, now: Instant, session: usize, seq: u64) -> bool {
        if let Some(next) = self.next_allowed {
            if now < next {
                return false;
            }
        }

        if let Some((last_session, last_seq)) = self.last_presented {
            if last_session == session && seq <= last_seq {
                return false;
            }
        }

        self.last_presented = Some((session, seq));
        self.next_allowed = Some(now + self.period);
        true
    }

    /// Sequence number of the last admitted frame for a session, if any
    ///
    /// The viewer passes this to the session mailbox so already-presented
    /// frames are not handed back.
    pub fn last_seq(&self, session: usize) -> Option<u64> {
        match self.last_presented {
            Some((s, seq)) if s == session => Some(seq),
            _ => None,
        }
    }
}
