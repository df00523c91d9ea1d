//! Viewer statistics
//!
//! Plain counters updated by the render loop, logged periodically at
//! debug level. There is no external metrics surface.

use std::time::{Duration, Instant};

/// Counters for one viewer run
#[derive(Debug, Clone)]
pub struct ViewerStats {
    /// When the viewer started
    pub started_at: Instant,
    /// Frames presented to the display
    pub frames_presented: u64,
    /// Decoded frames skipped by the rate gate
    pub frames_dropped: u64,
    /// Placeholder screens presented
    pub placeholder_presents: u64,
    /// Operator navigations (touch)
    pub manual_navigations: u64,
    /// Inactivity auto-advances
    pub auto_navigations: u64,
}

impl ViewerStats {
    /// Create zeroed stats
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            frames_presented: 0,
            frames_dropped: 0,
            placeholder_presents: 0,
            manual_navigations: 0,
            auto_navigations: 0,
        }
    }

    /// Time since the viewer started
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Average presented frames per second over the whole run
    pub fn presented_fps(&self) -> f64 {
        let secs = self.uptime().as_secs_f64();
        if secs > 0.0 {
            self.frames_presented as f64 / secs
        } else {
            0.0
        }
    }
}

impl Default for ViewerStats {
    fn default() -> Self {
        Self::new()
    }
}
