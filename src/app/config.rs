//! Viewer configuration

use std::time::Duration;

use crate::render::PixelFormat;
use crate::session::{RetryPolicy, SessionConfig};

/// Viewer configuration options
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Display pixel format
    pub format: PixelFormat,

    /// Presentation rate ceiling (the display path's bandwidth budget)
    pub target_fps: u32,

    /// Inactivity interval before auto-advancing to the next feed
    pub auto_cycle_interval: Duration,

    /// Minimum spacing between accepted taps
    pub debounce: Duration,

    /// How long the navigation overlay stays up after a touch
    pub overlay_timeout: Duration,

    /// Frames older than this are replaced by the placeholder
    pub staleness_bound: Duration,

    /// Width of the prev/next edge strips
    pub button_width: u32,

    /// Pre-warm the next feed in cycle order to hide switch latency
    pub prewarm_next: bool,

    /// Decode poll cadence of session driver tasks
    pub poll_interval: Duration,

    /// First reconnect delay after a stream error
    pub backoff_base: Duration,

    /// Reconnect delay ceiling, also the Failed cooldown
    pub backoff_cap: Duration,

    /// Consecutive failures within the window before a session is Failed
    pub max_consecutive_failures: u32,

    /// Rolling window for counting consecutive failures
    pub failure_window: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 480,
            height: 320,
            format: PixelFormat::Rgb565Le,
            target_fps: 15,
            auto_cycle_interval: Duration::from_secs(1800),
            debounce: Duration::from_millis(500),
            overlay_timeout: Duration::from_secs(10),
            staleness_bound: Duration::from_secs(2),
            button_width: 80,
            prewarm_next: true,
            poll_interval: Duration::from_millis(10),
            backoff_base: Duration::from_secs(1),
            backoff_cap: Duration::from_secs(30),
            max_consecutive_failures: 5,
            failure_window: Duration::from_secs(60),
        }
    }
}

impl ViewerConfig {
    /// Set the display geometry
    pub fn display(mut self, width: u32, height: u32, format: PixelFormat) -> Self {
        self.width = width;
        self.height = height;
        self.format = format;
        self
    }

    /// Set the presentation rate ceiling (clamped to at least 1)
    pub fn target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps.max(1);
        self
    }

    /// Set the inactivity auto-cycle interval
    pub fn auto_cycle_interval(mut self, interval: Duration) -> Self {
        self.auto_cycle_interval = interval;
        self
    }

    /// Set the tap debounce window
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the overlay visibility timeout
    pub fn overlay_timeout(mut self, timeout: Duration) -> Self {
        self.overlay_timeout = timeout;
        self
    }

    /// Set the frame staleness bound
    pub fn staleness_bound(mut self, bound: Duration) -> Self {
        self.staleness_bound = bound;
        self
    }

    /// Disable pre-warming of the next feed
    pub fn disable_prewarm(mut self) -> Self {
        self.prewarm_next = false;
        self
    }

    /// Set the reconnect backoff range
    pub fn backoff(mut self, base: Duration, cap: Duration) -> Self {
        self.backoff_base = base;
        self.backoff_cap = cap.max(base);
        self
    }

    /// The retry policy shared by all sessions
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            backoff_base: self.backoff_base,
            backoff_cap: self.backoff_cap,
            max_consecutive_failures: self.max_consecutive_failures,
            failure_window: self.failure_window,
        }
    }

    /// The session tuning derived from this config
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            poll_interval: self.poll_interval,
            retry: self.retry_policy(),
        }
    }
}
