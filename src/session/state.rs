//! Session state machine
//!
//! Tracks one feed's lifecycle from idle through streaming, reconnecting
//! with capped exponential backoff, and a Failed parking state once the
//! retry budget is exhausted within the rolling failure window. Failed is
//! not terminal: after a cooldown the session retries via Connecting.

use std::time::{Duration, Instant};

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Not yet started
    Idle,
    /// Negotiating the stream
    Connecting,
    /// Frames flowing
    Streaming,
    /// Transient failure, waiting out a backoff delay
    Reconnecting,
    /// Retry budget exhausted; parked until the cooldown elapses
    Failed,
}

/// Reconnect/backoff tuning
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// First reconnect delay
    pub backoff_base: Duration,
    /// Backoff ceiling, also the Failed cooldown
    pub backoff_cap: Duration,
    /// Consecutive failures within the window before entering Failed
    pub max_consecutive_failures: u32,
    /// Rolling window for counting consecutive failures
    pub failure_window: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff_base: Duration::from_secs(1),
            backoff_cap: Duration::from_secs(30),
            max_consecutive_failures: 5,
            failure_window: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Exponential delay for the given attempt number, capped
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(16);
        self.backoff_cap.min(self.backoff_base.saturating_mul(factor))
    }
}

/// Per-session lifecycle state
#[derive(Debug)]
pub struct SessionState {
    phase: SessionPhase,
    policy: RetryPolicy,
    consecutive_failures: u32,
    window_start: Option<Instant>,
    attempt: u32,
}

impl SessionState {
    /// Create an idle session state
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            phase: SessionPhase::Idle,
            policy,
            consecutive_failures: 0,
            window_start: None,
            attempt: 0,
        }
    }

    /// Current phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Failures recorded in the current rolling window
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Transition to Connecting (from any non-streaming phase)
    pub fn begin_connect(&mut self) {
        if self.phase != SessionPhase::Streaming {
            self.phase = SessionPhase::Connecting;
        }
    }

    /// The stream came up; failure accounting resets
    pub fn on_streaming(&mut self) {
        self.phase = SessionPhase::Streaming;
        self.consecutive_failures = 0;
        self.window_start = None;
        self.attempt = 0;
    }

    /// Record a failure and return how long to wait before retrying
    ///
    /// Moves to Reconnecting while the retry budget lasts, then Failed
    /// with the cooldown delay (the backoff cap).
    pub fn on_error(&mut self, now: Instant) -> Duration {
        let in_window = self
            .window_start
            .map(|start| now.saturating_duration_since(start) <= self.policy.failure_window)
            .unwrap_or(false);

        if in_window {
            self.consecutive_failures += 1;
        } else {
            self.window_start = Some(now);
            self.consecutive_failures = 1;
        }

        if self.consecutive_failures >= self.policy.max_consecutive_failures {
            self.phase = SessionPhase::Failed;
            self.policy.backoff_cap
        } else {
            self.phase = SessionPhase::Reconnecting;
            let delay = self.policy.delay_for(self.attempt);
            self.attempt += 1;
            delay
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            backoff_base: Duration::from_millis(100),
            backoff_cap: Duration::from_secs(30),
            max_consecutive_failures: 3,
            failure_window: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_session_lifecycle() {
        let mut state = SessionState::new(policy());
        assert_eq!(state.phase(), SessionPhase::Idle);

        state.begin_connect();
        assert_eq!(state.phase(), SessionPhase::Connecting);

        state.on_streaming();
        assert_eq!(state.phase(), SessionPhase::Streaming);
        assert_eq!(state.consecutive_failures(), 0);
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let mut state = SessionState::new(RetryPolicy {
            max_consecutive_failures: 100,
            ..policy()
        });
        let now = Instant::now();

        assert_eq!(state.on_error(now), Duration::from_millis(100));
        assert_eq!(state.on_error(now), Duration::from_millis(200));
        assert_eq!(state.on_error(now), Duration::from_millis(400));
        assert_eq!(state.phase(), SessionPhase::Reconnecting);

        for _ in 0..20 {
            state.on_error(now);
        }
        assert_eq!(state.on_error(now), Duration::from_secs(30));
    }

    #[test]
    fn test_failed_after_budget_in_window() {
        let mut state = SessionState::new(policy());
        let now = Instant::now();

        state.on_error(now);
        state.on_error(now + Duration::from_secs(1));
        assert_eq!(state.phase(), SessionPhase::Reconnecting);

        let delay = state.on_error(now + Duration::from_secs(2));
        assert_eq!(state.phase(), SessionPhase::Failed);
        assert_eq!(delay, Duration::from_secs(30));
    }

    #[test]
    fn test_window_expiry_resets_count() {
        let mut state = SessionState::new(policy());
        let now = Instant::now();

        state.on_error(now);
        state.on_error(now + Duration::from_secs(1));

        // Third failure lands outside the window and starts a new one
        state.on_error(now + Duration::from_secs(120));
        assert_eq!(state.phase(), SessionPhase::Reconnecting);
        assert_eq!(state.consecutive_failures(), 1);
    }

    #[test]
    fn test_streaming_resets_failure_accounting() {
        let mut state = SessionState::new(policy());
        let now = Instant::now();

        state.on_error(now);
        state.on_error(now + Duration::from_millis(10));
        state.on_streaming();

        // Backoff restarts from the base after a successful stream
        assert_eq!(
            state.on_error(now + Duration::from_millis(20)),
            Duration::from_millis(100)
        );
        assert_eq!(state.consecutive_failures(), 1);
    }

    #[test]
    fn test_failed_retries_via_connecting() {
        let mut state = SessionState::new(policy());
        let now = Instant::now();

        for i in 0..3 {
            state.on_error(now + Duration::from_secs(i));
        }
        assert_eq!(state.phase(), SessionPhase::Failed);

        state.begin_connect();
        assert_eq!(state.phase(), SessionPhase::Connecting);
    }
}
