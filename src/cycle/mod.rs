//! Feed cycling state machine
//!
//! Owns "which feed is active". Two triggers change it: manual
//! navigation from the touch overlay and the inactivity timer. The timer
//! is reset only by accepted navigation events; frame arrival or any
//! other activity never touches it.

use std::time::{Duration, Instant};

/// Navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Previous feed in cycle order
    Prev,
    /// Next feed in cycle order
    Next,
}

impl Direction {
    fn delta(self) -> isize {
        match self {
            Direction::Prev => -1,
            Direction::Next => 1,
        }
    }
}

/// The cycling state, mutated only by [`CycleController`]
#[derive(Debug, Clone, Copy)]
pub struct CycleState {
    /// Index of the active feed, always in `[0, feed_count)`
    pub active_index: usize,
    /// When the last navigation (manual or automatic) was accepted
    pub last_interaction: Instant,
}

/// Drives feed selection from navigation events and the inactivity timer
#[derive(Debug)]
pub struct CycleController {
    state: CycleState,
    feed_count: usize,
    auto_cycle_interval: Duration,
}

impl CycleController {
    /// Create a controller starting at feed 0
    ///
    /// `feed_count` comes from a loaded registry and is therefore ≥ 1.
    pub fn new(feed_count: usize, auto_cycle_interval: Duration, now: Instant) -> Self {
        Self {
            state: CycleState {
                active_index: 0,
                last_interaction: now,
            },
            feed_count: feed_count.max(1),
            auto_cycle_interval,
        }
    }

    /// Index of the active feed
    pub fn active_index(&self) -> usize {
        self.state.active_index
    }

    /// Index of the feed after the active one (the pre-warm target)
    pub fn next_index(&self) -> usize {
        (self.state.active_index + 1) % self.feed_count
    }

    /// Current cycling state snapshot
    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Accept a manual navigation; returns the new active index
    pub fn navigate(&mut self, direction: Direction, now: Instant) -> usize {
        let count = self.feed_count as isize;
        let index = (self.state.active_index as isize + direction.delta()).rem_euclid(count);
        self.state.active_index = index as usize;
        self.state.last_interaction = now;
        self.state.active_index
    }

    /// Advance automatically if the inactivity interval has elapsed
    ///
    /// Updating `last_interaction` on the auto-advance prevents tight
    /// re-triggering: the next advance needs another full interval.
    pub fn tick(&mut self, now: Instant) -> Option<usize> {
        let idle = now.saturating_duration_since(self.state.last_interaction);
        if idle >= self.auto_cycle_interval {
            Some(self.navigate(Direction::Next, now))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(1800);

    #[test]
    fn test_k_nexts_land_on_k_mod_n() {
        for n in 1..=5 {
            let mut cycle = CycleController::new(n, INTERVAL, Instant::now());
            for k in 1..=13 {
                cycle.navigate(Direction::Next, Instant::now());
                assert_eq!(cycle.active_index(), k % n);
            }
        }
    }

    #[test]
    fn test_prev_wraps_backward() {
        let mut cycle = CycleController::new(3, INTERVAL, Instant::now());
        assert_eq!(cycle.navigate(Direction::Prev, Instant::now()), 2);
        assert_eq!(cycle.navigate(Direction::Prev, Instant::now()), 1);
    }

    #[test]
    fn test_single_feed_always_index_zero() {
        let mut cycle = CycleController::new(1, INTERVAL, Instant::now());
        assert_eq!(cycle.navigate(Direction::Next, Instant::now()), 0);
        assert_eq!(cycle.navigate(Direction::Prev, Instant::now()), 0);
        assert_eq!(cycle.next_index(), 0);
    }

    #[test]
    fn test_auto_cycle_advances_exactly_once_per_interval() {
        let t0 = Instant::now();
        let mut cycle = CycleController::new(3, INTERVAL, t0);

        // Just under the interval: no advance
        assert!(cycle.tick(t0 + INTERVAL - Duration::from_secs(1)).is_none());

        // Past the interval: advance once
        let t1 = t0 + INTERVAL + Duration::from_secs(1);
        assert_eq!(cycle.tick(t1), Some(1));

        // Immediately after: no double-advance
        assert!(cycle.tick(t1 + Duration::from_millis(10)).is_none());

        // Only after another full interval
        assert_eq!(cycle.tick(t1 + INTERVAL), Some(2));
    }

    #[test]
    fn test_manual_navigation_resets_inactivity_timer() {
        let t0 = Instant::now();
        let mut cycle = CycleController::new(3, INTERVAL, t0);

        let t1 = t0 + INTERVAL - Duration::from_secs(10);
        cycle.navigate(Direction::Next, t1);

        // The old deadline has passed, but the manual navigation moved it
        assert!(cycle.tick(t0 + INTERVAL + Duration::from_secs(1)).is_none());
        assert!(cycle.tick(t1 + INTERVAL).is_some());
    }

    #[test]
    fn test_state_snapshot() {
        let t0 = Instant::now();
        let mut cycle = CycleController::new(4, INTERVAL, t0);
        let t1 = t0 + Duration::from_secs(5);
        cycle.navigate(Direction::Next, t1);

        let state = cycle.state();
        assert_eq!(state.active_index, 1);
        assert_eq!(state.last_interaction, t1);
    }
}
