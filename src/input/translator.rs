//! Touch sample translation
//!
//! Raw touch streams are noisy: a single physical tap produces a burst
//! of position samples followed by a release edge, and cheap panels emit
//! occasional duplicate release events. The translator tracks the press,
//! emits exactly one tap per gesture at the release position, and
//! suppresses taps inside the debounce window of the previous accepted
//! one.

use std::time::{Duration, Instant};

use super::calibration::CalibrationProfile;

/// One raw sample from the touch device
#[derive(Debug, Clone, Copy)]
pub struct TouchSample {
    /// Raw horizontal coordinate
    pub x: i32,
    /// Raw vertical coordinate
    pub y: i32,
    /// Whether the panel is currently pressed
    pub touching: bool,
}

/// A debounced, calibrated tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapEvent {
    /// Screen-space x
    pub x: u32,
    /// Screen-space y
    pub y: u32,
}

/// Turns raw samples into at most one tap per gesture
#[derive(Debug)]
pub struct InputTranslator {
    calibration: CalibrationProfile,
    width: u32,
    height: u32,
    debounce: Duration,
    pressed: bool,
    last_raw: Option<(i32, i32)>,
    last_accepted: Option<Instant>,
    last_release: Option<Instant>,
}

impl InputTranslator {
    /// Create a translator for the given screen geometry
    pub fn new(
        calibration: CalibrationProfile,
        width: u32,
        height: u32,
        debounce: Duration,
    ) -> Self {
        Self {
            calibration,
            width,
            height,
            debounce,
            pressed: false,
            last_raw: None,
            last_accepted: None,
            last_release: None,
        }
    }

    /// Process one raw sample; returns a tap on an accepted release
    pub fn feed(&mut self, sample: TouchSample, now: Instant) -> Option<TapEvent> {
        if sample.touching {
            self.pressed = true;
            self.last_raw = Some((sample.x, sample.y));
            return None;
        }

        // Release edge; duplicates while unpressed are ignored
        if !self.pressed {
            return None;
        }
        self.pressed = false;
        self.last_release = Some(now);

        let (raw_x, raw_y) = self.last_raw?;

        if let Some(prev) = self.last_accepted {
            if now.saturating_duration_since(prev) < self.debounce {
                return None;
            }
        }
        self.last_accepted = Some(now);

        let (x, y) = self.calibration.map(raw_x, raw_y, self.width, self.height);
        Some(TapEvent { x, y })
    }

    /// When the most recent gesture ended, accepted or not
    ///
    /// The viewer uses this to keep the overlay visible after any touch,
    /// including debounce-suppressed ones.
    pub fn last_release(&self) -> Option<Instant> {
        self.last_release
    }
}

#[cfg(test)]
mod tests {
    use super::super::calibration::AxisCalibration;
    use super::*;

    fn translator() -> InputTranslator {
        // Identity-ish calibration: raw 0..=999 maps across the screen
        let profile = CalibrationProfile {
            x: AxisCalibration {
                raw_min: 0,
                raw_max: 1000,
            },
            y: AxisCalibration {
                raw_min: 0,
                raw_max: 1000,
            },
            swap_axes: false,
        };
        InputTranslator::new(profile, 480, 320, Duration::from_millis(500))
    }

    fn press(x: i32, y: i32) -> TouchSample {
        TouchSample {
            x,
            y,
            touching: true,
        }
    }

    fn release() -> TouchSample {
        TouchSample {
            x: 0,
            y: 0,
            touching: false,
        }
    }

    #[test]
    fn test_one_tap_per_gesture() {
        let mut tr = translator();
        let t0 = Instant::now();

        // A gesture is a burst of position samples then a release
        assert!(tr.feed(press(100, 100), t0).is_none());
        assert!(tr.feed(press(110, 105), t0).is_none());
        let tap = tr.feed(release(), t0).unwrap();

        // Tap lands at the last pressed position, calibrated
        assert_eq!(tap.x, 110 * 480 / 1000);
        assert_eq!(tap.y, 105 * 320 / 1000);

        // Duplicate release edges emit nothing
        assert!(tr.feed(release(), t0).is_none());
    }

    #[test]
    fn test_two_rapid_taps_one_event() {
        let mut tr = translator();
        let t0 = Instant::now();

        tr.feed(press(500, 500), t0);
        assert!(tr.feed(release(), t0).is_some());

        // Second tap 200ms later, inside the 500ms debounce window
        let t1 = t0 + Duration::from_millis(200);
        tr.feed(press(500, 500), t1);
        assert!(tr.feed(release(), t1).is_none());

        // Third tap past the window is accepted again
        let t2 = t0 + Duration::from_millis(600);
        tr.feed(press(500, 500), t2);
        assert!(tr.feed(release(), t2).is_some());
    }

    #[test]
    fn test_release_without_position_is_ignored() {
        let mut tr = translator();
        assert!(tr.feed(release(), Instant::now()).is_none());
    }

    #[test]
    fn test_last_release_tracks_suppressed_gestures() {
        let mut tr = translator();
        let t0 = Instant::now();

        tr.feed(press(500, 500), t0);
        tr.feed(release(), t0);

        // Suppressed by debounce, but still a gesture end
        let t1 = t0 + Duration::from_millis(100);
        tr.feed(press(500, 500), t1);
        tr.feed(release(), t1);

        assert_eq!(tr.last_release(), Some(t1));
    }
}
