//! Touch input path
//!
//! Raw samples from the touch device are calibrated into screen space,
//! gated through press tracking and a debounce window, and hit-tested
//! against the overlay zones. The raw sampling itself lives behind the
//! [`crate::device::TouchSource`] trait.

pub mod calibration;
pub mod translator;
pub mod zones;

pub use calibration::{AxisCalibration, CalibrationProfile};
pub use translator::{InputTranslator, TapEvent, TouchSample};
pub use zones::{OverlayLayout, OverlayZone};
