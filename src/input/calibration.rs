//! Touch calibration
//!
//! Resistive panels report raw ADC coordinates that need a per-device
//! linear map into screen space. The profile is loaded once at startup;
//! axis inversion is expressed by `raw_min > raw_max`, which the math
//! handles with no special-casing, and landscape-mounted panels can swap
//! the axes before mapping.

use std::io::Read;

use serde::Deserialize;

use crate::feeds::ConfigError;

/// Linear raw→screen map for one axis
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct AxisCalibration {
    /// Raw value that maps to screen coordinate 0
    pub raw_min: i32,
    /// Raw value that maps to the far edge of the screen
    pub raw_max: i32,
}

impl AxisCalibration {
    /// Map a raw sample onto `[0, dim)`
    ///
    /// Clamped to the last addressable pixel so full-scale samples still
    /// land inside the edge hit zones.
    pub fn map(&self, raw: i32, dim: u32) -> u32 {
        let span = self.raw_max as i64 - self.raw_min as i64;
        if span == 0 || dim == 0 {
            return 0;
        }
        let scaled = (raw as i64 - self.raw_min as i64) * dim as i64 / span;
        scaled.clamp(0, dim as i64 - 1) as u32
    }
}

/// Per-device touch calibration
///
/// Defaults match the ADS7846 panels the viewer was built around.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct CalibrationProfile {
    /// Horizontal axis map
    pub x: AxisCalibration,
    /// Vertical axis map
    pub y: AxisCalibration,
    /// Swap raw X/Y before mapping (landscape-mounted panel)
    #[serde(default)]
    pub swap_axes: bool,
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self {
            x: AxisCalibration {
                raw_min: 300,
                raw_max: 3900,
            },
            y: AxisCalibration {
                raw_min: 300,
                raw_max: 3950,
            },
            swap_axes: false,
        }
    }
}

impl CalibrationProfile {
    /// Load a profile from JSON
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Map a raw sample pair into screen coordinates
    pub fn map(&self, raw_x: i32, raw_y: i32, width: u32, height: u32) -> (u32, u32) {
        let (rx, ry) = if self.swap_axes {
            (raw_y, raw_x)
        } else {
            (raw_x, raw_y)
        };
        (self.x.map(rx, width), self.y.map(ry, height))
    }
}
