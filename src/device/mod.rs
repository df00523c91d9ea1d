//! Device seams
//!
//! The framebuffer and touch panel are exclusive hardware resources, so
//! the viewer reaches them through these traits from its single render/
//! input task. Real hardware adapters are feature-gated; the sim
//! implementations keep the core testable and runnable anywhere.

#[cfg(feature = "hw-fbdev")]
pub mod fbdev;
#[cfg(feature = "hw-touch")]
pub mod touch;

use crate::input::TouchSample;
use crate::render::PixelFormat;

/// Display or input device failure, fatal for the process
#[derive(Debug)]
pub enum DeviceError {
    /// Device node could not be opened
    Open {
        /// Device path
        path: String,
        /// Underlying error
        source: std::io::Error,
    },
    /// Read/write against an open device failed
    Io(std::io::Error),
    /// No matching device was found
    NotFound(String),
    /// Presented buffer does not match the device geometry
    BufferMismatch {
        /// Bytes the device expects
        expected: usize,
        /// Bytes presented
        actual: usize,
    },
}

impl std::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceError::Open { path, source } => {
                write!(f, "failed to open {}: {}", path, source)
            }
            DeviceError::Io(e) => write!(f, "device i/o failed: {}", e),
            DeviceError::NotFound(what) => write!(f, "no {} device found", what),
            DeviceError::BufferMismatch { expected, actual } => {
                write!(
                    f,
                    "buffer size mismatch: device wants {} bytes, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DeviceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeviceError::Open { source, .. } => Some(source),
            DeviceError::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Output device abstraction
///
/// `present` receives a full frame in the device's native format; the
/// raw write is the implementation's concern.
pub trait DisplaySink {
    /// Panel width in pixels
    fn width(&self) -> u32;
    /// Panel height in pixels
    fn height(&self) -> u32;
    /// Native pixel format
    fn format(&self) -> PixelFormat;
    /// Write one composed frame to the device
    fn present(&mut self, buffer: &[u8]) -> Result<(), DeviceError>;
}

/// Touch device abstraction; `poll` must never block
pub trait TouchSource {
    /// Fetch the next pending raw sample, if any
    fn poll(&mut self) -> Result<Option<TouchSample>, DeviceError>;
}

/// In-memory display used by tests and the no-hardware demo mode
#[derive(Debug)]
pub struct SimDisplay {
    width: u32,
    height: u32,
    format: PixelFormat,
    frames_presented: u64,
}

impl SimDisplay {
    /// Create a sim display with the given geometry
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            frames_presented: 0,
        }
    }

    /// How many frames have been presented
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl DisplaySink for SimDisplay {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn present(&mut self, buffer: &[u8]) -> Result<(), DeviceError> {
        let expected =
            self.width as usize * self.height as usize * self.format.bytes_per_pixel();
        if buffer.len() != expected {
            return Err(DeviceError::BufferMismatch {
                expected,
                actual: buffer.len(),
            });
        }
        self.frames_presented += 1;
        Ok(())
    }
}

/// Touch source that never reports input
#[derive(Debug, Default)]
pub struct NullTouch;

impl TouchSource for NullTouch {
    fn poll(&mut self) -> Result<Option<TouchSample>, DeviceError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_display_counts_presents() {
        let mut display = SimDisplay::new(2, 2, PixelFormat::Rgb565Le);
        display.present(&[0u8; 8]).unwrap();
        display.present(&[0u8; 8]).unwrap();
        assert_eq!(display.frames_presented(), 2);
    }

    #[test]
    fn test_sim_display_rejects_wrong_size() {
        let mut display = SimDisplay::new(2, 2, PixelFormat::Bgra8888);
        let result = display.present(&[0u8; 8]);
        assert!(matches!(
            result,
            Err(DeviceError::BufferMismatch {
                expected: 16,
                actual: 8
            })
        ));
    }

    #[test]
    fn test_null_touch_is_silent() {
        let mut touch = NullTouch;
        assert!(touch.poll().unwrap().is_none());
    }
}
