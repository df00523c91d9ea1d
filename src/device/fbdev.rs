//! Linux framebuffer display sink
//!
//! Maps `/dev/fbN` and copies composed frames straight into it. Geometry
//! and format come from configuration; the compositor already produces
//! the device's native layout, so presenting is a single memcpy.

use std::fs::OpenOptions;

use memmap2::MmapMut;

use crate::render::PixelFormat;

use super::{DeviceError, DisplaySink};

/// Memory-mapped framebuffer device
pub struct FbDisplay {
    mem: MmapMut,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl FbDisplay {
    /// Open and map a framebuffer device
    pub fn open(
        path: &str,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, DeviceError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| DeviceError::Open {
                path: path.to_string(),
                source,
            })?;

        let mem = unsafe { MmapMut::map_mut(&file) }.map_err(DeviceError::Io)?;

        let needed = width as usize * height as usize * format.bytes_per_pixel();
        if mem.len() < needed {
            return Err(DeviceError::BufferMismatch {
                expected: needed,
                actual: mem.len(),
            });
        }

        tracing::info!(path, width, height, format = ?format, "framebuffer mapped");
        Ok(Self {
            mem,
            width,
            height,
            format,
        })
    }
}

impl DisplaySink for FbDisplay {
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
        self.mem[..expected].copy_from_slice(buffer);
        Ok(())
    }
}
