//! Decoded frame type
//!
//! A frame is a pixel buffer plus enough metadata to blit it. Frames are
//! designed to be cheap to clone because `Bytes` is reference-counted, so
//! the mailbox, scheduler, and compositor can pass them around without
//! copying pixels.

use std::time::{Duration, Instant};

use bytes::Bytes;

/// Pixel layout of a frame or output buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit blue/green/red/alpha, 4 bytes per pixel (HDMI-class panels)
    Bgra8888,
    /// 16-bit RGB 5:6:5 little-endian, 2 bytes per pixel (SPI TFT panels)
    Rgb565Le,
}

impl PixelFormat {
    /// Bytes per pixel for this format
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Bgra8888 => 4,
            PixelFormat::Rgb565Le => 2,
        }
    }
}

/// One decoded video frame
///
/// `seq` is monotonic per session; the scheduler uses it to guarantee it
/// never presents a frame older than the previous one from the same
/// session.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Pixel data, tightly packed rows (zero-copy via reference counting)
    pub data: Bytes,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel layout of `data`
    pub format: PixelFormat,
    /// Per-session monotonic sequence number
    pub seq: u64,
    /// When the frame came out of the decoder
    pub captured_at: Instant,
}

impl VideoFrame {
    /// Create a frame, checking that the buffer matches the dimensions
    pub fn new(
        data: Bytes,
        width: u32,
        height: u32,
        format: PixelFormat,
        seq: u64,
    ) -> Option<Self> {
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if data.len() != expected {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
            format,
            seq,
            captured_at: Instant::now(),
        })
    }

    /// Time since the frame was decoded
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.captured_at)
    }

    /// Whether the frame is older than the given staleness bound
    pub fn is_stale(&self, now: Instant, bound: Duration) -> bool {
        self.age(now) > bound
    }
}
