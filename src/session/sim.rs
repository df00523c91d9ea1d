//! Simulated decode backend
//!
//! Deterministic frame source used by the test suite and by the binary
//! when no hardware decode backend is compiled in. Emits solid-color
//! frames whose shade drifts over time so consecutive frames are
//! distinguishable, and can script connect failures to exercise the
//! reconnect path.

use std::time::{Duration, Instant};

use bytes::Bytes;

use crate::feeds::FeedConfig;
use crate::render::{PixelFormat, VideoFrame};

use super::backend::{BackendFactory, BackendStatus, DecodeBackend, StreamError};

/// Synthetic decode backend
#[derive(Debug)]
pub struct SimBackend {
    width: u32,
    height: u32,
    format: PixelFormat,
    frame_interval: Duration,
    start_failures: u32,
    started: bool,
    next_seq: u64,
    last_emit: Option<Instant>,
    shade: u8,
}

impl SimBackend {
    /// Create a backend emitting frames of the given geometry
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            frame_interval: Duration::from_millis(100),
            start_failures: 0,
            started: false,
            next_seq: 0,
            last_emit: None,
            shade: 0,
        }
    }

    /// Set the synthetic decode rate
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Script the next `n` start attempts to fail
    pub fn fail_next_starts(mut self, n: u32) -> Self {
        self.start_failures = n;
        self
    }

    fn render(&mut self) -> VideoFrame {
        self.shade = self.shade.wrapping_add(8);
        let (r, g, b) = (self.shade, self.shade / 2, 255 - self.shade);

        let pixels = self.width as usize * self.height as usize;
        let mut data = Vec::with_capacity(pixels * self.format.bytes_per_pixel());
        match self.format {
            PixelFormat::Bgra8888 => {
                for _ in 0..pixels {
                    data.extend_from_slice(&[b, g, r, 0xFF]);
                }
            }
            PixelFormat::Rgb565Le => {
                let v = ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3);
                let le = v.to_le_bytes();
                for _ in 0..pixels {
                    data.extend_from_slice(&le);
                }
            }
        }

        self.next_seq += 1;
        // Geometry and buffer length are consistent by construction
        VideoFrame::new(Bytes::from(data), self.width, self.height, self.format, self.next_seq)
            .expect("sim frame geometry")
    }
}

impl DecodeBackend for SimBackend {
    fn start(&mut self) -> Result<(), StreamError> {
        if self.started {
            return Ok(());
        }
        if self.start_failures > 0 {
            self.start_failures -= 1;
            return Err(StreamError::Connect("simulated connect failure".into()));
        }
        self.started = true;
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<VideoFrame>, StreamError> {
        if !self.started {
            return Ok(None);
        }
        let now = Instant::now();
        let due = self
            .last_emit
            .map(|t| now.saturating_duration_since(t) >= self.frame_interval)
            .unwrap_or(true);
        if !due {
            return Ok(None);
        }
        self.last_emit = Some(now);
        Ok(Some(self.render()))
    }

    fn stop(&mut self) {
        self.started = false;
        self.last_emit = None;
        // next_seq survives restarts so session frame order stays monotonic
    }

    fn status(&self) -> BackendStatus {
        if self.started {
            BackendStatus::Running
        } else {
            BackendStatus::Stopped
        }
    }
}

/// Factory producing [`SimBackend`]s for every feed
#[derive(Debug, Clone)]
pub struct SimBackendFactory {
    width: u32,
    height: u32,
    format: PixelFormat,
    frame_interval: Duration,
}

impl SimBackendFactory {
    /// Create a factory for the given frame geometry
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            frame_interval: Duration::from_millis(100),
        }
    }

    /// Set the synthetic decode rate for all created backends
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }
}

impl BackendFactory for SimBackendFactory {
    type Backend = SimBackend;

    fn create(&self, _feed: &FeedConfig) -> SimBackend {
        SimBackend::new(self.width, self.height, self.format)
            .with_frame_interval(self.frame_interval)
    }
}
