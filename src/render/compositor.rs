//! Display compositor
//!
//! Merges the current frame (or a placeholder) with the overlay controls
//! into a device-format buffer. Composition is a pure function of the
//! scene; the only state is the double buffer inside [`Surface`].

use std::time::{Duration, Instant};

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Triangle};
use embedded_graphics::text::{Alignment, Text};

use crate::session::SessionPhase;

use super::frame::{PixelFormat, VideoFrame};
use super::surface::Surface;

/// Inputs for one composition pass
#[derive(Debug)]
pub struct Scene<'a> {
    /// Newest frame from the active session, if any
    pub frame: Option<&'a VideoFrame>,
    /// Label of the active feed
    pub feed_name: &'a str,
    /// Lifecycle phase of the active session
    pub phase: SessionPhase,
    /// Whether the navigation overlay is shown
    pub overlay_visible: bool,
}

/// Composites frames, placeholders, and overlay into the output buffer
pub struct Compositor {
    surface: Surface,
    staleness_bound: Duration,
}

impl Compositor {
    /// Create a compositor for the given device geometry
    pub fn new(width: u32, height: u32, format: PixelFormat, staleness_bound: Duration) -> Self {
        Self {
            surface: Surface::new(width, height, format),
            staleness_bound,
        }
    }

    /// Compose the scene and return the device-format buffer
    pub fn composite(&mut self, scene: &Scene<'_>, now: Instant) -> &[u8] {
        let live = scene.phase == SessionPhase::Streaming
            && scene
                .frame
                .map(|f| !f.is_stale(now, self.staleness_bound))
                .unwrap_or(false);

        if live {
            // Checked by `live`
            if let Some(frame) = scene.frame {
                self.surface.blit_frame(frame);
            }
        } else {
            self.draw_placeholder(scene.feed_name, scene.phase);
        }

        if scene.overlay_visible {
            self.draw_overlay(scene.feed_name);
        }

        self.surface.swap()
    }

    fn draw_placeholder(&mut self, feed_name: &str, phase: SessionPhase) {
        self.surface.fill(0x10, 0x10, 0x18);

        let w = self.surface.width() as i32;
        let h = self.surface.height() as i32;

        let name_style = MonoTextStyle::new(&FONT_10X20, Rgb888::WHITE);
        let _ = Text::with_alignment(
            feed_name,
            Point::new(w / 2, h / 2 - 10),
            name_style,
            Alignment::Center,
        )
        .draw(&mut self.surface);

        let status = match phase {
            SessionPhase::Idle => "idle",
            SessionPhase::Connecting => "connecting",
            SessionPhase::Streaming => "no signal",
            SessionPhase::Reconnecting => "reconnecting",
            SessionPhase::Failed => "unavailable",
        };
        let status_style = MonoTextStyle::new(&FONT_6X10, Rgb888::new(0xA0, 0xA0, 0xA0));
        let _ = Text::with_alignment(
            status,
            Point::new(w / 2, h / 2 + 14),
            status_style,
            Alignment::Center,
        )
        .draw(&mut self.surface);
    }

    fn draw_overlay(&mut self, feed_name: &str) {
        let w = self.surface.width() as i32;
        let h = self.surface.height() as i32;
        let arrow = PrimitiveStyle::with_fill(Rgb888::new(0xC8, 0xC8, 0xC8));

        let _ = Triangle::new(
            Point::new(10, h / 2),
            Point::new(30, h / 2 - 20),
            Point::new(30, h / 2 + 20),
        )
        .into_styled(arrow)
        .draw(&mut self.surface);

        let _ = Triangle::new(
            Point::new(w - 10, h / 2),
            Point::new(w - 30, h / 2 - 20),
            Point::new(w - 30, h / 2 + 20),
        )
        .into_styled(arrow)
        .draw(&mut self.surface);

        let banner_style = MonoTextStyle::new(&FONT_6X10, Rgb888::YELLOW);
        let _ = Text::with_alignment(
            feed_name,
            Point::new(w / 2, 14),
            banner_style,
            Alignment::Center,
        )
        .draw(&mut self.surface);
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn red_frame(width: u32, height: u32) -> VideoFrame {
        let mut data = Vec::new();
        for _ in 0..width * height {
            data.extend_from_slice(&[0x00, 0x00, 0xFF, 0xFF]); // BGRA red
        }
        VideoFrame::new(Bytes::from(data), width, height, PixelFormat::Bgra8888, 1).unwrap()
    }

    fn center_pixel(buf: &[u8], width: u32, height: u32) -> [u8; 4] {
        let offset = ((height / 2) * width + width / 2) as usize * 4;
        [buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]]
    }

    #[test]
    fn test_streaming_frame_is_blitted() {
        let mut comp = Compositor::new(64, 48, PixelFormat::Bgra8888, Duration::from_secs(2));
        let frame = red_frame(64, 48);
        let scene = Scene {
            frame: Some(&frame),
            feed_name: "door",
            phase: SessionPhase::Streaming,
            overlay_visible: false,
        };

        let out = comp.composite(&scene, frame.captured_at);
        assert_eq!(center_pixel(out, 64, 48), [0x00, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn test_stale_frame_shows_placeholder() {
        let mut comp = Compositor::new(64, 48, PixelFormat::Bgra8888, Duration::from_secs(2));
        let frame = red_frame(64, 48);
        let scene = Scene {
            frame: Some(&frame),
            feed_name: "door",
            phase: SessionPhase::Streaming,
            overlay_visible: false,
        };

        let out = comp.composite(&scene, frame.captured_at + Duration::from_secs(5));
        // No red video pixels anywhere in a placeholder
        assert!(out.chunks(4).all(|px| px[2] != 0xFF || px[0] != 0x00));
    }

    #[test]
    fn test_failed_session_shows_placeholder() {
        let mut comp = Compositor::new(64, 48, PixelFormat::Bgra8888, Duration::from_secs(2));
        let frame = red_frame(64, 48);
        let scene = Scene {
            frame: Some(&frame),
            feed_name: "door",
            phase: SessionPhase::Failed,
            overlay_visible: false,
        };

        let out = comp.composite(&scene, frame.captured_at);
        assert!(out.chunks(4).all(|px| px[2] != 0xFF || px[0] != 0x00));
    }

    #[test]
    fn test_overlay_draws_arrows() {
        let mut comp = Compositor::new(64, 48, PixelFormat::Bgra8888, Duration::from_secs(2));
        let frame = red_frame(64, 48);

        let plain = comp
            .composite(
                &Scene {
                    frame: Some(&frame),
                    feed_name: "door",
                    phase: SessionPhase::Streaming,
                    overlay_visible: false,
                },
                frame.captured_at,
            )
            .to_vec();

        let with_overlay = comp
            .composite(
                &Scene {
                    frame: Some(&frame),
                    feed_name: "door",
                    phase: SessionPhase::Streaming,
                    overlay_visible: true,
                },
                frame.captured_at,
            )
            .to_vec();

        assert_ne!(plain, with_overlay);

        // The left arrow tip sits at (10, h/2)
        let offset = ((48 / 2) * 64 + 10) * 4;
        assert_eq!(&with_overlay[offset..offset + 3], &[0xC8, 0xC8, 0xC8]);
    }
}
