//! Double-buffered pixel surface
//!
//! The compositor renders into the back buffer and swaps, so the display
//! sink always reads a fully composed frame (tear-free on devices that
//! copy the buffer out). The surface also owns the pixel-format
//! conversion: decode backends may hand us BGRA or RGB565 and the panel
//! may want either.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::Pixel;

use super::frame::{PixelFormat, VideoFrame};

/// Owned output surface at device resolution
pub struct Surface {
    width: u32,
    height: u32,
    format: PixelFormat,
    back: Vec<u8>,
    front: Vec<u8>,
}

impl Surface {
    /// Create a surface for the given device geometry
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let len = width as usize * height as usize * format.bytes_per_pixel();
        Self {
            width,
            height,
            format,
            back: vec![0; len],
            front: vec![0; len],
        }
    }

    /// Surface width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Output pixel format
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Fill the back buffer with a solid color
    pub fn fill(&mut self, r: u8, g: u8, b: u8) {
        for x in 0..self.width {
            for y in 0..self.height {
                self.put_pixel(x, y, r, g, b);
            }
        }
    }

    fn put_pixel(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8) {
        let bpp = self.format.bytes_per_pixel();
        let offset = (y as usize * self.width as usize + x as usize) * bpp;
        match self.format {
            PixelFormat::Bgra8888 => {
                self.back[offset] = b;
                self.back[offset + 1] = g;
                self.back[offset + 2] = r;
                self.back[offset + 3] = 0xFF;
            }
            PixelFormat::Rgb565Le => {
                let v = ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3);
                let le = v.to_le_bytes();
                self.back[offset] = le[0];
                self.back[offset + 1] = le[1];
            }
        }
    }

    fn frame_pixel(frame: &VideoFrame, x: u32, y: u32) -> (u8, u8, u8) {
        let bpp = frame.format.bytes_per_pixel();
        let offset = (y as usize * frame.width as usize + x as usize) * bpp;
        match frame.format {
            PixelFormat::Bgra8888 => (
                frame.data[offset + 2],
                frame.data[offset + 1],
                frame.data[offset],
            ),
            PixelFormat::Rgb565Le => {
                let v = u16::from_le_bytes([frame.data[offset], frame.data[offset + 1]]);
                (
                    (((v >> 11) & 0x1F) as u8) << 3,
                    (((v >> 5) & 0x3F) as u8) << 2,
                    ((v & 0x1F) as u8) << 3,
                )
            }
        }
    }

    /// Blit a decoded frame into the back buffer
    ///
    /// Same geometry and format is a straight copy; anything else goes
    /// through nearest-neighbor scaling with per-pixel conversion.
    pub fn blit_frame(&mut self, frame: &VideoFrame) {
        if frame.width == self.width && frame.height == self.height && frame.format == self.format
        {
            self.back.copy_from_slice(&frame.data);
            return;
        }

        for y in 0..self.height {
            let src_y = (y as u64 * frame.height as u64 / self.height as u64) as u32;
            for x in 0..self.width {
                let src_x = (x as u64 * frame.width as u64 / self.width as u64) as u32;
                let (r, g, b) = Self::frame_pixel(frame, src_x, src_y);
                self.put_pixel(x, y, r, g, b);
            }
        }
    }

    /// Swap buffers and return the newly presented front buffer
    pub fn swap(&mut self) -> &[u8] {
        std::mem::swap(&mut self.back, &mut self.front);
        &self.front
    }

    /// The most recently swapped-in front buffer
    pub fn front(&self) -> &[u8] {
        &self.front
    }
}

impl OriginDimensions for Surface {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Surface {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x >= 0
                && coord.x < self.width as i32
                && coord.y >= 0
                && coord.y < self.height as i32
            {
                self.put_pixel(coord.x as u32, coord.y as u32, color.r(), color.g(), color.b());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn solid_bgra(width: u32, height: u32, r: u8, g: u8, b: u8) -> VideoFrame {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&[b, g, r, 0xFF]);
        }
        VideoFrame::new(Bytes::from(data), width, height, PixelFormat::Bgra8888, 1).unwrap()
    }

    #[test]
    fn test_blit_identity() {
        let mut surface = Surface::new(4, 4, PixelFormat::Bgra8888);
        let frame = solid_bgra(4, 4, 10, 20, 30);

        surface.blit_frame(&frame);
        let out = surface.swap();
        assert_eq!(&out[..4], &[30, 20, 10, 0xFF]);
    }

    #[test]
    fn test_blit_converts_to_rgb565() {
        let mut surface = Surface::new(2, 2, PixelFormat::Rgb565Le);
        let frame = solid_bgra(2, 2, 0xFF, 0x00, 0x00);

        surface.blit_frame(&frame);
        let out = surface.swap();
        // Pure red in RGB565: 0xF800
        assert_eq!(u16::from_le_bytes([out[0], out[1]]), 0xF800);
    }

    #[test]
    fn test_blit_scales() {
        // 2x2 source with distinct quadrants onto a 4x4 surface
        let mut data = Vec::new();
        for (b, g, r) in [(1, 2, 3), (4, 5, 6), (7, 8, 9), (10, 11, 12)] {
            data.extend_from_slice(&[b, g, r, 0xFF]);
        }
        let frame = VideoFrame::new(Bytes::from(data), 2, 2, PixelFormat::Bgra8888, 1).unwrap();

        let mut surface = Surface::new(4, 4, PixelFormat::Bgra8888);
        surface.blit_frame(&frame);
        let out = surface.swap();

        // Top-left quadrant replicates source pixel (0,0)
        assert_eq!(&out[..3], &[1, 2, 3]);
        // Bottom-right quadrant replicates source pixel (1,1)
        let last = out.len() - 4;
        assert_eq!(&out[last..last + 3], &[10, 11, 12]);
    }

    #[test]
    fn test_draw_clips_out_of_bounds() {
        let mut surface = Surface::new(2, 2, PixelFormat::Bgra8888);
        let pixels = [
            Pixel(Point::new(-1, 0), Rgb888::WHITE),
            Pixel(Point::new(0, 5), Rgb888::WHITE),
            Pixel(Point::new(1, 1), Rgb888::WHITE),
        ];
        surface.draw_iter(pixels.into_iter()).unwrap();

        let out = surface.swap();
        // Only (1,1) landed
        assert_eq!(&out[..4], &[0, 0, 0, 0]);
        let last = out.len() - 4;
        assert_eq!(&out[last..], &[0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_swap_alternates_buffers() {
        let mut surface = Surface::new(1, 1, PixelFormat::Bgra8888);
        surface.fill(0xAA, 0xAA, 0xAA);
        let first = surface.swap().to_vec();
        surface.fill(0x11, 0x11, 0x11);
        let second = surface.swap().to_vec();
        assert_ne!(first, second);
    }
}
