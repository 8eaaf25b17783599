//! 1-bit frame buffer for the tag's 2.9" e-paper panel.

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

/// Panel dimensions in landscape orientation
pub const FRAME_WIDTH: u32 = 296;
pub const FRAME_HEIGHT: u32 = 128;

/// Packed monochrome frame, one bit per pixel, rows padded to whole bytes.
///
/// A set bit is ink (`BinaryColor::On`); a fresh frame is all paper.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    bits: Vec<u8>,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new(FRAME_WIDTH, FRAME_HEIGHT)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("ink", &self.ink_count())
            .finish()
    }
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        let bytes_per_row = width.div_ceil(8);
        Self {
            width,
            height,
            bits: vec![0x00; (bytes_per_row * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw rows, MSB is the leftmost pixel of each byte.
    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    pub fn clear_to(&mut self, color: BinaryColor) {
        self.bits.fill(if color.is_on() { 0xFF } else { 0x00 });
    }

    fn locate(&self, x: u32, y: u32) -> Option<(usize, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bytes_per_row = self.width.div_ceil(8);
        let byte_index = (y * bytes_per_row + x / 8) as usize;
        Some((byte_index, 0x80 >> (x % 8)))
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: BinaryColor) {
        if let Some((index, mask)) = self.locate(x, y) {
            match color {
                BinaryColor::On => self.bits[index] |= mask,
                BinaryColor::Off => self.bits[index] &= !mask,
            }
        }
    }

    /// Pixel colour; out-of-bounds reads as paper.
    pub fn pixel(&self, x: u32, y: u32) -> BinaryColor {
        match self.locate(x, y) {
            Some((index, mask)) if self.bits[index] & mask != 0 => BinaryColor::On,
            _ => BinaryColor::Off,
        }
    }

    /// Number of inked pixels, mostly for logs and tests.
    pub fn ink_count(&self) -> u32 {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| self.pixel(x, y).is_on())
            .count() as u32
    }

    /// Iterate every pixel in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel<BinaryColor>> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| Pixel(Point::new(x as i32, y as i32), self.pixel(x, y)))
        })
    }
}

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Frame {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                self.set_pixel(point.x as u32, point.y as u32, color);
            }
        }
        Ok(())
    }
}
