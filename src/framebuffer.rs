//! An in-memory pixel grid with clipping drawing calls and a glyph renderer.
//!
//! Nothing here touches hardware. The drivers own a `Framebuffer` and encode it into the
//! controller's native layout on refresh.

use alloc::vec;
use alloc::vec::Vec;

use itertools::iproduct;

use crate::font::{Font, FONT_WIDTH};

/// A `width` by `height` grid of pixels of type `P`, row-major. `P::default()` is the background.
#[derive(Clone, Debug)]
pub struct Framebuffer<P> {
    width: i32,
    height: i32,
    pixels: Vec<P>,
}

impl<P> Framebuffer<P>
where
    P: Copy + Default + PartialEq,
{
    /// Create a framebuffer filled with the background value.
    pub fn new(width: u16, height: u16) -> Self {
        Framebuffer {
            width: i32::from(width),
            height: i32::from(height),
            pixels: vec![P::default(); usize::from(width) * usize::from(height)],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// The pixels in row-major order.
    pub fn pixels(&self) -> &[P] {
        &self.pixels
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    /// Reset every pixel to the background value.
    pub fn clear(&mut self) {
        self.fill(P::default());
    }

    pub fn fill(&mut self, value: P) {
        for p in self.pixels.iter_mut() {
            *p = value;
        }
    }

    /// Write one pixel. Coordinates outside the grid are ignored and reported by returning
    /// `false`.
    pub fn put_pixel(&mut self, x: i32, y: i32, value: P) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = value;
                true
            }
            None => false,
        }
    }

    /// Read back one pixel, or `None` outside the grid.
    pub fn pixel(&self, x: i32, y: i32) -> Option<P> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Draw character `code` with its top-left corner at (`x`, `y`). Only the glyph's set bits are
    /// painted with `ink`; the rest of the cell keeps whatever was there. Parts of the cell outside
    /// the grid are clipped.
    pub fn put_char(&mut self, x: i32, y: i32, code: u8, font: Font, ink: P) {
        let glyph = font.glyph(code);
        for (row, col) in iproduct!(0..glyph.len(), 0..FONT_WIDTH) {
            if glyph[row] & (0x80 >> col) == 0 {
                continue;
            }
            // Cells that reach past i32 are off the grid anyway.
            if let (Some(px), Some(py)) = (x.checked_add(col), y.checked_add(row as i32)) {
                self.put_pixel(px, py, ink);
            }
        }
    }

    /// Draw the bytes of `s` left to right, one `FONT_WIDTH` cell each, starting at (`x`, `y`).
    /// There is no wrapping; characters running off the right edge are clipped.
    pub fn put_str(&mut self, x: i32, y: i32, s: &str, font: Font, ink: P) {
        let mut cursor = x;
        for code in s.bytes() {
            self.put_char(cursor, y, code, font, ink);
            cursor = match cursor.checked_add(FONT_WIDTH) {
                Some(next) if next < self.width => next,
                _ => break,
            };
        }
    }
}
