//! Conversion of the e-paper framebuffer into the controller's two RAM planes.

use itertools::iproduct;

use crate::epd::Color;
use crate::framebuffer::Framebuffer;

/// Encode `fb` into `primary` (black/white RAM) and `accent` (red/yellow RAM), each
/// `width * height / 8` bytes. Bits are row-major with the leftmost pixel in the most significant
/// bit. A cleared primary bit is black and a set accent bit is red; white leaves both planes at
/// their blank values.
pub fn encode_planes(fb: &Framebuffer<Color>, primary: &mut [u8], accent: &mut [u8]) {
    let w = fb.width();
    primary.iter_mut().for_each(|b| *b = 0xFF);
    accent.iter_mut().for_each(|b| *b = 0x00);
    for (row, col) in iproduct!(0..fb.height(), 0..w) {
        let byte = ((row * w + col) / 8) as usize;
        let mask = 0x80u8 >> (col % 8);
        match fb.pixel(col, row) {
            Some(Color::Black) => primary[byte] &= !mask,
            Some(Color::Red) => accent[byte] |= mask,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(fb: &Framebuffer<Color>) -> (Vec<u8>, Vec<u8>) {
        let len = (fb.width() * fb.height() / 8) as usize;
        let (mut primary, mut accent) = (vec![0x5A; len], vec![0x5A; len]);
        encode_planes(fb, &mut primary, &mut accent);
        (primary, accent)
    }

    #[test]
    fn uniform_fills() {
        let mut fb = Framebuffer::new(104, 212);
        let (p, a) = encode(&fb);
        assert_eq!(p.len(), 2756);
        assert!(p.iter().all(|&b| b == 0xFF) && a.iter().all(|&b| b == 0x00));

        fb.fill(Color::Black);
        let (p, a) = encode(&fb);
        assert!(p.iter().all(|&b| b == 0x00) && a.iter().all(|&b| b == 0x00));

        fb.fill(Color::Red);
        let (p, a) = encode(&fb);
        assert!(p.iter().all(|&b| b == 0xFF) && a.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn msb_is_leftmost() {
        let mut fb = Framebuffer::new(104, 212);
        fb.put_pixel(0, 0, Color::Black);
        fb.put_pixel(9, 1, Color::Red);
        let (p, a) = encode(&fb);
        assert_eq!(p[0], 0x7F);
        // Row 1 starts at byte 13; column 9 is bit 6 of its second byte.
        assert_eq!(a[14], 0x40);
        assert_eq!(p.iter().filter(|&&b| b != 0xFF).count(), 1);
        assert_eq!(a.iter().filter(|&&b| b != 0).count(), 1);
    }
}
