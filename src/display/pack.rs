//! Conversion of the framebuffer into the SSD1306 page layout. (See Note 1 in `command`.)

use itertools::iproduct;

use crate::display::Pixel;
use crate::framebuffer::Framebuffer;

/// Pack `fb` into `plane`, which must be `width * height / 8` bytes. Byte `(y / 8) * width + x`
/// holds column `x` of page `y / 8`, with row `y % 8` in bit `y % 8`. With `rotate` the image is
/// turned 180 degrees on the way.
pub fn pack_pages(fb: &Framebuffer<Pixel>, rotate: bool, plane: &mut [u8]) {
    let (w, h) = (fb.width(), fb.height());
    debug_assert_eq!(plane.len(), (w * h / 8) as usize);
    plane.iter_mut().for_each(|b| *b = 0);
    for (y, x) in iproduct!(0..h, 0..w) {
        if fb.pixel(x, y) != Some(Pixel::On) {
            continue;
        }
        let (sx, sy) = if rotate { (w - 1 - x, h - 1 - y) } else { (x, y) };
        plane[((sy / 8) * w + sx) as usize] |= 1 << (sy % 8);
    }
}
