//! Waveform lookup tables for the e-paper update.
//!
//! Each table is 70 bytes: five 7-byte voltage-select rows (black, white, unused, accent, VCOM),
//! one byte per phase with two bits for each of the sub-phases A-D, followed by seven 5-byte
//! timing groups of four sub-phase durations and a repeat count.

use crate::epd::command::LUT_LEN;

/// Which waveform to drive the panel with. Must match the panel's accent pigment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorScheme {
    /// Black and white only; the accent plane is still written but not driven.
    Black,
    /// Black, white and red panels.
    #[default]
    Red,
    /// Black, white and yellow panels. Needs a source voltage override.
    Yellow,
}

impl ColorScheme {
    pub fn lut(self) -> &'static [u8; LUT_LEN] {
        match self {
            ColorScheme::Black => &LUT_BLACK,
            ColorScheme::Red => &LUT_RED,
            ColorScheme::Yellow => &LUT_YELLOW,
        }
    }

    /// Source driving voltage register value the scheme needs, if any.
    pub fn source_voltage(self) -> Option<u8> {
        match self {
            ColorScheme::Yellow => Some(0x07),
            _ => None,
        }
    }
}

#[rustfmt::skip]
static LUT_BLACK: [u8; LUT_LEN] = [
    0x48, 0xA0, 0x10, 0x10, 0x13, 0x00, 0x00, // black
    0x48, 0xA0, 0x80, 0x00, 0x03, 0x00, 0x00, // white
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x48, 0xA5, 0x00, 0xBB, 0x00, 0x00, 0x00, // red
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // vcom
    16, 4, 4, 4, 4,
    16, 4, 4, 4, 4,
    4, 8, 8, 16, 16,
    0, 0, 0, 0, 0,
    0, 0, 0, 0, 0,
    0, 0, 0, 0, 0,
    0, 0, 0, 0, 0,
];

#[rustfmt::skip]
static LUT_RED: [u8; LUT_LEN] = [
    0x48, 0xA0, 0x10, 0x10, 0x13, 0x00, 0x00,
    0x48, 0xA0, 0x80, 0x00, 0x03, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x48, 0xA5, 0x00, 0xBB, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    64, 12, 32, 12, 6,  // flash
    16, 8, 4, 4, 6,     // clear
    4, 8, 8, 16, 16,    // black in
    2, 2, 2, 64, 32,    // red in
    2, 2, 2, 2, 2,      // black sharpen
    0, 0, 0, 0, 0,
    0, 0, 0, 0, 0,
];

#[rustfmt::skip]
static LUT_YELLOW: [u8; LUT_LEN] = [
    0xFA, 0x94, 0x8C, 0xC0, 0xD0, 0x00, 0x00,
    0xFA, 0x94, 0x2C, 0x80, 0xE0, 0x00, 0x00,
    0xFA, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xFA, 0x94, 0xF8, 0x80, 0x50, 0x00, 0xCC,
    0xBF, 0x58, 0xFC, 0x80, 0xD0, 0x00, 0x11,
    64, 16, 64, 16, 8,
    8, 16, 4, 4, 16,
    8, 8, 3, 8, 32,
    8, 4, 0, 0, 16,
    16, 8, 8, 0, 32,
    0, 0, 0, 0, 0,
    0, 0, 0, 0, 0,
];
