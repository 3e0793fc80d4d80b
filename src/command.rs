//! The command set for the SSD1306.
//!
//! Note 1: The SSD1306 display RAM is 128 columns by 8 pages, where each page is a horizontal band
//! of 8 pixel rows and each byte written covers one column of one page, least significant bit on
//! top. Anywhere there is a "page" address, it refers to one of these bands.
//!
//! Note 2: Unlike the data-framed parameters of most controllers, every parameter byte of an
//! SSD1306 command is itself sent as a command byte.

use crate::error::Error;
use crate::interface::DisplayInterface;

pub const NUM_PIXEL_COLS: u8 = 128;
pub const NUM_PIXEL_ROWS: u8 = 64;
pub const NUM_PAGES: u8 = NUM_PIXEL_ROWS / 8;
pub const PIXEL_COL_MAX: u8 = NUM_PIXEL_COLS - 1;
pub const PIXEL_ROW_MAX: u8 = NUM_PIXEL_ROWS - 1;
pub const PAGE_MAX: u8 = NUM_PAGES - 1;

/// How the RAM address pointer advances as display data is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressingMode {
    /// Column first, wrapping to the next page at the end of the column range. (Note 1)
    Horizontal,
    /// Page first, wrapping to the next column at the end of the page range.
    Vertical,
    /// Column only, staying within one page.
    Page,
}

/// Setting of the COM line scanning of rows. Changing this setting will flip the image vertically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComScanDirection {
    /// COM lines scan row addresses top to bottom.
    RowZeroFirst,
    /// COM lines scan row addresses bottom to top.
    RowZeroLast,
}

/// Hardware layout of the COM pins. This is dictated by how the module wires the OLED matrix to
/// the controller; anything but the module's own setting yields a corrupted image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComPins {
    /// Sequential COM pin layout, used by 32-row modules.
    Sequential,
    /// Alternative (interleaved) COM pin layout, used by 64-row modules.
    Alternative,
}

/// Horizontal direction of a hardware scroll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    Right,
    Left,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Turn the panel on or off. Off is the controller's sleep mode; display RAM is retained.
    SetDisplayOn(bool),
    /// Set the display clock divide ratio (1-16) and the oscillator frequency setting (0-15).
    SetClockDiv(u8, u8),
    /// Set the MUX ratio, the number of active COM lines. Range 16-64.
    SetMuxRatio(u8),
    /// Set the vertical COM shift applied after the MUX ratio. Range 0-63.
    SetDisplayOffset(u8),
    /// Set which display RAM row is shown on the first display row. Range 0-63.
    SetStartLine(u8),
    /// Enable or disable the internal charge pump that generates the panel voltage from VDD.
    SetChargePump(bool),
    /// Set the memory addressing mode.
    SetAddressingMode(AddressingMode),
    /// Map column address 127 to segment 0 when true, mirroring the image horizontally.
    SetSegmentRemap(bool),
    SetComScanDirection(ComScanDirection),
    /// Set the COM pin layout and whether the left and right halves of the COM lines are
    /// swapped.
    SetComPins(ComPins, bool),
    /// Set the contrast. Range 0-255.
    SetContrast(u8),
    /// Set the pre-charge phase lengths. Phase 1 and phase 2 each range from 1-15 DCLKs.
    SetPrechargePeriod(u8, u8),
    /// Set the VCOMH deselect level register. Only bits 4-6 are meaningful.
    SetVcomhDeselect(u8),
    /// Light every pixel regardless of RAM contents when true; follow RAM when false.
    SetEntireDisplayOn(bool),
    /// Invert the meaning of RAM bits when true.
    SetInverse(bool),
    /// Set the column start and end address for horizontal or vertical addressing. Range 0-127.
    SetColumnAddress(u8, u8),
    /// Set the page start and end address for horizontal or vertical addressing. Range 0-7.
    /// (Note 1)
    SetPageAddress(u8, u8),
    /// Configure a horizontal scroll over pages `start`..=`end` (0-7), advancing one column every
    /// `interval` frames setting (0-7).
    SetHorizontalScroll(ScrollDirection, u8, u8, u8),
    /// Configure a diagonal scroll: horizontal as `SetHorizontalScroll`, plus a vertical offset
    /// of 0-63 rows per step.
    SetDiagonalScroll(ScrollDirection, u8, u8, u8, u8),
    /// Stop scrolling. RAM must be rewritten after this if a scroll was running.
    DeactivateScroll,
    /// Start the scroll configured by the last scroll setup command.
    ActivateScroll,
}

macro_rules! ok_command {
    ($buf:ident, $cmd:expr,[$($arg:expr),*]) => {{
        let args: &[u8] = &[$($arg),*];
        $buf[..args.len()].copy_from_slice(args);
        Ok(($cmd, &$buf[..args.len()]))
    }};
}

impl Command {
    /// Validate the arguments and transmit the command byte followed by its parameter bytes.
    pub fn send<DI>(self, iface: &mut DI) -> Result<(), Error>
    where
        DI: DisplayInterface,
    {
        let mut arg_buf = [0u8; 6];
        let (cmd, args) = match self {
            Command::SetDisplayOn(on) => ok_command!(arg_buf, if on { 0xAF } else { 0xAE }, []),
            Command::SetClockDiv(divide, fosc) => match (divide, fosc) {
                (1..=16, 0..=15) => ok_command!(arg_buf, 0xD5, [fosc << 4 | (divide - 1)]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetMuxRatio(ratio) => match ratio {
                16..=NUM_PIXEL_ROWS => ok_command!(arg_buf, 0xA8, [ratio - 1]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetDisplayOffset(offset) => match offset {
                0..=PIXEL_ROW_MAX => ok_command!(arg_buf, 0xD3, [offset]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetStartLine(line) => match line {
                0..=PIXEL_ROW_MAX => ok_command!(arg_buf, 0x40 | line, []),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetChargePump(enable) => {
                ok_command!(arg_buf, 0x8D, [if enable { 0x14 } else { 0x10 }])
            }
            Command::SetAddressingMode(mode) => {
                let m = match mode {
                    AddressingMode::Horizontal => 0x00,
                    AddressingMode::Vertical => 0x01,
                    AddressingMode::Page => 0x02,
                };
                ok_command!(arg_buf, 0x20, [m])
            }
            Command::SetSegmentRemap(remap) => {
                ok_command!(arg_buf, if remap { 0xA1 } else { 0xA0 }, [])
            }
            Command::SetComScanDirection(dir) => ok_command!(
                arg_buf,
                match dir {
                    ComScanDirection::RowZeroFirst => 0xC0,
                    ComScanDirection::RowZeroLast => 0xC8,
                },
                []
            ),
            Command::SetComPins(layout, swap_halves) => {
                let alt = match layout {
                    ComPins::Sequential => 0x00,
                    ComPins::Alternative => 0x10,
                };
                let lr = if swap_halves { 0x20 } else { 0x00 };
                ok_command!(arg_buf, 0xDA, [0x02 | alt | lr])
            }
            Command::SetContrast(contrast) => ok_command!(arg_buf, 0x81, [contrast]),
            Command::SetPrechargePeriod(phase_1, phase_2) => match (phase_1, phase_2) {
                (1..=15, 1..=15) => ok_command!(arg_buf, 0xD9, [phase_2 << 4 | phase_1]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetVcomhDeselect(level) => match level & !0x70 {
                0 => ok_command!(arg_buf, 0xDB, [level]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetEntireDisplayOn(on) => {
                ok_command!(arg_buf, if on { 0xA5 } else { 0xA4 }, [])
            }
            Command::SetInverse(inverse) => {
                ok_command!(arg_buf, if inverse { 0xA7 } else { 0xA6 }, [])
            }
            Command::SetColumnAddress(start, end) => match (start, end) {
                (0..=PIXEL_COL_MAX, 0..=PIXEL_COL_MAX) => {
                    ok_command!(arg_buf, 0x21, [start, end])
                }
                _ => Err(Error::InvalidParameter),
            },
            Command::SetPageAddress(start, end) => match (start, end) {
                (0..=PAGE_MAX, 0..=PAGE_MAX) => ok_command!(arg_buf, 0x22, [start, end]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetHorizontalScroll(dir, start, interval, end) => {
                match (start, interval, end) {
                    (0..=PAGE_MAX, 0..=7, 0..=PAGE_MAX) => {
                        let c = match dir {
                            ScrollDirection::Right => 0x26,
                            ScrollDirection::Left => 0x27,
                        };
                        ok_command!(arg_buf, c, [0x00, start, interval, end, 0x00, 0xFF])
                    }
                    _ => Err(Error::InvalidParameter),
                }
            }
            Command::SetDiagonalScroll(dir, start, interval, end, vertical_offset) => {
                match (start, interval, end, vertical_offset) {
                    (0..=PAGE_MAX, 0..=7, 0..=PAGE_MAX, 0..=PIXEL_ROW_MAX) => {
                        let c = match dir {
                            ScrollDirection::Right => 0x29,
                            ScrollDirection::Left => 0x2A,
                        };
                        ok_command!(arg_buf, c, [0x00, start, interval, end, vertical_offset])
                    }
                    _ => Err(Error::InvalidParameter),
                }
            }
            Command::DeactivateScroll => ok_command!(arg_buf, 0x2E, []),
            Command::ActivateScroll => ok_command!(arg_buf, 0x2F, []),
        }?;
        iface.send_command(cmd)?;
        for &arg in args {
            iface.send_command(arg)?;
        }
        Ok(())
    }
}
