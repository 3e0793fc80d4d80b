//! Driver for the Pimoroni Inky pHAT, a 212x104 three-color e-paper panel.
//!
//! Drawing goes to a framebuffer in the panel's native portrait orientation (104 sources wide,
//! 212 gates tall). The public coordinates are landscape, 212 wide and 104 high; `put_pixel` turns
//! them by -90 degrees. Nothing reaches the panel until `update`, which reruns the whole power-up
//! sequence, loads a waveform table, writes both planes and triggers the refresh.

pub mod command;
pub mod planes;
pub mod waveform;

use alloc::vec;
use alloc::vec::Vec;

use display_interface::DisplayError;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use itertools::iproduct;

use crate::epd::command::{BufCommand, Command, NUM_GATES, NUM_SOURCES, SOURCE_BYTE_MAX};
use crate::epd::planes::encode_planes;
use crate::epd::waveform::ColorScheme;
use crate::error::Error;
use crate::font::{Font, FONT_WIDTH};
use crate::framebuffer::Framebuffer;
use crate::interface::DisplayInterface;

/// Physical buffer width: the panel's source lines.
const PHYS_WIDTH: i32 = NUM_SOURCES as i32;

/// Interval between busy line samples.
const BUSY_POLL_MS: u32 = 10;

/// One e-paper pixel. The discriminants are the conventional color codes of these panels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    /// The accent pigment: red, or yellow on yellow panels.
    Red = 1,
    #[default]
    White = 2,
}

/// What the border area outside the active pixels is driven to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Border {
    #[default]
    White = 0xFF,
    Black = 0x00,
    Accent = 0x33,
}

pub struct Inky<DI, RST, BUSY> {
    iface: DI,
    /// Active-low hardware reset line.
    reset: RST,
    /// High while the controller is busy.
    busy: BUSY,
    scheme: ColorScheme,
    border: Border,
    busy_timeout_ms: Option<u32>,
    framebuffer: Framebuffer<Color>,
    primary: Vec<u8>,
    accent: Vec<u8>,
}

impl<DI, RST, BUSY> Inky<DI, RST, BUSY>
where
    DI: DisplayInterface,
    RST: OutputPin,
    BUSY: InputPin,
{
    /// Take ownership of the interface and control lines. Nothing is sent to the panel; the
    /// framebuffer starts out white.
    pub fn new(iface: DI, reset: RST, busy: BUSY) -> Self {
        let fb = Framebuffer::new(NUM_SOURCES, NUM_GATES);
        let plane_len = fb.pixels().len() / 8;
        log::info!("opened {}x{} e-paper panel", NUM_GATES, NUM_SOURCES);
        Inky {
            iface,
            reset,
            busy,
            scheme: ColorScheme::default(),
            border: Border::default(),
            busy_timeout_ms: None,
            framebuffer: fb,
            primary: vec![0xFF; plane_len],
            accent: vec![0x00; plane_len],
        }
    }

    /// Select the waveform table used by `update`.
    pub fn with_color_scheme(self, scheme: ColorScheme) -> Self {
        Self { scheme, ..self }
    }

    pub fn with_border(self, border: Border) -> Self {
        Self { border, ..self }
    }

    /// Give up on a busy wait after `ms` milliseconds with `Error::BusyTimeout`. Without this a
    /// panel that never releases busy blocks forever.
    pub fn with_busy_timeout(self, ms: u32) -> Self {
        Self {
            busy_timeout_ms: Some(ms),
            ..self
        }
    }

    /// Logical width, the long axis.
    pub fn width(&self) -> i32 {
        i32::from(NUM_GATES)
    }

    /// Logical height, the short axis.
    pub fn height(&self) -> i32 {
        i32::from(NUM_SOURCES)
    }

    pub fn framebuffer(&self) -> &Framebuffer<Color> {
        &self.framebuffer
    }

    /// The black/white plane as of the last `update`.
    pub fn primary_plane(&self) -> &[u8] {
        &self.primary
    }

    /// The accent plane as of the last `update`.
    pub fn accent_plane(&self) -> &[u8] {
        &self.accent
    }

    pub fn fill(&mut self, color: Color) {
        self.framebuffer.fill(color);
    }

    /// Set the pixel at logical (`x`, `y`). Returns `false` and changes nothing if the rotated
    /// position falls outside the panel.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Color) -> bool {
        match PHYS_WIDTH.checked_sub(y) {
            Some(sx) => self.framebuffer.put_pixel(sx, x, color),
            None => false,
        }
    }

    /// Draw character `code` at logical (`x`, `y`) in `color`. Only the glyph's set bits are
    /// painted.
    pub fn put_char(&mut self, x: i32, y: i32, code: u8, font: Font, color: Color) {
        let glyph = font.glyph(code);
        for (row, col) in iproduct!(0..glyph.len(), 0..FONT_WIDTH) {
            if glyph[row] & (0x80 >> col) == 0 {
                continue;
            }
            if let (Some(lx), Some(ly)) = (x.checked_add(col), y.checked_add(row as i32)) {
                self.put_pixel(lx, ly, color);
            }
        }
    }

    pub fn put_str(&mut self, x: i32, y: i32, s: &str, font: Font, color: Color) {
        let mut cursor = x;
        for code in s.bytes() {
            self.put_char(cursor, y, code, font, color);
            cursor = match cursor.checked_add(FONT_WIDTH) {
                Some(next) if next < self.width() => next,
                _ => break,
            };
        }
    }

    /// Pulse the hardware reset line, soft-reset the controller and wait until it is ready.
    pub fn reset<D>(&mut self, delay: &mut D) -> Result<(), Error>
    where
        D: DelayNs,
    {
        self.reset
            .set_low()
            .map_err(|_| Error::Interface(DisplayError::RSError))?;
        delay.delay_ms(100);
        self.reset
            .set_high()
            .map_err(|_| Error::Interface(DisplayError::RSError))?;
        delay.delay_ms(100);
        Command::SoftReset.send(&mut self.iface)?;
        self.wait_until_idle(delay)
    }

    fn wait_until_idle<D>(&mut self, delay: &mut D) -> Result<(), Error>
    where
        D: DelayNs,
    {
        // Only counted down when a timeout is set; an unbounded wait keeps no clock.
        let mut left_ms = self.busy_timeout_ms;
        loop {
            match self.busy.is_high() {
                Ok(false) => return Ok(()),
                Ok(true) => {}
                Err(e) => {
                    log::error!("failed to read busy line: {:?}", e);
                    return Err(Error::BusyPin);
                }
            }
            if let Some(left) = left_ms {
                if left == 0 {
                    log::error!("panel still busy after {} ms", self.busy_timeout_ms.unwrap_or(0));
                    return Err(Error::BusyTimeout);
                }
                left_ms = Some(left.saturating_sub(BUSY_POLL_MS));
            }
            delay.delay_ms(BUSY_POLL_MS);
        }
    }

    /// Encode the framebuffer and drive it onto the panel, leaving the controller in deep sleep.
    /// This takes several seconds on real hardware.
    pub fn update<D>(&mut self, delay: &mut D) -> Result<(), Error>
    where
        D: DelayNs,
    {
        encode_planes(&self.framebuffer, &mut self.primary, &mut self.accent);
        log::info!("updating e-paper panel ({:?} waveform)", self.scheme);

        self.reset(delay)?;

        let setup = [
            Command::SetAnalogBlockControl(0x54),
            Command::SetDigitalBlockControl(0x3B),
            Command::SetGateCount(NUM_GATES),
            Command::SetGateVoltage(0x10, 0x01),
            Command::SetDummyLinePeriod(0x07),
            Command::SetGateLineWidth(0x04),
            Command::SetDataEntryMode(0x03),
            Command::PowerOn,
            Command::SetVcom(0x3C),
            Command::SetBorderWaveform(0x00),
            Command::SetBorderWaveform(self.border as u8),
        ];
        for cmd in setup.iter() {
            log::debug!("update: {:?}", cmd);
            cmd.send(&mut self.iface)?;
        }
        if let Some(v) = self.scheme.source_voltage() {
            Command::SetSourceVoltage(v).send(&mut self.iface)?;
        }
        BufCommand::WriteLut(self.scheme.lut()).send(&mut self.iface)?;

        Command::SetRamXRange(0, SOURCE_BYTE_MAX).send(&mut self.iface)?;
        Command::SetRamYRange(0, NUM_GATES).send(&mut self.iface)?;

        Command::SetRamXCounter(0).send(&mut self.iface)?;
        Command::SetRamYCounter(0).send(&mut self.iface)?;
        BufCommand::WriteBlackRam(&self.primary).send(&mut self.iface)?;

        Command::SetRamXCounter(0).send(&mut self.iface)?;
        Command::SetRamYCounter(0).send(&mut self.iface)?;
        BufCommand::WriteAccentRam(&self.accent).send(&mut self.iface)?;

        Command::SetUpdateSequence(0xC7).send(&mut self.iface)?;
        Command::MasterActivate.send(&mut self.iface)?;
        delay.delay_ms(50);
        self.wait_until_idle(delay)?;
        Command::DeepSleep.send(&mut self.iface)?;
        log::info!("e-paper update done");
        Ok(())
    }

    /// Release the handle, giving back the interface and control lines.
    pub fn close(self) -> (DI, RST, BUSY) {
        (self.iface, self.reset, self.busy)
    }
}
