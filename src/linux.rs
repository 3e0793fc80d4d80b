//! Opening displays by device path on Linux hosts, through `linux-embedded-hal`.
//!
//! Every helper validates the model before touching any device, and drops whatever it has already
//! opened if a later step fails.

use core::fmt::Debug;

use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::{CdevPin, I2cdev, SpidevDevice};

use crate::config::Flags;
use crate::display::profile::Model;
use crate::display::Display;
use crate::epd::Inky;
use crate::error::Error;
use crate::interface::i2c::I2cInterface;
use crate::interface::spi::SpiInterface;

pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";
pub const DEFAULT_SPI_DEVICE: &str = "/dev/spidev0.0";
pub const DEFAULT_GPIO_CHIP: &str = "/dev/gpiochip0";

const OLED_SPI_HZ: u32 = 8_000_000;
const INKY_SPI_HZ: u32 = 488_000;

pub type I2cDisplay = Display<I2cInterface<I2cdev>>;
pub type SpiDisplay = Display<SpiInterface<SpidevDevice, CdevPin, CdevPin>>;
pub type InkyPhat = Inky<SpiInterface<SpidevDevice, CdevPin>, CdevPin, CdevPin>;

/// GPIO line offsets of the Inky pHAT control lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InkyLines {
    pub reset: u32,
    pub dc: u32,
    pub busy: u32,
}

impl Default for InkyLines {
    fn default() -> Self {
        InkyLines {
            reset: 27,
            dc: 22,
            busy: 17,
        }
    }
}

fn open_failed<E: Debug>(what: &'static str) -> impl FnOnce(E) -> Error {
    move |e| {
        log::error!("failed to open {}: {:?}", what, e);
        Error::Open(what)
    }
}

fn open_spidev(path: &str, speed_hz: u32) -> Result<SpidevDevice, Error> {
    let mut spi = SpidevDevice::open(path).map_err(open_failed("SPI device"))?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(speed_hz)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.configure(&options).map_err(open_failed("SPI device"))?;
    Ok(spi)
}

fn request_line(
    chip: &mut Chip,
    offset: u32,
    flags: LineRequestFlags,
    consumer: &str,
    what: &'static str,
) -> Result<CdevPin, Error> {
    let handle = chip
        .get_line(offset)
        .and_then(|line| line.request(flags, 0, consumer))
        .map_err(open_failed(what))?;
    CdevPin::new(handle).map_err(open_failed(what))
}

/// Open an SSD1306 at 7-bit `address` on the I2C bus at `path`.
pub fn open_i2c(path: &str, address: u8, model: Model, flags: Flags) -> Result<I2cDisplay, Error> {
    model.profile()?;
    let i2c = I2cdev::new(path).map_err(open_failed("I2C bus"))?;
    Display::new(I2cInterface::new(i2c, address), model, flags)
}

/// Open an SSD1306 on the SPI device at `spi_path`, with its D/C and reset lines on `gpio_chip`.
pub fn open_spi(
    spi_path: &str,
    gpio_chip: &str,
    dc_line: u32,
    reset_line: u32,
    model: Model,
    flags: Flags,
) -> Result<SpiDisplay, Error> {
    model.profile()?;
    let spi = open_spidev(spi_path, OLED_SPI_HZ)?;
    let mut chip = Chip::new(gpio_chip).map_err(open_failed("GPIO chip"))?;
    let dc = request_line(
        &mut chip,
        dc_line,
        LineRequestFlags::OUTPUT,
        "ssd1306-dc",
        "D/C line",
    )?;
    let rst = request_line(
        &mut chip,
        reset_line,
        LineRequestFlags::OUTPUT,
        "ssd1306-reset",
        "reset line",
    )?;
    Display::new(SpiInterface::with_reset(spi, dc, rst), model, flags)
}

/// Open an Inky pHAT on the SPI device at `spi_path`, with its control lines on `gpio_chip`.
pub fn open_inky(spi_path: &str, gpio_chip: &str, lines: InkyLines) -> Result<InkyPhat, Error> {
    let spi = open_spidev(spi_path, INKY_SPI_HZ)?;
    let mut chip = Chip::new(gpio_chip).map_err(open_failed("GPIO chip"))?;
    let reset = request_line(
        &mut chip,
        lines.reset,
        LineRequestFlags::OUTPUT,
        "inky-reset",
        "reset line",
    )?;
    let dc = request_line(
        &mut chip,
        lines.dc,
        LineRequestFlags::OUTPUT,
        "inky-dc",
        "D/C line",
    )?;
    let busy = request_line(
        &mut chip,
        lines.busy,
        LineRequestFlags::INPUT,
        "inky-busy",
        "busy line",
    )?;
    Ok(Inky::new(SpiInterface::new(spi, dc), reset, busy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_model_rejected_before_open() {
        // The path does not exist; the model check has to fail first.
        assert!(matches!(
            open_i2c("/nonexistent/i2c", 0x3C, Model::Oled96x16, Flags::NONE),
            Err(Error::UnsupportedGeometry(Model::Oled96x16))
        ));
        assert!(matches!(
            open_spi(
                "/nonexistent/spi",
                "/nonexistent/gpio",
                24,
                25,
                Model::Oled96x16,
                Flags::NONE
            ),
            Err(Error::UnsupportedGeometry(Model::Oled96x16))
        ));
    }

    #[test]
    fn missing_bus_reports_open_error() {
        assert!(matches!(
            open_i2c("/nonexistent/i2c", 0x3C, Model::Oled128x64, Flags::NONE),
            Err(Error::Open("I2C bus"))
        ));
    }

    #[test]
    fn inky_default_lines() {
        assert_eq!(
            InkyLines::default(),
            InkyLines {
                reset: 27,
                dc: 22,
                busy: 17
            }
        );
    }
}
