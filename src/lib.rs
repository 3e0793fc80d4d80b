//! Driver library for Solomon Systech SSD1306 dot matrix OLED displays on I2C or SPI, and for the
//! Pimoroni Inky pHAT three-color e-paper display.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

// This has to be here in order to be usable by mods declared afterwards.
#[cfg(test)]
#[macro_use]
mod testing {
    macro_rules! send {
        (Reset) => {Sent::Reset};
        ([$($d:tt),*]) => {Sent::Data(vec![$($d,)*])};
        ($c:tt) => {Sent::Cmd($c)};
    }
    macro_rules! sends {
        ($($e:tt),*) => {&[$(send!($e),)*]};
    }
}

pub mod command;
pub mod config;
pub mod display;
pub mod epd;
pub mod error;
pub mod font;
pub mod framebuffer;
pub mod interface;
#[cfg(feature = "linux")]
pub mod linux;

// Re-exports for primary API.
pub use config::{Config, Flags, VccSource};
pub use display::profile::Model;
pub use display::{Display, Pixel, State};
pub use epd::waveform::ColorScheme;
pub use epd::{Border, Color, Inky};
pub use error::{DisplayError, Error};
pub use font::Font;
pub use framebuffer::Framebuffer;
pub use interface::i2c::I2cInterface;
pub use interface::spi::SpiInterface;
pub use interface::DisplayInterface;
