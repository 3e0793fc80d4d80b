//! Per-model constants: pixel geometry and the initialization command list.

use crate::command::{AddressingMode, ComPins, ComScanDirection, Command};
use crate::config::{Config, Flags};
use crate::error::Error;

/// The display modules a handle can be opened for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Model {
    /// 96x16 modules. No device profile exists for these, so opening one always fails.
    Oled96x16,
    Oled128x32,
    Oled128x64,
}

/// Everything that differs between supported modules. Immutable once a handle is open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Profile {
    pub width: u16,
    pub height: u16,
    pub com_pins: ComPins,
}

impl Model {
    /// Look up the device profile, failing for models the driver has no command table for.
    pub fn profile(self) -> Result<Profile, Error> {
        match self {
            Model::Oled128x32 => Ok(Profile {
                width: 128,
                height: 32,
                com_pins: ComPins::Sequential,
            }),
            Model::Oled128x64 => Ok(Profile {
                width: 128,
                height: 64,
                com_pins: ComPins::Alternative,
            }),
            Model::Oled96x16 => Err(Error::UnsupportedGeometry(self)),
        }
    }
}

impl Profile {
    /// Size in bytes of the packed page buffer.
    pub fn plane_len(&self) -> usize {
        usize::from(self.width) * usize::from(self.height) / 8
    }

    /// The ordered command list that brings a freshly reset controller up, panel still dark.
    pub fn init_commands(&self, config: &Config, flags: Flags) -> [Command; 15] {
        [
            Command::SetDisplayOn(false),
            Command::SetClockDiv(1, 8),
            Command::SetMuxRatio(self.height as u8),
            Command::SetDisplayOffset(0),
            Command::SetStartLine(0),
            config.charge_pump_cmd(),
            Command::SetAddressingMode(AddressingMode::Horizontal),
            Command::SetSegmentRemap(true),
            Command::SetComScanDirection(ComScanDirection::RowZeroLast),
            Command::SetComPins(self.com_pins, false),
            config.contrast_cmd(),
            config.precharge_cmd(),
            Command::SetVcomhDeselect(0x40),
            Command::SetEntireDisplayOn(false),
            Command::SetInverse(flags.contains(Flags::INVERSE)),
        ]
    }
}
