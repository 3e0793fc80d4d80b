//! Initialization-time settings: the panel power source and contrast, and the open-time flags.

use core::ops::BitOr;

use crate::command::Command;

/// Where the panel drive voltage comes from. This is dictated by the module's circuit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VccSource {
    /// VCC is generated from VDD by the controller's internal charge pump.
    #[default]
    SwitchCap,
    /// VCC is supplied externally; the charge pump stays off.
    External,
}

/// A configuration for the display. Builder methods replace the defaults, which suit the common
/// charge-pump modules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    vcc: VccSource,
    contrast: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            vcc: VccSource::SwitchCap,
            contrast: 0x8F,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend this `Config` to select the panel power source. This decides the charge pump and
    /// pre-charge settings sent at init.
    pub fn vcc(self, vcc: VccSource) -> Self {
        Self { vcc, ..self }
    }

    /// Extend this `Config` to set the initial contrast. See `Command::SetContrast`.
    pub fn contrast(self, contrast: u8) -> Self {
        Self { contrast, ..self }
    }

    pub(crate) fn charge_pump_cmd(&self) -> Command {
        Command::SetChargePump(self.vcc == VccSource::SwitchCap)
    }

    pub(crate) fn contrast_cmd(&self) -> Command {
        Command::SetContrast(self.contrast)
    }

    pub(crate) fn precharge_cmd(&self) -> Command {
        match self.vcc {
            VccSource::SwitchCap => Command::SetPrechargePeriod(1, 15),
            VccSource::External => Command::SetPrechargePeriod(2, 2),
        }
    }
}

/// Options chosen when a display is opened. Combine with `|`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags(u8);

impl Flags {
    pub const NONE: Flags = Flags(0);
    /// Show lit pixels dark and dark pixels lit.
    pub const INVERSE: Flags = Flags(1 << 0);
    /// Turn the image 180 degrees when packing the framebuffer.
    pub const ROTATE: Flags = Flags(1 << 1);

    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_charge_pump() {
        let c = Config::new();
        assert_eq!(c.charge_pump_cmd(), Command::SetChargePump(true));
        assert_eq!(c.precharge_cmd(), Command::SetPrechargePeriod(1, 15));
        assert_eq!(c.contrast_cmd(), Command::SetContrast(0x8F));
    }

    #[test]
    fn external_vcc() {
        let c = Config::new().vcc(VccSource::External).contrast(0x20);
        assert_eq!(c.charge_pump_cmd(), Command::SetChargePump(false));
        assert_eq!(c.precharge_cmd(), Command::SetPrechargePeriod(2, 2));
        assert_eq!(c.contrast_cmd(), Command::SetContrast(0x20));
    }

    #[test]
    fn flags_combine() {
        let f = Flags::INVERSE | Flags::ROTATE;
        assert!(f.contains(Flags::INVERSE));
        assert!(f.contains(Flags::ROTATE));
        assert!(!Flags::NONE.contains(Flags::ROTATE));
        assert_eq!(f.bits(), 0b11);
    }
}
