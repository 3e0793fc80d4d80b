//! The subset of the SSD1675-family e-paper controller command set used by the Inky pHAT.
//!
//! Unlike the OLED controller, parameters here follow the command byte as display data.

use crate::error::Error;
use crate::interface::DisplayInterface;

/// Number of gate lines (the long axis) on the panel.
pub const NUM_GATES: u16 = 212;
/// Number of source lines (the short axis) on the panel.
pub const NUM_SOURCES: u16 = 104;
/// Bytes per gate line in controller RAM, one bit per source.
pub const SOURCE_BYTES: u8 = (NUM_SOURCES / 8) as u8;
pub const SOURCE_BYTE_MAX: u8 = SOURCE_BYTES - 1;
/// Length of a waveform table.
pub const LUT_LEN: usize = 70;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Software reset. Registers return to their defaults; busy is asserted while it runs.
    SoftReset,
    /// Analog block control register. The only documented value is 0x54.
    SetAnalogBlockControl(u8),
    /// Digital block control register. The only documented value is 0x3B.
    SetDigitalBlockControl(u8),
    /// Set the number of active gate lines. Range 1-296.
    SetGateCount(u16),
    /// Set the gate driving voltage (VGH, VGL) register pair.
    SetGateVoltage(u8, u8),
    /// Set the dummy line period in units of gate line width. Range 0-127.
    SetDummyLinePeriod(u8),
    /// Set the gate line width setting. Range 0-15.
    SetGateLineWidth(u8),
    /// Set the RAM address increment mode. 0x03 increments X then Y. Range 0-7.
    SetDataEntryMode(u8),
    /// Power the analog blocks on.
    PowerOn,
    /// Set the source driving voltage (VSH/VSL) register. Needed by the yellow waveform.
    SetSourceVoltage(u8),
    /// Set the VCOM register.
    SetVcom(u8),
    /// Select the border waveform. See `epd::Border`.
    SetBorderWaveform(u8),
    /// Set the RAM X window, in bytes (8 sources each). Range 0-12.
    SetRamXRange(u8, u8),
    /// Set the RAM Y window, in gate lines. Range 0-`NUM_GATES`.
    SetRamYRange(u16, u16),
    /// Move the RAM X address counter. Range 0-12.
    SetRamXCounter(u8),
    /// Move the RAM Y address counter. Range 0-`NUM_GATES`.
    SetRamYCounter(u16),
    /// Select which steps `MasterActivate` runs.
    SetUpdateSequence(u8),
    /// Run the update sequence. Busy is asserted until the panel has been driven.
    MasterActivate,
    /// Enter deep sleep mode 1; RAM is retained but the controller needs a reset to wake.
    DeepSleep,
}

pub enum BufCommand<'buf> {
    /// Load a waveform table. Must be `LUT_LEN` bytes.
    WriteLut(&'buf [u8]),
    /// Write the black/white plane into RAM starting at the address counters.
    WriteBlackRam(&'buf [u8]),
    /// Write the red/yellow plane into RAM starting at the address counters.
    WriteAccentRam(&'buf [u8]),
}

macro_rules! ok_command {
    ($buf:ident, $cmd:expr,[$($arg:expr),*]) => {{
        let args: &[u8] = &[$($arg),*];
        $buf[..args.len()].copy_from_slice(args);
        Ok(($cmd, &$buf[..args.len()]))
    }};
}

fn lo(v: u16) -> u8 {
    (v & 0xFF) as u8
}

fn hi(v: u16) -> u8 {
    (v >> 8) as u8
}

impl Command {
    pub fn send<DI>(self, iface: &mut DI) -> Result<(), Error>
    where
        DI: DisplayInterface,
    {
        let mut arg_buf = [0u8; 4];
        let (cmd, data) = match self {
            Command::SoftReset => ok_command!(arg_buf, 0x12, []),
            Command::SetAnalogBlockControl(v) => ok_command!(arg_buf, 0x74, [v]),
            Command::SetDigitalBlockControl(v) => ok_command!(arg_buf, 0x7E, [v]),
            Command::SetGateCount(gates) => match gates {
                1..=296 => ok_command!(arg_buf, 0x01, [lo(gates), hi(gates), 0x00]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetGateVoltage(vgh, vgl) => ok_command!(arg_buf, 0x03, [vgh, vgl]),
            Command::SetDummyLinePeriod(period) => match period {
                0..=127 => ok_command!(arg_buf, 0x3A, [period]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetGateLineWidth(width) => match width {
                0..=15 => ok_command!(arg_buf, 0x3B, [width]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetDataEntryMode(mode) => match mode {
                0..=7 => ok_command!(arg_buf, 0x11, [mode]),
                _ => Err(Error::InvalidParameter),
            },
            Command::PowerOn => ok_command!(arg_buf, 0x04, []),
            Command::SetSourceVoltage(v) => ok_command!(arg_buf, 0x04, [v]),
            Command::SetVcom(v) => ok_command!(arg_buf, 0x2C, [v]),
            Command::SetBorderWaveform(v) => ok_command!(arg_buf, 0x3C, [v]),
            Command::SetRamXRange(start, end) => match (start, end) {
                (0..=SOURCE_BYTE_MAX, 0..=SOURCE_BYTE_MAX) => {
                    ok_command!(arg_buf, 0x44, [start, end])
                }
                _ => Err(Error::InvalidParameter),
            },
            Command::SetRamYRange(start, end) => match (start, end) {
                (0..=NUM_GATES, 0..=NUM_GATES) => {
                    ok_command!(arg_buf, 0x45, [lo(start), hi(start), lo(end), hi(end)])
                }
                _ => Err(Error::InvalidParameter),
            },
            Command::SetRamXCounter(x) => match x {
                0..=SOURCE_BYTE_MAX => ok_command!(arg_buf, 0x4E, [x]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetRamYCounter(y) => match y {
                0..=NUM_GATES => ok_command!(arg_buf, 0x4F, [lo(y), hi(y)]),
                _ => Err(Error::InvalidParameter),
            },
            Command::SetUpdateSequence(seq) => ok_command!(arg_buf, 0x22, [seq]),
            Command::MasterActivate => ok_command!(arg_buf, 0x20, []),
            Command::DeepSleep => ok_command!(arg_buf, 0x10, [0x01]),
        }?;
        iface.send_command(cmd)?;
        if data.is_empty() {
            Ok(())
        } else {
            iface.send_data(data).map_err(Error::from)
        }
    }
}

impl<'a> BufCommand<'a> {
    pub fn send<DI>(self, iface: &mut DI) -> Result<(), Error>
    where
        DI: DisplayInterface,
    {
        let (cmd, data) = match self {
            BufCommand::WriteLut(lut) => match lut.len() {
                LUT_LEN => Ok((0x32, lut)),
                _ => Err(Error::InvalidParameter),
            },
            BufCommand::WriteBlackRam(buf) => Ok((0x24, buf)),
            BufCommand::WriteAccentRam(buf) => Ok((0x26, buf)),
        }?;
        iface.send_command(cmd)?;
        if data.is_empty() {
            Ok(())
        } else {
            iface.send_data(data).map_err(Error::from)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::test_spy::{Sent, TestSpyInterface};

    fn rejected(cmd: Command) -> bool {
        let mut di = TestSpyInterface::new();
        matches!(cmd.send(&mut di), Err(Error::InvalidParameter)) && di.sent().is_empty()
    }

    #[test]
    fn gate_count() {
        let mut di = TestSpyInterface::new();
        Command::SetGateCount(NUM_GATES).send(&mut di).unwrap();
        Command::SetGateCount(296).send(&mut di).unwrap();
        di.check_multi(sends!(0x01, [0xD4, 0x00, 0x00], 0x01, [0x28, 0x01, 0x00]));
        assert!(rejected(Command::SetGateCount(0)));
        assert!(rejected(Command::SetGateCount(297)));
    }

    #[test]
    fn ram_window() {
        let mut di = TestSpyInterface::new();
        Command::SetRamXRange(0, 0x0C).send(&mut di).unwrap();
        Command::SetRamYRange(0, NUM_GATES).send(&mut di).unwrap();
        Command::SetRamXCounter(0).send(&mut di).unwrap();
        Command::SetRamYCounter(0).send(&mut di).unwrap();
        #[rustfmt::skip]
        di.check_multi(sends!(
            0x44, [0x00, 0x0C],
            0x45, [0x00, 0x00, 0xD4, 0x00],
            0x4E, [0x00],
            0x4F, [0x00, 0x00]
        ));
        assert!(rejected(Command::SetRamXRange(0, 13)));
        assert!(rejected(Command::SetRamYCounter(213)));
    }

    #[test]
    fn power_and_source_voltage_share_opcode() {
        let mut di = TestSpyInterface::new();
        Command::PowerOn.send(&mut di).unwrap();
        Command::SetSourceVoltage(0x07).send(&mut di).unwrap();
        di.check_multi(sends!(0x04, 0x04, [0x07]));
    }

    #[test]
    fn register_ranges() {
        assert!(rejected(Command::SetDummyLinePeriod(128)));
        assert!(rejected(Command::SetGateLineWidth(16)));
        assert!(rejected(Command::SetDataEntryMode(8)));
    }

    #[test]
    fn write_lut_length_checked() {
        let mut di = TestSpyInterface::new();
        let lut = [0x5Au8; LUT_LEN];
        BufCommand::WriteLut(&lut).send(&mut di).unwrap();
        assert_eq!(di.sent(), vec![Sent::Cmd(0x32), Sent::Data(lut.to_vec())]);
        assert!(matches!(
            BufCommand::WriteLut(&lut[..69]).send(&mut di),
            Err(Error::InvalidParameter)
        ));
    }

    #[test]
    fn write_ram() {
        let mut di = TestSpyInterface::new();
        BufCommand::WriteBlackRam(&[0xFF, 0x7F]).send(&mut di).unwrap();
        BufCommand::WriteAccentRam(&[0x80]).send(&mut di).unwrap();
        di.check_multi(sends!(0x24, [0xFF, 0x7F], 0x26, [0x80]));
    }
}
