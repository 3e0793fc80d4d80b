//! The byte-level boundary between the drivers and the bus. Both controller families only ever
//! send a command byte or a run of data bytes, so everything above this module is written against
//! `DisplayInterface` and never touches `embedded_hal` bus traits directly.

use display_interface::DisplayError;
use embedded_hal::delay::DelayNs;

pub trait DisplayInterface {
    fn send_command(&mut self, cmd: u8) -> Result<(), DisplayError>;
    fn send_data(&mut self, buf: &[u8]) -> Result<(), DisplayError>;

    /// Pulse the controller's hardware reset line, if the interface has one.
    fn reset(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        let _ = delay;
        Ok(())
    }
}

pub mod i2c {
    //! The SSD1306 I2C interface. There is no D/C line: every write starts with a control byte
    //! that tells the controller whether the rest of the write is a command or display data.

    use alloc::vec::Vec;

    use display_interface::DisplayError;
    use embedded_hal::delay::DelayNs;
    use embedded_hal::i2c::I2c;

    use super::DisplayInterface;

    /// Control byte prefixing a single command byte.
    pub const CONTROL_COMMAND: u8 = 0x00;
    /// Control byte prefixing a run of display data.
    pub const CONTROL_DATA: u8 = 0x40;

    /// Default 7-bit slave address of SSD1306 modules with SA0 tied low.
    pub const DEFAULT_ADDRESS: u8 = 0x3C;

    /// Deactivate scroll. Scrolling must be off before the controller RAM is rewritten.
    const SCROLL_OFF: u8 = 0x2E;

    pub struct I2cInterface<I2C> {
        i2c: I2C,
        /// The 7-bit slave address of the controller.
        address: u8,
    }

    impl<I2C> I2cInterface<I2C>
    where
        I2C: I2c,
    {
        /// Create a new I2C interface to the controller at 7-bit `address` on bus `i2c`.
        pub fn new(i2c: I2C, address: u8) -> Self {
            Self { i2c, address }
        }

        /// Give back the underlying bus.
        pub fn release(self) -> I2C {
            self.i2c
        }
    }

    impl<I2C> DisplayInterface for I2cInterface<I2C>
    where
        I2C: I2c,
    {
        fn send_command(&mut self, cmd: u8) -> Result<(), DisplayError> {
            self.i2c
                .write(self.address, &[CONTROL_COMMAND, cmd])
                .map_err(|e| {
                    log::error!("I2C write of command 0x{:02X} failed: {:?}", cmd, e);
                    DisplayError::BusWriteError
                })
        }

        fn send_data(&mut self, buf: &[u8]) -> Result<(), DisplayError> {
            // The control byte and the payload have to go out in one write, without a repeated
            // start in between.
            let mut framed = Vec::with_capacity(buf.len() + 1);
            framed.push(CONTROL_DATA);
            framed.extend_from_slice(buf);
            self.i2c.write(self.address, &framed).map_err(|e| {
                log::error!("I2C write of {} data bytes failed: {:?}", buf.len(), e);
                DisplayError::BusWriteError
            })
        }

        /// I2C modules have no reset line; stopping any running scroll is the closest there is to
        /// putting the controller back into a known state.
        fn reset(&mut self, _delay: &mut impl DelayNs) -> Result<(), DisplayError> {
            self.send_command(SCROLL_OFF)
        }
    }
}

pub mod spi {
    //! The SPI interface supports the "4-wire" interface of the controllers, such that each word
    //! on the SPI bus is 8 bits and a separate D/C GPIO selects command or data. The "3-wire"
    //! mode replaces the D/C GPIO with a 9th bit on each word, which seems really awkward to
    //! implement with embedded_hal SPI.

    use core::convert::Infallible;

    use display_interface::DisplayError;
    use embedded_hal::delay::DelayNs;
    use embedded_hal::digital::{ErrorType, OutputPin};
    use embedded_hal::spi::SpiDevice;

    use super::DisplayInterface;

    /// Placeholder reset pin for interfaces whose reset line is not driven by this crate.
    pub struct NoReset;

    impl ErrorType for NoReset {
        type Error = Infallible;
    }

    impl OutputPin for NoReset {
        fn set_low(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    pub struct SpiInterface<SPI, DC, RST = NoReset> {
        /// The SPI device connected to the controller.
        spi: SPI,
        /// A GPIO output pin connected to the D/C (data/command) pin of the controller (the
        /// fourth "wire" of "4-wire" mode).
        dc: DC,
        /// Optional GPIO output pin connected to the active-low /RESET pin.
        rst: Option<RST>,
    }

    impl<SPI, DC> SpiInterface<SPI, DC, NoReset>
    where
        SPI: SpiDevice,
        DC: OutputPin,
    {
        /// Create a new SPI interface to communicate with the display controller. `spi` is the SPI
        /// device, and `dc` is the GPIO output pin connected to the D/C pin of the controller.
        pub fn new(spi: SPI, dc: DC) -> Self {
            Self { spi, dc, rst: None }
        }
    }

    impl<SPI, DC, RST> SpiInterface<SPI, DC, RST>
    where
        SPI: SpiDevice,
        DC: OutputPin,
        RST: OutputPin,
    {
        /// Like `new`, but the interface also owns the controller's /RESET line and pulses it
        /// from `DisplayInterface::reset`.
        pub fn with_reset(spi: SPI, dc: DC, rst: RST) -> Self {
            Self {
                spi,
                dc,
                rst: Some(rst),
            }
        }

        /// Give back the SPI device and pins.
        pub fn release(self) -> (SPI, DC, Option<RST>) {
            (self.spi, self.dc, self.rst)
        }
    }

    impl<SPI, DC, RST> DisplayInterface for SpiInterface<SPI, DC, RST>
    where
        SPI: SpiDevice,
        DC: OutputPin,
        RST: OutputPin,
    {
        fn send_command(&mut self, cmd: u8) -> Result<(), DisplayError> {
            self.dc.set_low().map_err(|_| DisplayError::DCError)?;
            self.spi.write(&[cmd]).map_err(|e| {
                log::error!("SPI write of command 0x{:02X} failed: {:?}", cmd, e);
                DisplayError::BusWriteError
            })
        }

        fn send_data(&mut self, buf: &[u8]) -> Result<(), DisplayError> {
            self.dc.set_high().map_err(|_| DisplayError::DCError)?;
            self.spi.write(buf).map_err(|e| {
                log::error!("SPI write of {} data bytes failed: {:?}", buf.len(), e);
                DisplayError::BusWriteError
            })
        }

        fn reset(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
            let rst = match self.rst.as_mut() {
                Some(rst) => rst,
                None => return Ok(()),
            };
            rst.set_high().map_err(|_| DisplayError::RSError)?;
            delay.delay_us(999);
            rst.set_low().map_err(|_| DisplayError::RSError)?;
            delay.delay_ms(10);
            rst.set_high().map_err(|_| DisplayError::RSError)
        }
    }
}

#[cfg(test)]
pub mod test_spy {
    //! Interfaces and bus fakes for use in unit tests to spy on whatever was sent to them.

    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};

    use display_interface::DisplayError;
    use embedded_hal::delay::DelayNs;
    use embedded_hal::{digital, i2c, spi};

    use super::DisplayInterface;

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Sent {
        Reset,
        Cmd(u8),
        Data(Vec<u8>),
    }

    /// Records every command and data transfer. Clones made with `split` share the same record,
    /// so a test can hand one to a driver and keep the other to inspect.
    pub struct TestSpyInterface {
        sent: Rc<RefCell<Vec<Sent>>>,
        /// Number of transfers left before every further transfer fails.
        fail_after: Rc<Cell<Option<usize>>>,
    }

    impl TestSpyInterface {
        pub fn new() -> Self {
            TestSpyInterface {
                sent: Rc::new(RefCell::new(Vec::new())),
                fail_after: Rc::new(Cell::new(None)),
            }
        }
        pub fn split(&self) -> Self {
            TestSpyInterface {
                sent: self.sent.clone(),
                fail_after: self.fail_after.clone(),
            }
        }
        pub fn check_multi(&self, expect: &[Sent]) {
            assert_eq!(*self.sent.borrow(), expect);
        }
        pub fn sent(&self) -> Vec<Sent> {
            self.sent.borrow().clone()
        }
        pub fn clear(&mut self) {
            self.sent.borrow_mut().clear()
        }
        pub fn fail_after(&self, transfers: usize) {
            self.fail_after.set(Some(transfers));
        }
        fn transfer(&self, what: Sent) -> Result<(), DisplayError> {
            match self.fail_after.get() {
                Some(0) => return Err(DisplayError::BusWriteError),
                Some(n) => self.fail_after.set(Some(n - 1)),
                None => {}
            }
            self.sent.borrow_mut().push(what);
            Ok(())
        }
    }

    impl DisplayInterface for TestSpyInterface {
        fn send_command(&mut self, cmd: u8) -> Result<(), DisplayError> {
            self.transfer(Sent::Cmd(cmd))
        }
        fn send_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
            self.transfer(Sent::Data(data.to_vec()))
        }
        fn reset(&mut self, _delay: &mut impl DelayNs) -> Result<(), DisplayError> {
            self.transfer(Sent::Reset)
        }
    }

    /// One observable event on the fake bus and pins.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Wire {
        Pin(&'static str, bool),
        Spi(Vec<u8>),
        I2c(u8, Vec<u8>),
    }

    pub type WireLog = Rc<RefCell<Vec<Wire>>>;

    pub fn wire_log() -> WireLog {
        Rc::new(RefCell::new(Vec::new()))
    }

    pub struct FakeSpi {
        pub log: WireLog,
        pub fail: bool,
    }

    impl spi::ErrorType for FakeSpi {
        type Error = spi::ErrorKind;
    }

    impl spi::SpiDevice for FakeSpi {
        fn transaction(&mut self, operations: &mut [spi::Operation<'_, u8>]) -> Result<(), Self::Error> {
            if self.fail {
                return Err(spi::ErrorKind::Other);
            }
            for op in operations.iter() {
                if let spi::Operation::Write(buf) = op {
                    self.log.borrow_mut().push(Wire::Spi(buf.to_vec()));
                }
            }
            Ok(())
        }
    }

    pub struct FakeI2c {
        pub log: WireLog,
        pub fail: bool,
    }

    impl i2c::ErrorType for FakeI2c {
        type Error = i2c::ErrorKind;
    }

    impl i2c::I2c for FakeI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [i2c::Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(i2c::ErrorKind::Other);
            }
            for op in operations.iter() {
                if let i2c::Operation::Write(buf) = op {
                    self.log.borrow_mut().push(Wire::I2c(address, buf.to_vec()));
                }
            }
            Ok(())
        }
    }

    /// An output pin that logs its level changes under `name`.
    pub struct FakePin {
        pub name: &'static str,
        pub log: WireLog,
    }

    impl digital::ErrorType for FakePin {
        type Error = core::convert::Infallible;
    }

    impl digital::OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.log.borrow_mut().push(Wire::Pin(self.name, false));
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.log.borrow_mut().push(Wire::Pin(self.name, true));
            Ok(())
        }
    }

    /// A busy input that reads high for a fixed number of samples and low afterwards. With
    /// `stuck` set it never goes low.
    pub struct FakeBusy {
        pub busy_samples: Rc<Cell<usize>>,
        pub samples: Rc<Cell<usize>>,
        pub stuck: bool,
        pub broken: bool,
    }

    impl FakeBusy {
        pub fn new(busy_samples: usize) -> Self {
            FakeBusy {
                busy_samples: Rc::new(Cell::new(busy_samples)),
                samples: Rc::new(Cell::new(0)),
                stuck: false,
                broken: false,
            }
        }
    }

    impl digital::ErrorType for FakeBusy {
        type Error = digital::ErrorKind;
    }

    impl digital::InputPin for FakeBusy {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            if self.broken {
                return Err(digital::ErrorKind::Other);
            }
            self.samples.set(self.samples.get() + 1);
            if self.stuck {
                return Ok(true);
            }
            let left = self.busy_samples.get();
            if left == 0 {
                Ok(false)
            } else {
                self.busy_samples.set(left - 1);
                Ok(true)
            }
        }
        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|high| !high)
        }
    }

    /// A delay that returns immediately and keeps a tally of the time it was asked to wait.
    #[derive(Default)]
    pub struct SpyDelay {
        pub total_ns: u64,
    }

    impl DelayNs for SpyDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::i2c::I2cInterface;
    use super::spi::SpiInterface;
    use super::test_spy::{wire_log, FakeI2c, FakePin, FakeSpi, SpyDelay, Wire};
    use super::DisplayInterface;
    use display_interface::DisplayError;

    #[test]
    fn i2c_frames_commands_and_data() {
        let log = wire_log();
        let mut iface = I2cInterface::new(
            FakeI2c {
                log: log.clone(),
                fail: false,
            },
            0x3C,
        );
        iface.send_command(0xAE).unwrap();
        iface.send_data(&[1, 2, 3]).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                Wire::I2c(0x3C, vec![0x00, 0xAE]),
                Wire::I2c(0x3C, vec![0x40, 1, 2, 3]),
            ]
        );
    }

    #[test]
    fn i2c_reset_stops_scroll() {
        let log = wire_log();
        let mut iface = I2cInterface::new(
            FakeI2c {
                log: log.clone(),
                fail: false,
            },
            0x3C,
        );
        let mut delay = SpyDelay::default();
        iface.reset(&mut delay).unwrap();
        assert_eq!(*log.borrow(), vec![Wire::I2c(0x3C, vec![0x00, 0x2E])]);
        assert_eq!(delay.total_ns, 0);
    }

    #[test]
    fn i2c_write_failure_is_reported() {
        let mut iface = I2cInterface::new(
            FakeI2c {
                log: wire_log(),
                fail: true,
            },
            0x3D,
        );
        assert!(matches!(
            iface.send_command(0xAF),
            Err(DisplayError::BusWriteError)
        ));
        assert!(matches!(
            iface.send_data(&[0]),
            Err(DisplayError::BusWriteError)
        ));
    }

    #[test]
    fn spi_drives_dc_line() {
        let log = wire_log();
        let spi = FakeSpi {
            log: log.clone(),
            fail: false,
        };
        let dc = FakePin {
            name: "dc",
            log: log.clone(),
        };
        let mut iface = SpiInterface::new(spi, dc);
        iface.send_command(0x21).unwrap();
        iface.send_data(&[0xDE, 0xAD]).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                Wire::Pin("dc", false),
                Wire::Spi(vec![0x21]),
                Wire::Pin("dc", true),
                Wire::Spi(vec![0xDE, 0xAD]),
            ]
        );
    }

    #[test]
    fn spi_reset_pulses_reset_line() {
        let log = wire_log();
        let spi = FakeSpi {
            log: log.clone(),
            fail: false,
        };
        let dc = FakePin {
            name: "dc",
            log: log.clone(),
        };
        let rst = FakePin {
            name: "rst",
            log: log.clone(),
        };
        let mut delay = SpyDelay::default();
        let mut iface = SpiInterface::with_reset(spi, dc, rst);
        iface.reset(&mut delay).unwrap();
        assert_eq!(
            *log.borrow(),
            vec![
                Wire::Pin("rst", true),
                Wire::Pin("rst", false),
                Wire::Pin("rst", true),
            ]
        );
        assert_eq!(delay.total_ns, 999_000 + 10_000_000);
    }

    #[test]
    fn spi_without_reset_line_skips_reset() {
        let log = wire_log();
        let mut iface = SpiInterface::new(
            FakeSpi {
                log: log.clone(),
                fail: false,
            },
            FakePin {
                name: "dc",
                log: log.clone(),
            },
        );
        let mut delay = SpyDelay::default();
        iface.reset(&mut delay).unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(delay.total_ns, 0);
    }

    #[test]
    fn spi_write_failure_is_reported() {
        let log = wire_log();
        let mut iface = SpiInterface::new(
            FakeSpi {
                log: log.clone(),
                fail: true,
            },
            FakePin {
                name: "dc",
                log: log.clone(),
            },
        );
        assert!(matches!(
            iface.send_command(0xAE),
            Err(DisplayError::BusWriteError)
        ));
    }
}
