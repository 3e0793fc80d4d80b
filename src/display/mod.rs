//! The main API to the OLED driver. A `Display` owns the bus interface, a framebuffer that all
//! drawing calls go to, and the packed page buffer that `refresh` sends to the controller.

pub mod pack;
pub mod profile;

use alloc::vec;
use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::command::{Command, ScrollDirection};
use crate::config::{Config, Flags};
use crate::display::pack::pack_pages;
use crate::display::profile::{Model, Profile};
use crate::error::Error;
use crate::font::{Font, FONT_WIDTH};
use crate::framebuffer::Framebuffer;
use crate::interface;

/// One OLED pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Pixel {
    #[default]
    Off,
    On,
}

/// Where a handle is in its lifecycle. A handle that failed to open does not exist, so there is
/// no state for that.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Opened, controller untouched.
    Opened,
    /// The init sequence ran; the panel is still dark.
    Initialized,
    On,
    Off,
}

/// A driver for an SSD1306 display.
pub struct Display<DI>
where
    DI: interface::DisplayInterface,
{
    iface: DI,
    profile: Profile,
    flags: Flags,
    font: Font,
    framebuffer: Framebuffer<Pixel>,
    plane: Vec<u8>,
    state: State,
}

impl<DI> Display<DI>
where
    DI: interface::DisplayInterface,
{
    /// Construct a new display driver for a `model` module connected to the interface `iface`.
    /// Nothing is sent to the controller. Fails for models without a device profile, in which
    /// case `iface` is dropped.
    pub fn new(iface: DI, model: Model, flags: Flags) -> Result<Self, Error> {
        let profile = model.profile().map_err(|e| {
            log::error!("cannot open display: {}", e);
            e
        })?;
        log::info!(
            "opened {}x{} display, flags {:#04x}",
            profile.width,
            profile.height,
            flags.bits()
        );
        Ok(Display {
            iface,
            profile,
            flags,
            font: Font::default(),
            framebuffer: Framebuffer::new(profile.width, profile.height),
            plane: vec![0; profile.plane_len()],
            state: State::Opened,
        })
    }

    /// Reset the controller and send the init sequence for this model. Only allowed once, right
    /// after opening. A transfer failure aborts the sequence and leaves the handle `Opened`.
    pub fn initialize<D>(&mut self, config: Config, delay: &mut D) -> Result<(), Error>
    where
        D: DelayNs,
    {
        if self.state != State::Opened {
            return Err(Error::InvalidState);
        }
        self.iface.reset(delay)?;
        for cmd in self.profile.init_commands(&config, self.flags).iter() {
            log::debug!("init: {:?}", cmd);
            cmd.send(&mut self.iface)?;
        }
        self.state = State::Initialized;
        log::info!("display initialized");
        Ok(())
    }

    /// Turn the panel on. Allowed from any state.
    pub fn on(&mut self) -> Result<(), Error> {
        Command::SetDisplayOn(true).send(&mut self.iface)?;
        self.state = State::On;
        Ok(())
    }

    /// Turn the panel off. Display RAM is kept.
    pub fn off(&mut self) -> Result<(), Error> {
        Command::SetDisplayOn(false).send(&mut self.iface)?;
        self.state = State::Off;
        Ok(())
    }

    /// Control the contrast.
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), Error> {
        Command::SetContrast(contrast).send(&mut self.iface)
    }

    /// Start a continuous right-and-up scroll of the whole panel.
    pub fn start_scroll(&mut self) -> Result<(), Error> {
        Command::DeactivateScroll.send(&mut self.iface)?;
        Command::SetDiagonalScroll(ScrollDirection::Right, 0, 0, 0, 1).send(&mut self.iface)?;
        Command::ActivateScroll.send(&mut self.iface)
    }

    pub fn stop_scroll(&mut self) -> Result<(), Error> {
        Command::DeactivateScroll.send(&mut self.iface)
    }

    /// Pack the framebuffer and write it to the whole of display RAM.
    pub fn refresh(&mut self) -> Result<(), Error> {
        pack_pages(
            &self.framebuffer,
            self.flags.contains(Flags::ROTATE),
            &mut self.plane,
        );
        let last_col = (self.profile.width - 1) as u8;
        let last_page = (self.profile.height / 8 - 1) as u8;
        Command::SetColumnAddress(0, last_col).send(&mut self.iface)?;
        Command::SetPageAddress(0, last_page).send(&mut self.iface)?;
        self.iface.send_data(&self.plane)?;
        Ok(())
    }

    /// Release the handle, giving back the interface.
    pub fn close(self) -> DI {
        log::info!("display closed");
        self.iface
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn width(&self) -> i32 {
        self.framebuffer.width()
    }

    pub fn height(&self) -> i32 {
        self.framebuffer.height()
    }

    pub fn font_width(&self) -> i32 {
        FONT_WIDTH
    }

    pub fn font_height(&self) -> i32 {
        self.font.height()
    }

    /// Select the font used by `put_char` and `put_str`.
    pub fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    pub fn framebuffer(&self) -> &Framebuffer<Pixel> {
        &self.framebuffer
    }

    /// The page buffer as of the last `refresh`.
    pub fn plane(&self) -> &[u8] {
        &self.plane
    }

    pub fn clear(&mut self) {
        self.framebuffer.clear();
    }

    pub fn put_pixel(&mut self, x: i32, y: i32, value: Pixel) -> bool {
        self.framebuffer.put_pixel(x, y, value)
    }

    pub fn put_char(&mut self, x: i32, y: i32, code: u8) {
        self.framebuffer.put_char(x, y, code, self.font, Pixel::On);
    }

    pub fn put_str(&mut self, x: i32, y: i32, s: &str) {
        self.framebuffer.put_str(x, y, s, self.font, Pixel::On);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VccSource;
    use crate::interface::test_spy::{Sent, SpyDelay, TestSpyInterface};

    fn open(model: Model, flags: Flags) -> (TestSpyInterface, Display<TestSpyInterface>) {
        let di = TestSpyInterface::new();
        let disp = Display::new(di.split(), model, flags).unwrap();
        (di, disp)
    }

    #[test]
    fn open_sends_nothing() {
        let (di, disp) = open(Model::Oled128x64, Flags::NONE);
        di.check_multi(&[]);
        assert_eq!(disp.state(), State::Opened);
        assert_eq!((disp.width(), disp.height()), (128, 64));
        assert_eq!((disp.font_width(), disp.font_height()), (8, 16));
    }

    #[test]
    fn open_unsupported_model() {
        let di = TestSpyInterface::new();
        assert!(matches!(
            Display::new(di.split(), Model::Oled96x16, Flags::NONE),
            Err(Error::UnsupportedGeometry(Model::Oled96x16))
        ));
    }

    #[test]
    fn init_128x64() {
        let (di, mut disp) = open(Model::Oled128x64, Flags::NONE);
        disp.initialize(Config::new(), &mut SpyDelay::default()).unwrap();
        #[rustfmt::skip]
        di.check_multi(sends!(
            Reset,
            0xAE, // display off
            0xD5, 0x80, // clock
            0xA8, 0x3F, // mux ratio 64 lines
            0xD3, 0x00, // display offset 0
            0x40, // start line 0
            0x8D, 0x14, // charge pump on
            0x20, 0x00, // horizontal addressing
            0xA1, // segment remap
            0xC8, // COM scan reversed
            0xDA, 0x12, // alternative COM pins
            0x81, 0x8F, // contrast
            0xD9, 0xF1, // pre-charge
            0xDB, 0x40, // VCOMH
            0xA4, // follow RAM
            0xA6 // normal
        ));
        assert_eq!(disp.state(), State::Initialized);
    }

    #[test]
    fn init_128x32_inverse_external_vcc() {
        let (di, mut disp) = open(Model::Oled128x32, Flags::INVERSE);
        let cfg = Config::new().vcc(VccSource::External);
        disp.initialize(cfg, &mut SpyDelay::default()).unwrap();
        #[rustfmt::skip]
        di.check_multi(sends!(
            Reset,
            0xAE,
            0xD5, 0x80,
            0xA8, 0x1F, // mux ratio 32 lines
            0xD3, 0x00,
            0x40,
            0x8D, 0x10, // charge pump off
            0x20, 0x00,
            0xA1,
            0xC8,
            0xDA, 0x02, // sequential COM pins
            0x81, 0x8F,
            0xD9, 0x22, // pre-charge for external VCC
            0xDB, 0x40,
            0xA4,
            0xA7 // inverse
        ));
    }

    #[test]
    fn init_over_i2c_stops_scroll_first() {
        use crate::interface::i2c::I2cInterface;
        use crate::interface::test_spy::{wire_log, FakeI2c, Wire};

        let log = wire_log();
        let iface = I2cInterface::new(
            FakeI2c {
                log: log.clone(),
                fail: false,
            },
            0x3C,
        );
        let mut disp = Display::new(iface, Model::Oled128x32, Flags::NONE).unwrap();
        disp.initialize(Config::new(), &mut SpyDelay::default()).unwrap();
        let wire = log.borrow();
        assert_eq!(wire.len(), 25);
        assert_eq!(wire[0], Wire::I2c(0x3C, vec![0x00, 0x2E]));
        assert_eq!(wire[1], Wire::I2c(0x3C, vec![0x00, 0xAE]));
        assert_eq!(wire[24], Wire::I2c(0x3C, vec![0x00, 0xA6]));
    }

    #[test]
    fn initialize_only_from_opened() {
        let (_di, mut disp) = open(Model::Oled128x64, Flags::NONE);
        let mut delay = SpyDelay::default();
        disp.initialize(Config::new(), &mut delay).unwrap();
        assert!(matches!(
            disp.initialize(Config::new(), &mut delay),
            Err(Error::InvalidState)
        ));
        disp.on().unwrap();
        assert!(matches!(
            disp.initialize(Config::new(), &mut delay),
            Err(Error::InvalidState)
        ));
    }

    #[test]
    fn on_off_without_initialize() {
        let (di, mut disp) = open(Model::Oled128x64, Flags::NONE);
        disp.on().unwrap();
        assert_eq!(disp.state(), State::On);
        disp.off().unwrap();
        assert_eq!(disp.state(), State::Off);
        di.check_multi(sends!(0xAF, 0xAE));
    }

    #[test]
    fn failed_init_stays_opened() {
        let (di, mut disp) = open(Model::Oled128x64, Flags::NONE);
        di.fail_after(5);
        assert!(matches!(
            disp.initialize(Config::new(), &mut SpyDelay::default()),
            Err(Error::Interface(_))
        ));
        // Nothing after the failed mux ratio argument went out.
        di.check_multi(sends!(Reset, 0xAE, 0xD5, 0x80, 0xA8));
        assert_eq!(disp.state(), State::Opened);
        // Still allowed to try again.
        assert!(matches!(
            disp.initialize(Config::new(), &mut SpyDelay::default()),
            Err(Error::Interface(_))
        ));
    }

    #[test]
    fn refresh_blank_128x32() {
        let (di, mut disp) = open(Model::Oled128x32, Flags::NONE);
        disp.refresh().unwrap();
        let mut expected = sends!(0x21, 0x00, 0x7F, 0x22, 0x00, 0x03).to_vec();
        expected.push(Sent::Data(vec![0; 512]));
        di.check_multi(&expected);
        assert_eq!(disp.plane().len(), 512);
    }

    #[test]
    fn refresh_hi_128x64() {
        let (mut di, mut disp) = open(Model::Oled128x64, Flags::NONE);
        disp.initialize(Config::new(), &mut SpyDelay::default()).unwrap();
        assert_eq!(disp.state(), State::Initialized);
        di.clear();
        disp.clear();
        disp.put_str(0, 0, "HI");
        disp.refresh().unwrap();

        let mut plane = vec![0u8; 1024];
        #[rustfmt::skip]
        plane[..16].copy_from_slice(&[
            0xFC, 0xFC, 0x40, 0x40, 0x40, 0xFC, 0xFC, 0x00,
            0x00, 0x00, 0x04, 0xFC, 0xFC, 0x04, 0x00, 0x00,
        ]);
        #[rustfmt::skip]
        plane[128..144].copy_from_slice(&[
            0x0F, 0x0F, 0x00, 0x00, 0x00, 0x0F, 0x0F, 0x00,
            0x00, 0x00, 0x08, 0x0F, 0x0F, 0x08, 0x00, 0x00,
        ]);

        let mut expected = sends!(0x21, 0x00, 0x7F, 0x22, 0x00, 0x07).to_vec();
        expected.push(Sent::Data(plane.clone()));
        di.check_multi(&expected);
        assert_eq!(disp.plane(), &plane[..]);
    }

    #[test]
    fn refresh_rotated() {
        let (di, mut disp) = open(Model::Oled128x64, Flags::ROTATE);
        disp.put_pixel(0, 0, Pixel::On);
        disp.refresh().unwrap();
        let sent = di.sent();
        match &sent[6] {
            Sent::Data(plane) => {
                assert_eq!(plane[7 * 128 + 127], 0x80);
                assert_eq!(plane.iter().filter(|&&b| b != 0).count(), 1);
            }
            other => panic!("expected plane data, got {:?}", other),
        }
    }

    #[test]
    fn refresh_failure_is_reported() {
        let (di, mut disp) = open(Model::Oled128x64, Flags::NONE);
        di.fail_after(6);
        assert!(matches!(disp.refresh(), Err(Error::Interface(_))));
        assert_eq!(di.sent().len(), 6);
    }

    #[test]
    fn small_font_metrics() {
        let (_di, mut disp) = open(Model::Oled128x32, Flags::NONE);
        disp.set_font(Font::Px8);
        assert_eq!(disp.font_height(), 8);
        disp.put_char(0, 0, b'H');
        assert_eq!(disp.framebuffer().pixel(0, 0), Some(Pixel::On));
        assert_eq!(disp.framebuffer().pixel(7, 0), Some(Pixel::Off));
        assert!(!disp.put_pixel(128, 0, Pixel::On));
    }

    #[test]
    fn scroll() {
        let (di, mut disp) = open(Model::Oled128x64, Flags::NONE);
        disp.start_scroll().unwrap();
        disp.stop_scroll().unwrap();
        di.check_multi(sends!(0x2E, 0x29, 0x00, 0x00, 0x00, 0x00, 0x01, 0x2F, 0x2E));
    }

    #[test]
    fn contrast_and_close() {
        let (di, mut disp) = open(Model::Oled128x64, Flags::NONE);
        disp.set_contrast(0x10).unwrap();
        let iface = disp.close();
        iface.check_multi(sends!(0x81, 0x10));
        di.check_multi(sends!(0x81, 0x10));
    }
}
