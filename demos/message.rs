//! Show one or two centered lines of text on an SSD1306.
//!
//!     cargo run --example message --features linux -- --bus spi "Hello" "world"

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use linux_embedded_hal::Delay;

use ssd1306_inky::linux::{self, DEFAULT_GPIO_CHIP, DEFAULT_I2C_BUS, DEFAULT_SPI_DEVICE};
use ssd1306_inky::{Config, Display, DisplayInterface, Flags, Font, Model};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Bus {
    I2c,
    Spi,
}

#[derive(Debug, Parser)]
#[command(name = "message")]
#[command(about = "Print a message on an SSD1306 OLED")]
struct Cli {
    #[arg(long, value_enum, default_value = "i2c")]
    bus: Bus,
    /// Bus device path. Defaults to the usual Raspberry Pi bus for the selected interface.
    #[arg(long)]
    device: Option<String>,
    #[arg(long, default_value_t = 0x3C)]
    address: u8,
    /// Panel height in rows, 32 or 64.
    #[arg(long, default_value_t = 64)]
    rows: u16,
    #[arg(long, default_value_t = 24)]
    dc_line: u32,
    #[arg(long, default_value_t = 25)]
    reset_line: u32,
    /// Glyph height: 8, 14 or 16.
    #[arg(long, default_value_t = 16)]
    font: u8,
    #[arg(short, long)]
    inverse: bool,
    #[arg(short, long)]
    rotate: bool,
    /// Leave the controller as it is instead of running the init sequence.
    #[arg(short, long)]
    skip_init: bool,
    first: String,
    second: Option<String>,
}

fn centered_x<DI: DisplayInterface>(disp: &Display<DI>, text: &str) -> i32 {
    (disp.width() - text.len() as i32 * disp.font_width()) / 2
}

fn show<DI: DisplayInterface>(mut disp: Display<DI>, cli: &Cli) -> Result<()> {
    if !cli.skip_init {
        disp.initialize(Config::new(), &mut Delay)
            .context("initializing display")?;
    }
    disp.set_font(match cli.font {
        8 => Font::Px8,
        14 => Font::Px14,
        _ => Font::Px16,
    });
    disp.clear();

    let lines = if cli.second.is_some() { 2 } else { 1 };
    let mut y = (disp.height() - disp.font_height() * lines) / 2;
    let x = centered_x(&disp, &cli.first);
    disp.put_str(x, y, &cli.first);
    if let Some(second) = &cli.second {
        y += disp.font_height();
        let x = centered_x(&disp, second);
        disp.put_str(x, y, second);
    }

    disp.refresh().context("refreshing display")?;
    disp.on().context("turning display on")?;
    disp.close();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let model = match cli.rows {
        32 => Model::Oled128x32,
        64 => Model::Oled128x64,
        _ => Model::Oled96x16,
    };
    let mut flags = Flags::NONE;
    if cli.inverse {
        flags = flags | Flags::INVERSE;
    }
    if cli.rotate {
        flags = flags | Flags::ROTATE;
    }

    match cli.bus {
        Bus::I2c => {
            let path = cli.device.as_deref().unwrap_or(DEFAULT_I2C_BUS);
            let disp = linux::open_i2c(path, cli.address, model, flags)
                .with_context(|| format!("opening display on {}", path))?;
            show(disp, &cli)
        }
        Bus::Spi => {
            let path = cli.device.as_deref().unwrap_or(DEFAULT_SPI_DEVICE);
            let disp = linux::open_spi(
                path,
                DEFAULT_GPIO_CHIP,
                cli.dc_line,
                cli.reset_line,
                model,
                flags,
            )
            .with_context(|| format!("opening display on {}", path))?;
            show(disp, &cli)
        }
    }
}
