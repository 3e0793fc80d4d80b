//! Draw a random mirrored ornament strip on an Inky pHAT.
//!
//!     cargo run --example ornament --features linux

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use linux_embedded_hal::Delay;

use ssd1306_inky::linux::{self, InkyLines, DEFAULT_GPIO_CHIP, DEFAULT_SPI_DEVICE};
use ssd1306_inky::{Border, Color, ColorScheme};

/// Side of one quarter of an ornament tile.
const QUARTER: i32 = 13;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scheme {
    Black,
    Red,
    Yellow,
}

#[derive(Debug, Parser)]
#[command(name = "ornament")]
#[command(about = "Draw a random ornament on an Inky pHAT")]
struct Cli {
    #[arg(long, default_value = DEFAULT_SPI_DEVICE)]
    device: String,
    #[arg(long, default_value = DEFAULT_GPIO_CHIP)]
    gpio_chip: String,
    #[arg(long, value_enum, default_value = "red")]
    scheme: Scheme,
    /// Give up if the panel stays busy this long, in milliseconds.
    #[arg(long)]
    busy_timeout: Option<u32>,
}

/// xorshift64; the ornament only needs to look random.
struct Noise(u64);

impl Noise {
    fn seeded() -> Self {
        let t = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Noise(t ^ u64::from(std::process::id()) | 1)
    }

    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let scheme = match cli.scheme {
        Scheme::Black => ColorScheme::Black,
        Scheme::Red => ColorScheme::Red,
        Scheme::Yellow => ColorScheme::Yellow,
    };

    let inky = linux::open_inky(&cli.device, &cli.gpio_chip, InkyLines::default())
        .context("opening Inky pHAT")?;
    let mut inky = inky.with_color_scheme(scheme).with_border(Border::White);
    if let Some(ms) = cli.busy_timeout {
        inky = inky.with_busy_timeout(ms);
    }

    inky.fill(Color::White);
    let mut noise = Noise::seeded();
    let (width, height) = (inky.width(), inky.height());
    let tile = QUARTER * 2;
    for top in (0..height).step_by(tile as usize + 2) {
        for x in 0..QUARTER {
            for y in 0..QUARTER {
                let color = match noise.next() % 5 {
                    0 | 1 => Color::Red,
                    2 | 3 => Color::Black,
                    _ => Color::White,
                };
                for left in (0..width).step_by(tile as usize) {
                    inky.put_pixel(left + x, top + y, color);
                    inky.put_pixel(left + tile - 1 - x, top + y, color);
                    inky.put_pixel(left + tile - 1 - x, top + tile - 1 - y, color);
                    inky.put_pixel(left + x, top + tile - 1 - y, color);
                }
            }
        }
    }

    inky.update(&mut Delay).context("updating panel")?;
    inky.close();
    Ok(())
}
