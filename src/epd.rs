//! Waveshare 2.9" (V2) e-paper panel over Linux spidev and GPIO character devices.
//!
//! Only built with `--features hardware` on Linux.

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use epd_waveshare::{
    color::Color,
    epd2in9_v2::{Display2in9, Epd2in9},
    prelude::*,
};
use linux_embedded_hal::{
    gpio_cdev::{Chip, LineRequestFlags},
    spidev::{SpiModeFlags, SpidevOptions},
    CdevPin, Delay, SpidevDevice,
};

use crate::frame::Frame;
use crate::panel::Panel;

const SPI_DEVICE: &str = "/dev/spidev0.0";
const GPIO_CHIP: &str = "/dev/gpiochip0";
const BUSY_PIN: u32 = 24;
const DC_PIN: u32 = 25;
const RST_PIN: u32 = 17;

type Driver = Epd2in9<SpidevDevice, CdevPin, CdevPin, CdevPin, Delay>;

pub struct EpdPanel {
    spi: SpidevDevice,
    epd: Driver,
    delay: Delay,
}

impl EpdPanel {
    /// Open SPI and the control lines, then initialise the controller.
    pub fn open() -> anyhow::Result<Self> {
        let mut spi = SpidevDevice::open(SPI_DEVICE)
            .map_err(|e| anyhow::anyhow!("open {SPI_DEVICE}: {e:?}"))?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(4_000_000)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options)
            .map_err(|e| anyhow::anyhow!("configure {SPI_DEVICE}: {e:?}"))?;

        let mut chip = Chip::new(GPIO_CHIP)?;
        let busy = CdevPin::new(chip.get_line(BUSY_PIN)?.request(
            LineRequestFlags::INPUT,
            0,
            "busy",
        )?)
        .map_err(|e| anyhow::anyhow!("busy pin: {e:?}"))?;
        let dc = CdevPin::new(chip.get_line(DC_PIN)?.request(
            LineRequestFlags::OUTPUT,
            0,
            "dc",
        )?)
        .map_err(|e| anyhow::anyhow!("dc pin: {e:?}"))?;
        let rst = CdevPin::new(chip.get_line(RST_PIN)?.request(
            LineRequestFlags::OUTPUT,
            1,
            "rst",
        )?)
        .map_err(|e| anyhow::anyhow!("rst pin: {e:?}"))?;

        let mut delay = Delay {};
        let epd = Epd2in9::new(&mut spi, busy, dc, rst, &mut delay, None)
            .map_err(|e| anyhow::anyhow!("EPD init: {e:?}"))?;
        log::info!("E-paper panel initialised on {SPI_DEVICE}");

        Ok(Self { spi, epd, delay })
    }

    fn push(&mut self, frame: &Frame) -> anyhow::Result<()> {
        let mut display = Display2in9::default();
        display.set_rotation(DisplayRotation::Rotate90);
        let pixels = frame.pixels().map(|Pixel(point, color)| {
            let color = match color {
                BinaryColor::On => Color::Black,
                BinaryColor::Off => Color::White,
            };
            Pixel(point, color)
        });
        display
            .draw_iter(pixels)
            .map_err(|e| anyhow::anyhow!("draw: {e:?}"))?;

        self.epd
            .wake_up(&mut self.spi, &mut self.delay)
            .map_err(|e| anyhow::anyhow!("wake: {e:?}"))?;
        self.epd
            .update_and_display_frame(&mut self.spi, display.buffer(), &mut self.delay)
            .map_err(|e| anyhow::anyhow!("display: {e:?}"))?;
        self.epd
            .sleep(&mut self.spi, &mut self.delay)
            .map_err(|e| anyhow::anyhow!("sleep: {e:?}"))?;
        Ok(())
    }
}

impl Panel for EpdPanel {
    fn show(&mut self, frame: &Frame) {
        match self.push(frame) {
            Ok(()) => log::info!("E-paper frame shown"),
            Err(e) => log::warn!("E-paper update failed: {e}"),
        }
    }
}
