//! Indicator light (the tag's NeoPixels) and the low-glucose alert.

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_hal::delay::DelayNs;
use std::time::Duration;

use crate::config::Settings;
use crate::transform::Mmol;

/// NeoPixel strip driven as a single colour.
pub trait Indicator {
    /// Power the pixels on or off. Off keeps the last fill for the next power-on.
    fn set_enabled(&mut self, enabled: bool);
    fn fill(&mut self, color: Rgb888);
}

/// Indicator for hosts without pixels: tracks state and logs changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogIndicator {
    enabled: bool,
    color: Rgb888,
}

impl Default for LogIndicator {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Rgb888::BLACK,
        }
    }
}

impl LogIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn color(&self) -> Rgb888 {
        self.color
    }
}

impl Indicator for LogIndicator {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        log::debug!("[indicator] {}", if enabled { "on" } else { "off" });
    }

    fn fill(&mut self, color: Rgb888) {
        self.color = color;
        log::debug!(
            "[indicator] fill #{:02x}{:02x}{:02x}",
            color.r(),
            color.g(),
            color.b()
        );
    }
}

/// `DelayNs` over `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

/// Hold for a [`Duration`] through a `DelayNs`, in millisecond steps.
pub fn hold<D: DelayNs + ?Sized>(delay: &mut D, duration: Duration) {
    let ms = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
    delay.delay_ms(ms);
}

/// Flash `settings.alert_flashes` times if `value` is below the alert threshold.
///
/// Returns the number of flashes performed.
pub fn low_alert<I, D>(indicator: &mut I, delay: &mut D, value: Mmol, settings: &Settings) -> u32
where
    I: Indicator + ?Sized,
    D: DelayNs + ?Sized,
{
    if value >= settings.alert_threshold {
        return 0;
    }

    log::warn!(
        "Glucose {} below {}, flashing alert",
        value,
        settings.alert_threshold
    );
    for _ in 0..settings.alert_flashes {
        indicator.set_enabled(true);
        indicator.fill(settings.alert_color);
        hold(delay, settings.flash_interval);
        indicator.set_enabled(false);
        hold(delay, settings.flash_interval);
    }
    settings.alert_flashes
}
