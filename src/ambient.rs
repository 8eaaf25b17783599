//! CheerLights ambient colour.
//!
//! Independent of the glucose data: the tag shows whatever colour the shared
//! CheerLights feed currently reports. Failures are logged and ignored, and
//! the hex value is parsed before the indicator is touched, so a bad response
//! leaves the light exactly as it was.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_hal::delay::DelayNs;
use thiserror::Error;

use crate::config::Settings;
use crate::indicator::{hold, Indicator};
use crate::net::{HttpGet, NetError};

#[derive(Error, Debug)]
pub enum AmbientError {
    #[error("colour request failed: {0}")]
    Net(#[from] NetError),

    #[error("colour response is not JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("colour response has no string field {0:?}")]
    MissingField(String),

    #[error("{0:?} is not a #RRGGBB colour")]
    BadColor(String),
}

/// Fetch the feed colour. No request timeout.
pub fn fetch_color<H: HttpGet + ?Sized>(
    session: &mut H,
    url: &str,
    field: &str,
) -> Result<Rgb888, AmbientError> {
    let body = session.get_text(url, None)?;
    let value: serde_json::Value = serde_json::from_str(&body)?;
    let hex = value
        .get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| AmbientError::MissingField(field.to_string()))?;
    log::info!("Ambient colour is {hex}");
    parse_hex_color(hex)
}

/// Parse `#RRGGBB` (the leading character is dropped, whatever it is).
pub fn parse_hex_color(hex: &str) -> Result<Rgb888, AmbientError> {
    let bad = || AmbientError::BadColor(hex.to_string());
    let mut chars = hex.chars();
    chars.next().ok_or_else(bad)?;
    let digits = chars.as_str();
    if digits.is_empty() || digits.len() > 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(bad());
    }
    let rgb = u32::from_str_radix(digits, 16).map_err(|_| bad())?;
    Ok(Rgb888::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8))
}

/// Apply the CheerLights colour and hold it. Returns whether it was applied.
pub fn apply<H, I, D>(session: &mut H, indicator: &mut I, delay: &mut D, settings: &Settings) -> bool
where
    H: HttpGet + ?Sized,
    I: Indicator + ?Sized,
    D: DelayNs + ?Sized,
{
    match fetch_color(session, &settings.ambient_url, &settings.ambient_field) {
        Ok(color) => {
            indicator.set_enabled(true);
            indicator.fill(color);
            hold(delay, settings.ambient_hold);
            true
        }
        Err(e) => {
            log::warn!("Ambient colour skipped: {e}");
            false
        }
    }
}
