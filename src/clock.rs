//! Current time from the Adafruit IO strftime integration.
//!
//! The service answers with plain text in a fixed layout, e.g.
//! `2022-01-17 19:24:34.454 017 1 +0000 UTC`. Characters 11..16 are `HH:MM`.

use thiserror::Error;
use url::form_urlencoded::byte_serialize;

use crate::config::Secrets;
use crate::net::{loggable_url, HttpGet, NetError};

const TIME_API: &str = "https://io.adafruit.com/api/v2";

/// `%Y-%m-%d %H:%M:%S.%L %j %u %z %Z`, already URL-encoded.
const TIME_FORMAT: &str = "%25Y-%25m-%25d+%25H%3A%25M%3A%25S.%25L+%25j+%25u+%25z+%25Z";

const HH_MM: std::ops::Range<usize> = 11..16;

#[derive(Error, Debug)]
pub enum TimeError {
    #[error("time request failed: {0}")]
    Net(#[from] NetError),

    #[error("time response {0:?} too short for HH:MM")]
    Malformed(String),
}

/// Build the strftime URL for the configured account.
///
/// Key and zone are form-encoded, so `Etc/GMT+5` arrives intact.
pub fn time_url(secrets: &Secrets) -> String {
    let mut url = format!(
        "{TIME_API}/{}/integrations/time/strftime?x-aio-key={}&fmt={TIME_FORMAT}",
        secrets.aio_username,
        query_value(&secrets.aio_key)
    );
    if let Some(tz) = secrets.timezone.as_deref().filter(|tz| !tz.is_empty()) {
        url.push_str("&tz=");
        url.push_str(&query_value(tz));
    }
    url
}

fn query_value(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

/// Fetch the current time and return it as `HH:MM`. No request timeout.
pub fn fetch<H: HttpGet + ?Sized>(session: &mut H, url: &str) -> Result<String, TimeError> {
    log::info!("Fetching time from {}", loggable_url(url));
    let text = session.get_text(url, None)?;
    log::debug!("Time response: {:?}", text);
    extract_hh_mm(&text)
}

/// Cut `HH:MM` out of the service's fixed-layout response.
pub fn extract_hh_mm(text: &str) -> Result<String, TimeError> {
    let hh_mm: String = text
        .chars()
        .skip(HH_MM.start)
        .take(HH_MM.len())
        .collect();
    if hh_mm.chars().count() < HH_MM.len() {
        return Err(TimeError::Malformed(text.to_string()));
    }
    Ok(hh_mm)
}
