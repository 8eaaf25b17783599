//! # Nightscout Reading Fetcher
//!
//! Pulls the newest sensor glucose value from a Nightscout site.
//!
//! ## Data Source
//! - **URL**: the `nightscout_url` secret, normally `.../api/v1/entries/sgv`
//! - **Format**: tab-separated rows, newest first:
//!
//! ```text
//! "2022-01-17T19:24:34.454Z"	1642447474454	187	"Flat"	"tomato"
//! ```
//!
//! Only the first row matters. The body is split on tabs as a whole, so
//! field 2 is the glucose value and field 3 the quoted trend code of that row.
//!
//! ## Error Handling
//! Every failure here is fatal for the cycle: an unreachable site, a non-2xx
//! status, too few fields or a non-numeric value all surface as
//! [`NightscoutError`], and the supervisor restarts from scratch.

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

use crate::net::{loggable_url, HttpGet, NetError};
use crate::Reading;

const FIELD_CAPTURED_MS: usize = 1;
const FIELD_SGV: usize = 2;
const FIELD_DIRECTION: usize = 3;

#[derive(Error, Debug)]
pub enum NightscoutError {
    /// HTTP request failed
    #[error("Nightscout request failed: {0}")]
    Net(#[from] NetError),

    /// Body did not contain a full entry row
    #[error("Nightscout response has {found} fields, expected at least 4")]
    TooFewFields { found: usize },

    /// Glucose field was not an integer
    #[error("Nightscout glucose field {0:?} is not an integer")]
    BadGlucose(String),
}

/// Fetch and parse the latest reading.
pub fn fetch<H: HttpGet + ?Sized>(
    session: &mut H,
    url: &str,
    timeout: Duration,
) -> Result<Reading, NightscoutError> {
    log::info!("Fetching glucose entries from {}", loggable_url(url));
    let body = session.get_text(url, Some(timeout))?;
    log::debug!("Nightscout response: {:?}", body);
    parse_entries(&body)
}

/// Parse a tab-separated entries body into a [`Reading`].
pub fn parse_entries(body: &str) -> Result<Reading, NightscoutError> {
    let fields: Vec<&str> = body.split('\t').collect();
    if fields.len() <= FIELD_DIRECTION {
        return Err(NightscoutError::TooFewFields {
            found: fields.len(),
        });
    }

    let raw_sgv = fields[FIELD_SGV].trim();
    let sgv = raw_sgv
        .parse::<i64>()
        .map_err(|_| NightscoutError::BadGlucose(raw_sgv.to_string()))?;

    Ok(Reading {
        sgv,
        direction: strip_ends(fields[FIELD_DIRECTION]).to_string(),
        captured_at: parse_captured(fields[FIELD_CAPTURED_MS]),
    })
}

/// Drop the first and last character (the quotes around the trend code).
fn strip_ends(field: &str) -> &str {
    let mut chars = field.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

fn parse_captured(field: &str) -> Option<DateTime<Utc>> {
    let millis = field.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp_millis(millis)
}
