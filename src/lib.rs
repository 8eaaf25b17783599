//! # Nightscout Tag Core Library
//!
//! This library drives a battery-powered e-paper tag that shows the latest
//! Nightscout glucose reading. Every wake cycle is one straight pass:
//!
//! 1. **Connect**: associate with Wi-Fi and open an HTTP session
//! 2. **Fetch**: pull the newest sensor glucose value (SGV) from Nightscout
//! 3. **Transform**: convert mg/dL to mmol/L and map the trend to an arrow
//! 4. **Alert**: flash the indicator red when the value is low
//! 5. **Clock**: fetch the current `HH:MM` from Adafruit IO
//! 6. **Render**: draw background plus four text fields and push the frame
//! 7. **Ambient**: apply the shared CheerLights colour to the indicator
//! 8. **Sleep**: block until the next wake
//!
//! Any failure in steps 1, 2 or 5 restarts the cycle from scratch after a
//! short delay. The ambient step only ever logs its failures.
//!
//! ## Hardware seams
//!
//! Every platform collaborator sits behind a small trait so the workflow in
//! [`cycle`] runs unchanged on the device, on a desktop with ASCII output,
//! and inside tests:
//! - [`net::Radio`] and [`net::Connector`] for the network
//! - [`indicator::Indicator`] for the NeoPixel
//! - [`embedded_hal::delay::DelayNs`] for holds
//! - [`panel::Panel`] for the e-paper surface
//! - [`sleep::WakeAlarm`] for the deep-sleep wait

use chrono::{DateTime, Utc};

// Module declarations
pub mod ambient;
pub mod clock;
pub mod config;
pub mod cycle;
#[cfg(all(target_os = "linux", feature = "hardware"))]
pub mod epd;
pub mod fake;
pub mod frame;
pub mod indicator;
pub mod net;
pub mod nightscout;
pub mod panel;
pub mod renderer;
pub mod sleep;
pub mod transform;

/// One glucose measurement as reported by Nightscout.
///
/// Lives for a single wake cycle: parsed from the tab-separated entries
/// response, transformed for display, then dropped once the frame is drawn.
///
/// # Example
/// ```
/// use nightscout_tag_lib::Reading;
///
/// let reading = Reading {
///     sgv: 187,
///     direction: "Flat".to_string(),
///     captured_at: None,
/// };
/// assert_eq!(reading.mmol().to_string(), "10.4");
/// assert_eq!(reading.glyph(), "→");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reading {
    /// Sensor glucose value in mg/dL
    pub sgv: i64,
    /// Trend code with its surrounding quotes removed (e.g. `FortyFiveUp`)
    pub direction: String,
    /// When the sensor captured the value, if the response carried it
    pub captured_at: Option<DateTime<Utc>>,
}

impl Reading {
    /// Glucose in display units (mmol/L, one decimal).
    pub fn mmol(&self) -> transform::Mmol {
        transform::Mmol::from_mg_dl(self.sgv)
    }

    /// Arrow glyph for the trend code.
    pub fn glyph(&self) -> &'static str {
        transform::direction_glyph(&self.direction)
    }
}
