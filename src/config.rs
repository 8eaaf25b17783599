//! # Configuration Management
//!
//! Two layers of configuration feed the wake cycle:
//! - [`Secrets`]: credentials and endpoints loaded from `secrets.toml`. The
//!   file is required; without it the tag has nothing to show.
//! - [`Settings`]: the fixed constants of the device (sleep time, alert
//!   threshold, timings). These are not read from disk.

use embedded_graphics::pixelcolor::Rgb888;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::transform::Mmol;

/// Default location of the secret store, relative to the working directory.
pub const SECRETS_FILE: &str = "secrets.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("secrets file {path} unreadable: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("secrets file {path} invalid: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Network credentials and endpoints, loaded once per process.
#[derive(Clone, Deserialize, Serialize)]
pub struct Secrets {
    /// Wi-Fi network name
    pub ssid: String,
    /// Wi-Fi passphrase
    pub password: String,
    /// Adafruit IO account name, used by the time service
    pub aio_username: String,
    /// Adafruit IO key
    pub aio_key: String,
    /// Nightscout SGV entries endpoint, e.g. `https://you.herokuapp.com/api/v1/entries/sgv`
    pub nightscout_url: String,
    /// IANA zone name passed to the time service (e.g. `Europe/London`)
    #[serde(default)]
    pub timezone: Option<String>,
}

// Hand-written so credentials never reach the log.
impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("ssid", &self.ssid)
            .field("password", &"***")
            .field("aio_username", &self.aio_username)
            .field("aio_key", &"***")
            .field("nightscout_url", &self.nightscout_url)
            .field("timezone", &self.timezone)
            .finish()
    }
}

impl Secrets {
    /// Load secrets from `secrets.toml` in the working directory.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(SECRETS_FILE)
    }

    /// Load secrets from the specified path.
    ///
    /// Unlike most settings files there is no default to fall back on: a
    /// missing or malformed file is an error.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let secrets = toml::from_str::<Secrets>(&contents).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        log::info!("Loaded secrets for Nightscout site {}", secrets.nightscout_url);
        Ok(secrets)
    }
}

/// Fixed device behaviour.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Time between wake cycles
    pub sleep_time: Duration,
    /// Timeout for the Nightscout request
    pub glucose_timeout: Duration,
    /// Pause before restarting a failed cycle
    pub restart_delay: Duration,
    /// Values strictly below this trigger the low alert
    pub alert_threshold: Mmol,
    /// Number of on/off flashes in the low alert
    pub alert_flashes: u32,
    /// On and off duration of each flash
    pub flash_interval: Duration,
    /// Colour of the low alert
    pub alert_color: Rgb888,
    /// How long the ambient colour is held before sleeping
    pub ambient_hold: Duration,
    /// CheerLights feed returning the current shared colour
    pub ambient_url: String,
    /// JSON field holding the colour in the CheerLights response
    pub ambient_field: String,
    /// Directory holding `bmps/nightscout.bmp`
    pub asset_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            // Update every minute. Other useful values: 5 * 60, 60 * 60, 24 * 60 * 60.
            sleep_time: Duration::from_secs(60),
            glucose_timeout: Duration::from_secs(30),
            restart_delay: Duration::from_secs(3),
            alert_threshold: Mmol::from_tenths(45),
            alert_flashes: 5,
            flash_interval: Duration::from_millis(100),
            alert_color: Rgb888::new(255, 0, 0),
            ambient_hold: Duration::from_secs(3),
            ambient_url: "http://api.thingspeak.com/channels/1417/field/2/last.json".to_string(),
            ambient_field: "field2".to_string(),
            asset_dir: PathBuf::from("assets"),
        }
    }
}
