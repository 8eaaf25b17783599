//! # Network Session
//!
//! Brings up the link and hands out a blocking HTTP session for one wake cycle.
//!
//! ## Seams
//! - [`Radio`]: Wi-Fi association. On a Linux host the OS owns the interface,
//!   so [`HostRadio`] only checks that credentials are present.
//! - [`Connector`]: opens a fresh [`HttpGet`] session per cycle. The session is
//!   dropped at the end of the cycle (or on restart), so nothing carries over.
//!
//! ## Blocking model
//! [`ReqwestSession`] owns a current-thread Tokio runtime and drives every
//! request through `block_on`. From the workflow's point of view each GET is
//! an ordinary blocking call; there is never more than one in flight.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetError {
    /// Wi-Fi association failed
    #[error("failed to join {ssid}: {reason}")]
    Association { ssid: String, reason: String },

    /// HTTP request failed (network, timeout, TLS or non-2xx status)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Async runtime could not be started
    #[error("runtime setup: {0}")]
    Runtime(#[from] std::io::Error),

    /// Request failed in a non-reqwest session (fakes, other transports)
    #[error("GET {url} failed: {reason}")]
    Request { url: String, reason: String },
}

/// Wireless link.
pub trait Radio {
    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), NetError>;

    /// Drop the association before a restart. Default: nothing to tear down.
    fn disconnect(&mut self) {}
}

/// Blocking text GET.
pub trait HttpGet {
    /// Fetch `url` and return the body. `None` means no request timeout.
    fn get_text(&mut self, url: &str, timeout: Option<Duration>) -> Result<String, NetError>;
}

/// Creates one HTTP session per wake cycle.
pub trait Connector {
    type Session: HttpGet;

    fn open(&mut self) -> Result<Self::Session, NetError>;
}

/// Strip the query string so API keys never reach the log.
pub fn loggable_url(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

/// Radio for hosts whose network is managed by the operating system.
#[derive(Debug, Default)]
pub struct HostRadio {
    connected: bool,
}

impl HostRadio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

impl Radio for HostRadio {
    fn connect(&mut self, ssid: &str, _password: &str) -> Result<(), NetError> {
        if ssid.trim().is_empty() {
            return Err(NetError::Association {
                ssid: ssid.to_string(),
                reason: "no SSID configured".to_string(),
            });
        }
        log::info!("Connecting to AP {ssid} (link managed by host OS)");
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.connected {
            log::debug!("Releasing network link");
        }
        self.connected = false;
    }
}

/// Opens [`ReqwestSession`]s over rustls.
#[derive(Debug, Default)]
pub struct ReqwestConnector;

impl Connector for ReqwestConnector {
    type Session = ReqwestSession;

    fn open(&mut self) -> Result<ReqwestSession, NetError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("nightscout-tag/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(ReqwestSession { runtime, client })
    }
}

pub struct ReqwestSession {
    runtime: tokio::runtime::Runtime,
    client: reqwest::Client,
}

impl HttpGet for ReqwestSession {
    fn get_text(&mut self, url: &str, timeout: Option<Duration>) -> Result<String, NetError> {
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let body = self.runtime.block_on(async {
            let response = request.send().await?.error_for_status()?;
            response.text().await
        })?;
        Ok(body)
    }
}
