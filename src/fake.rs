//! Canned network for working on the layout without a Nightscout site.
//!
//! Selected with `--fake`. URLs are matched by substring, so the real secrets
//! still produce the right responses.

use std::time::Duration;

use crate::net::{Connector, HttpGet, NetError, Radio};

pub const FAKE_ENTRIES: &str =
    "\"2022-01-17T19:24:34.454Z\"\t1642447474454\t187\t\"Flat\"\t\"tomato\"\n";
pub const FAKE_TIME: &str = "2022-01-17 19:24:34.454 017 1 +0000 UTC";
pub const FAKE_COLOR: &str =
    r##"{"created_at":"2022-01-17T19:24:00Z","entry_id":1,"field2":"#ff8000"}"##;

/// Radio that is always associated.
#[derive(Debug, Default)]
pub struct FakeRadio;

impl Radio for FakeRadio {
    fn connect(&mut self, ssid: &str, _password: &str) -> Result<(), NetError> {
        log::info!("Pretending to join {ssid}");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeConnector;

impl Connector for FakeConnector {
    type Session = FakeSession;

    fn open(&mut self) -> Result<FakeSession, NetError> {
        Ok(FakeSession)
    }
}

#[derive(Debug, Default)]
pub struct FakeSession;

impl HttpGet for FakeSession {
    fn get_text(&mut self, url: &str, _timeout: Option<Duration>) -> Result<String, NetError> {
        let body = if url.contains("/integrations/time/") {
            FAKE_TIME
        } else if url.contains("thingspeak.com") {
            FAKE_COLOR
        } else {
            FAKE_ENTRIES
        };
        Ok(body.to_string())
    }
}
