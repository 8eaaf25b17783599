//! Recording stand-ins for every hardware seam.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_hal::delay::DelayNs;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use nightscout_tag_lib::{
    config::{Secrets, Settings},
    cycle::Board,
    fake::{FAKE_COLOR, FAKE_ENTRIES, FAKE_TIME},
    frame::Frame,
    indicator::Indicator,
    net::{Connector, HttpGet, NetError, Radio},
    panel::Panel,
    sleep::WakeAlarm,
};

pub type TestBoard = Board<
    ScriptRadio,
    ScriptConnector,
    RecordingIndicator,
    CountingDelay,
    RecordingPanel,
    RecordingAlarm,
>;

#[derive(Default)]
pub struct ScriptRadio {
    pub fail: bool,
    pub connects: u32,
    pub disconnects: u32,
}

impl Radio for ScriptRadio {
    fn connect(&mut self, ssid: &str, _password: &str) -> Result<(), NetError> {
        self.connects += 1;
        if self.fail {
            return Err(NetError::Association {
                ssid: ssid.to_string(),
                reason: "no AP in range".to_string(),
            });
        }
        Ok(())
    }

    fn disconnect(&mut self) {
        self.disconnects += 1;
    }
}

/// Response per endpoint; `None` simulates an unreachable host.
#[derive(Clone)]
pub struct Script {
    pub entries: Option<String>,
    pub time: Option<String>,
    pub color: Option<String>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            entries: Some(FAKE_ENTRIES.to_string()),
            time: Some(FAKE_TIME.to_string()),
            color: Some(FAKE_COLOR.to_string()),
        }
    }
}

pub type RequestLog = Rc<RefCell<Vec<(String, Option<Duration>)>>>;

#[derive(Default)]
pub struct ScriptConnector {
    pub script: Script,
    pub opened: u32,
    pub requests: RequestLog,
}

impl Connector for ScriptConnector {
    type Session = ScriptSession;

    fn open(&mut self) -> Result<ScriptSession, NetError> {
        self.opened += 1;
        Ok(ScriptSession {
            script: self.script.clone(),
            requests: Rc::clone(&self.requests),
        })
    }
}

pub struct ScriptSession {
    script: Script,
    requests: RequestLog,
}

impl HttpGet for ScriptSession {
    fn get_text(&mut self, url: &str, timeout: Option<Duration>) -> Result<String, NetError> {
        self.requests.borrow_mut().push((url.to_string(), timeout));
        let body = if url.contains("/integrations/time/") {
            &self.script.time
        } else if url.contains("thingspeak.com") {
            &self.script.color
        } else {
            &self.script.entries
        };
        body.clone().ok_or_else(|| NetError::Request {
            url: url.to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightEvent {
    On,
    Off,
    Fill(Rgb888),
}

#[derive(Default)]
pub struct RecordingIndicator {
    pub events: Vec<LightEvent>,
}

impl RecordingIndicator {
    pub fn flashes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| **e == LightEvent::Fill(Rgb888::new(255, 0, 0)))
            .count()
    }
}

impl Indicator for RecordingIndicator {
    fn set_enabled(&mut self, enabled: bool) {
        self.events
            .push(if enabled { LightEvent::On } else { LightEvent::Off });
    }

    fn fill(&mut self, color: Rgb888) {
        self.events.push(LightEvent::Fill(color));
    }
}

#[derive(Default)]
pub struct CountingDelay {
    pub total_ms: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ms += u64::from(ns) / 1_000_000;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ms += u64::from(ms);
    }
}

#[derive(Default)]
pub struct RecordingPanel {
    pub frames: Vec<Frame>,
}

impl Panel for RecordingPanel {
    fn show(&mut self, frame: &Frame) {
        self.frames.push(frame.clone());
    }
}

#[derive(Default)]
pub struct RecordingAlarm {
    pub wakes: Vec<Instant>,
}

impl WakeAlarm for RecordingAlarm {
    fn sleep_until(&mut self, wake_at: Instant) {
        self.wakes.push(wake_at);
    }
}

pub fn secrets() -> Secrets {
    Secrets {
        ssid: "home".to_string(),
        password: "hunter2".to_string(),
        aio_username: "alice".to_string(),
        aio_key: "KEY".to_string(),
        nightscout_url: "https://alice.example/api/v1/entries/sgv".to_string(),
        timezone: Some("Europe/London".to_string()),
    }
}

pub fn board(script: Script) -> TestBoard {
    let settings = Settings {
        asset_dir: PathBuf::from("/nonexistent/assets"),
        ..Settings::default()
    };
    Board {
        secrets: secrets(),
        settings,
        radio: ScriptRadio::default(),
        connector: ScriptConnector {
            script,
            ..ScriptConnector::default()
        },
        indicator: RecordingIndicator::default(),
        delay: CountingDelay::default(),
        panel: RecordingPanel::default(),
        alarm: RecordingAlarm::default(),
    }
}
