//! # Wake Cycle and Supervisor
//!
//! [`Board`] owns every platform collaborator plus the configuration, and
//! runs the wake cycle as one straight pass:
//!
//! 1. join Wi-Fi and open an HTTP session
//! 2. fetch the Nightscout reading, convert it, flash if low
//! 3. fetch `HH:MM`
//! 4. render the frame and show it once
//! 5. apply the CheerLights colour (failures ignored)
//!
//! ## Failure policy
//! Steps 1 to 3 are fatal: the error is logged, the board waits
//! `restart_delay`, drops the link and starts over with nothing carried
//! across. The panel is only touched after every fatal step has succeeded.
//!
//! ## Outer loop
//! [`Board::run`] alternates [`Board::attempt`] with a blocking wait on the
//! [`WakeAlarm`]. After a restart there is no sleep; the next attempt starts
//! as soon as the restart delay has elapsed.

use embedded_hal::delay::DelayNs;
use std::time::Instant;
use thiserror::Error;

use crate::config::{Secrets, Settings};
use crate::frame::Frame;
use crate::indicator::{hold, low_alert, Indicator};
use crate::net::{Connector, NetError, Radio};
use crate::nightscout::NightscoutError;
use crate::panel::Panel;
use crate::renderer::{layout, DisplayRenderer};
use crate::sleep::{next_wake, WakeAlarm};
use crate::{ambient, clock, nightscout, Reading};

/// Errors that end a wake cycle early and force a restart.
#[derive(Error, Debug)]
pub enum CycleError {
    /// Wi-Fi association or HTTP session setup failed
    #[error("network setup failed: {0}")]
    Network(#[from] NetError),

    /// Glucose reading could not be fetched or parsed
    #[error(transparent)]
    Glucose(#[from] NightscoutError),

    /// Current time could not be fetched or parsed
    #[error(transparent)]
    Time(#[from] clock::TimeError),
}

/// What a successful cycle put on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleReport {
    pub reading: Reading,
    pub glucose: String,
    pub glyph: &'static str,
    pub time: String,
    pub flashes: u32,
    pub ambient_applied: bool,
}

#[derive(Debug)]
pub enum Outcome {
    /// The frame was shown
    Completed(CycleReport),
    /// A fatal error occurred; the board waited and reset
    Restarted,
}

/// The tag: configuration plus every hardware seam.
pub struct Board<R, C, I, D, P, A> {
    pub secrets: Secrets,
    pub settings: Settings,
    pub radio: R,
    pub connector: C,
    pub indicator: I,
    pub delay: D,
    pub panel: P,
    pub alarm: A,
}

impl<R, C, I, D, P, A> Board<R, C, I, D, P, A>
where
    R: Radio,
    C: Connector,
    I: Indicator,
    D: DelayNs,
    P: Panel,
    A: WakeAlarm,
{
    /// Run one wake cycle up to (not including) the sleep.
    pub fn wake_cycle(&mut self) -> Result<CycleReport, CycleError> {
        let secrets = &self.secrets;
        let settings = &self.settings;

        self.radio.connect(&secrets.ssid, &secrets.password)?;
        let mut session = self.connector.open()?;

        let reading = nightscout::fetch(
            &mut session,
            &secrets.nightscout_url,
            settings.glucose_timeout,
        )?;
        let mmol = reading.mmol();
        let glucose = mmol.to_string();
        let flashes = low_alert(&mut self.indicator, &mut self.delay, mmol, settings);
        let glyph = reading.glyph();
        log::info!(
            "Glucose {} mg/dL = {} mmol/L, trend {:?} {}",
            reading.sgv,
            glucose,
            reading.direction,
            glyph
        );

        let time = clock::fetch(&mut session, &clock::time_url(secrets))?;

        let mut frame = Frame::default();
        DisplayRenderer::load(&settings.asset_dir)
            .render(&mut frame, &layout(&time, &glucose, glyph));
        self.panel.show(&frame);

        let ambient_applied =
            ambient::apply(&mut session, &mut self.indicator, &mut self.delay, settings);

        Ok(CycleReport {
            reading,
            glucose,
            glyph,
            time,
            flashes,
            ambient_applied,
        })
    }

    /// Log a fatal error, wait the restart delay and reset the link.
    pub fn restart(&mut self, error: &CycleError) {
        log::error!(
            "{error}. Restarting in {} seconds...",
            self.settings.restart_delay.as_secs()
        );
        hold(&mut self.delay, self.settings.restart_delay);
        self.radio.disconnect();
    }

    /// One cycle, restarting instead of returning an error.
    pub fn attempt(&mut self) -> Outcome {
        match self.wake_cycle() {
            Ok(report) => Outcome::Completed(report),
            Err(e) => {
                self.restart(&e);
                Outcome::Restarted
            }
        }
    }

    /// One attempt followed, after a completed cycle, by the sleep.
    pub fn step(&mut self) -> Outcome {
        let outcome = self.attempt();
        if let Outcome::Completed(_) = outcome {
            self.radio.disconnect();
            let wake_at = next_wake(Instant::now(), self.settings.sleep_time);
            self.alarm.sleep_until(wake_at);
        }
        outcome
    }

    /// Cycle forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }
}
