//! # Nightscout Tag Entry Point
//!
//! Loads the secret store, picks the output panel and network backend from
//! the command line, then hands control to the wake-cycle supervisor.
//!
//! ```text
//! nightscout-tag [--stdout] [--pbm <path>] [--fake] [--once]
//! ```
//!
//! - `--stdout`: ASCII preview instead of the e-paper panel
//! - `--pbm <path>`: write each frame as a PBM image
//! - `--fake`: canned responses, no network
//! - `--once`: one cycle then exit (non-zero if it had to restart)

// Test modules
#[cfg(test)]
mod tests;

use anyhow::Context;
use std::env;
use std::path::PathBuf;

use nightscout_tag_lib::{
    config::{Secrets, Settings},
    cycle::{Board, Outcome},
    fake::{FakeConnector, FakeRadio},
    indicator::{LogIndicator, StdDelay},
    net::{Connector, HostRadio, Radio, ReqwestConnector},
    panel::{AsciiPanel, Panel, PbmPanel},
    sleep::ThreadAlarm,
};

/// Command line switches.
#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    stdout: bool,
    once: bool,
    fake: bool,
    pbm: Option<PathBuf>,
}

impl Options {
    fn parse(args: &[String]) -> Self {
        Options {
            stdout: args.iter().any(|arg| arg == "--stdout"),
            once: args.iter().any(|arg| arg == "--once"),
            fake: args.iter().any(|arg| arg == "--fake"),
            pbm: args
                .windows(2)
                .find(|pair| pair[0] == "--pbm")
                .map(|pair| PathBuf::from(&pair[1])),
        }
    }
}

/// Choose where frames go. Hardware problems fall back to the ASCII preview.
fn select_panel(options: &Options) -> Box<dyn Panel> {
    if options.stdout {
        return Box::new(AsciiPanel);
    }
    if let Some(path) = &options.pbm {
        return Box::new(PbmPanel::new(path));
    }

    #[cfg(all(target_os = "linux", feature = "hardware"))]
    {
        match nightscout_tag_lib::epd::EpdPanel::open() {
            Ok(panel) => return Box::new(panel),
            Err(e) => {
                log::error!("E-paper panel initialisation failed: {e:#}");
                log::warn!("Falling back to ASCII output");
            }
        }
    }

    #[cfg(not(all(target_os = "linux", feature = "hardware")))]
    log::warn!(
        "E-paper support not enabled. Rebuild with --features hardware; showing ASCII output instead"
    );

    Box::new(AsciiPanel)
}

fn drive<R, C>(
    secrets: Secrets,
    settings: Settings,
    radio: R,
    connector: C,
    panel: Box<dyn Panel>,
    once: bool,
) -> anyhow::Result<()>
where
    R: Radio,
    C: Connector,
{
    let mut board = Board {
        secrets,
        settings,
        radio,
        connector,
        indicator: LogIndicator::new(),
        delay: StdDelay,
        panel,
        alarm: ThreadAlarm,
    };

    if once {
        match board.attempt() {
            Outcome::Completed(report) => {
                log::info!(
                    "Showed {} {} at {}",
                    report.glucose,
                    report.glyph,
                    report.time
                );
                Ok(())
            }
            Outcome::Restarted => Err(anyhow::anyhow!("wake cycle failed, see log")),
        }
    } else {
        board.run()
    }
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = Options::parse(&args);

    // Without secrets there is nothing to fetch; this is the one error that
    // stops the process instead of restarting the cycle.
    let secrets = if options.fake {
        Secrets::load().unwrap_or_else(|e| {
            log::warn!("{e}; using placeholder secrets for --fake");
            placeholder_secrets()
        })
    } else {
        Secrets::load().context("WiFi secrets are kept in secrets.toml, please add them there")?
    };
    let settings = Settings::default();
    let panel = select_panel(&options);

    if options.fake {
        drive(secrets, settings, FakeRadio, FakeConnector, panel, options.once)
    } else {
        drive(
            secrets,
            settings,
            HostRadio::new(),
            ReqwestConnector,
            panel,
            options.once,
        )
    }
}

fn placeholder_secrets() -> Secrets {
    Secrets {
        ssid: "fake".to_string(),
        password: String::new(),
        aio_username: "fake".to_string(),
        aio_key: "fake".to_string(),
        nightscout_url: "https://nightscout.invalid/api/v1/entries/sgv".to_string(),
        timezone: None,
    }
}
