//! Sleep scheduling between wake cycles.
//!
//! On the tag a timer alarm powers the board back up and execution starts
//! over. Here the same shape is an outer loop: arm the alarm, block in
//! [`WakeAlarm::sleep_until`], then run the next cycle from fresh state.

use chrono::Local;
use std::time::{Duration, Instant};

pub trait WakeAlarm {
    /// Block until `wake_at`. Returns immediately if it has already passed.
    fn sleep_until(&mut self, wake_at: Instant);
}

/// Wake moment for a cycle that finished at `now`.
pub fn next_wake(now: Instant, sleep_time: Duration) -> Instant {
    now + sleep_time
}

/// Alarm backed by `std::thread::sleep`.
#[derive(Debug, Default)]
pub struct ThreadAlarm;

impl WakeAlarm for ThreadAlarm {
    fn sleep_until(&mut self, wake_at: Instant) {
        let remaining = wake_at.saturating_duration_since(Instant::now());
        let wall_clock = chrono::Duration::from_std(remaining)
            .map(|d| (Local::now() + d).format("%H:%M:%S").to_string())
            .unwrap_or_else(|_| "?".to_string());
        log::info!("Sleeping {}s until {}", remaining.as_secs(), wall_clock);
        std::thread::sleep(remaining);
    }
}
