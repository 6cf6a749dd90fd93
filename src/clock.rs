use std::fmt::Display;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeZone};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// `YYYY-MM-DD HH:MM:SS` in the timezone of `now`.
pub fn format_clock<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Repeating timer polled from the event loop.
///
/// Ticks are counted from the previous tick, not from the start, so a late
/// poll pushes every later tick back. No drift correction.
#[derive(Debug)]
pub struct Ticker {
    interval: Duration,
    last_tick: Instant,
}

impl Ticker {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_tick: now,
        }
    }

    /// Returns true, and restarts the interval, if a tick is due at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_tick) >= self.interval {
            self.last_tick = now;
            true
        } else {
            false
        }
    }

    /// How long the loop may block before the next tick is due.
    pub fn timeout(&self, now: Instant) -> Duration {
        self.interval
            .saturating_sub(now.saturating_duration_since(self.last_tick))
    }
}
