//! Daily monitoring window.
//!
//! A window is a pair of `HH:MM` boundaries. When `start > end` the window
//! wraps past midnight (e.g. 18:00 to 08:00 covers the night).

use anyhow::{anyhow, Result};
use chrono::{NaiveTime, Timelike};
use std::fmt;

const TIME_FORMAT: &str = "%H:%M";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonitoringWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl MonitoringWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            start: truncate_to_minute(start),
            end: truncate_to_minute(end),
        }
    }

    /// Parse a window from two 24-hour `HH:MM` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(parse_time_of_day(start)?, parse_time_of_day(end)?))
    }

    /// Both boundaries are inclusive. `now` is compared at minute resolution,
    /// so a window ending at 08:00 still covers 08:00:59.
    pub fn is_active(&self, now: NaiveTime) -> bool {
        let now = truncate_to_minute(now);
        if self.start <= self.end {
            self.start <= now && now <= self.end
        } else {
            now >= self.start || now <= self.end
        }
    }

    pub fn wraps_midnight(&self) -> bool {
        self.start > self.end
    }
}

impl fmt::Display for MonitoringWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format(TIME_FORMAT),
            self.end.format(TIME_FORMAT)
        )
    }
}

pub fn parse_time_of_day(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|e| anyhow!("invalid time of day '{}' (expected HH:MM): {}", value, e))
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}
