//! Minute-resolution time-of-day value.
//!
//! A `TimeCode` covers one schedule day: `0:00` up to and including the
//! end-of-day sentinel `24:00`. Arithmetic goes through a decimal-hours
//! representation so fractional-minute intermediate math is possible, with
//! rounding back to whole minutes on write-back.

use std::cmp::Ordering;
use std::fmt;

use anyhow::{Context, Result, bail};

/// Time-of-day with minute resolution, `0:00 ..= 24:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeCode {
    hour: u32,
    minute: u32,
}

impl TimeCode {
    /// Start of the schedule day.
    pub const MIDNIGHT: TimeCode = TimeCode { hour: 0, minute: 0 };

    /// End-of-day sentinel. Valid as a timespan end, never as wall-clock time.
    pub const END_OF_DAY: TimeCode = TimeCode { hour: 24, minute: 0 };

    /// Create a timecode, validating the day range.
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if minute > 59 {
            bail!("minute out of range: {}", minute);
        }
        if hour > 24 || (hour == 24 && minute != 0) {
            bail!("hour out of range: {}:{:02}", hour, minute);
        }
        Ok(Self { hour, minute })
    }

    /// Parse `"H:MM"` text (no leading zero required on the hour).
    pub fn parse(text: &str) -> Result<Self> {
        let (h, m) = text
            .split_once(':')
            .with_context(|| format!("timecode '{}' is not H:MM", text))?;
        let hour: u32 = h
            .trim()
            .parse()
            .with_context(|| format!("bad hour in timecode '{}'", text))?;
        let minute: u32 = m
            .trim()
            .parse()
            .with_context(|| format!("bad minute in timecode '{}'", text))?;
        Self::new(hour, minute).with_context(|| format!("timecode '{}' out of range", text))
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Compare by hour difference, minute difference only as tie-break
    /// (`hourDiff != 0 ? hourDiff : minuteDiff`). Sign-only semantics, not a
    /// linear distance - only ever use the sign of the result.
    pub fn compare(&self, other: &TimeCode) -> Ordering {
        let hour_diff = self.hour as i32 - other.hour as i32;
        if hour_diff != 0 {
            hour_diff.cmp(&0)
        } else {
            (self.minute as i32 - other.minute as i32).cmp(&0)
        }
    }

    /// True if strictly before `other`. A missing bound compares false.
    pub fn is_before(&self, other: Option<&TimeCode>) -> bool {
        other.is_some_and(|o| self.compare(o) == Ordering::Less)
    }

    /// True if strictly after `other`. A missing bound compares false.
    pub fn is_after(&self, other: Option<&TimeCode>) -> bool {
        other.is_some_and(|o| self.compare(o) == Ordering::Greater)
    }

    /// Decimal-hours representation (`8:30` -> `8.5`), for interpolation.
    pub fn decimal_time(&self) -> f64 {
        self.hour as f64 + self.minute as f64 / 60.0
    }

    /// Build from decimal hours, rounding to the nearest whole minute and
    /// carrying minute overflow into the hour. Unchecked: values past `24:00`
    /// are representable so the player can detect day rollover after an add.
    pub fn from_decimal_time(dtime: f64) -> Self {
        let mut hour = dtime.floor() as u32;
        let mut minute = ((dtime - dtime.floor()) * 60.0).round() as u32;
        if minute > 59 {
            minute -= 60;
            hour += 1;
        }
        Self { hour, minute }
    }

    /// A new timecode `minutes` later (fractional minutes round on write-back).
    pub fn add_minutes(&self, minutes: f64) -> Self {
        Self::from_decimal_time(self.decimal_time() + minutes / 60.0)
    }
}

impl PartialOrd for TimeCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Ord for TimeCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour, self.minute)
    }
}
