//! A single on-interval for one track.

use std::fmt;

use anyhow::{Result, bail};
use uuid::Uuid;

use crate::core::timecode::TimeCode;

/// Half-open on-interval `[start, end)` owned by exactly one timeline.
///
/// Invariant: `start < end`. The uuid identifies the span across editor
/// operations (move/resize/delete); it is regenerated on every load and never
/// serialized.
#[derive(Debug, Clone)]
pub struct TimeSpan {
    pub start: TimeCode,
    pub end: TimeCode,
    pub uuid: Uuid,
}

impl TimeSpan {
    /// Create a span, rejecting empty or inverted intervals.
    pub fn new(start: TimeCode, end: TimeCode) -> Result<Self> {
        if !start.is_before(Some(&end)) {
            bail!("timespan {}-{} is empty or inverted", start, end);
        }
        Ok(Self {
            start,
            end,
            uuid: Uuid::new_v4(),
        })
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
