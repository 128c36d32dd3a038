//! Wall-clock abstraction so ticks are deterministically triggerable in tests.

use std::sync::{Arc, Mutex};

use chrono::Timelike;

use crate::core::timecode::TimeCode;

/// Source of the current time-of-day for realtime synchronization.
pub trait Clock: Send {
    fn time_of_day(&self) -> TimeCode;
}

/// Local wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn time_of_day(&self) -> TimeCode {
        let now = chrono::Local::now();
        TimeCode::from_decimal_time(now.hour() as f64 + now.minute() as f64 / 60.0)
    }
}

/// Hand-driven clock for tests: shared handle, set the time explicitly.
#[derive(Clone)]
pub struct ManualClock {
    time: Arc<Mutex<TimeCode>>,
}

impl ManualClock {
    pub fn new(time: TimeCode) -> Self {
        Self {
            time: Arc::new(Mutex::new(time)),
        }
    }

    pub fn set(&self, time: TimeCode) {
        *self.time.lock().unwrap_or_else(|e| e.into_inner()) = time;
    }
}

impl Clock for ManualClock {
    fn time_of_day(&self) -> TimeCode {
        *self.time.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_handle() {
        let clock = ManualClock::new(TimeCode::parse("8:00").unwrap());
        let handle = clock.clone();
        handle.set(TimeCode::parse("9:30").unwrap());
        assert_eq!(clock.time_of_day().to_string(), "9:30");
    }

    #[test]
    fn test_system_clock_in_day_range() {
        let t = SystemClock.time_of_day();
        assert!(t.hour() < 24);
    }
}
