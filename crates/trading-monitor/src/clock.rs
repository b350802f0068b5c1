//! Market session clock.

use chrono::{Local, NaiveTime};

/// Source of the current local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveTime;
}

/// Clock backed by the system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Trading session window in naive local time.
///
/// Both bounds are exclusive. No holidays, weekends or time zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Default for MarketHours {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(15, 59, 0).unwrap_or_default(),
        }
    }
}

impl MarketHours {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }

    /// True when `open < time < close`.
    pub fn is_open_at(&self, time: NaiveTime) -> bool {
        self.open < time && time < self.close
    }

    pub fn is_open<C: Clock + ?Sized>(&self, clock: &C) -> bool {
        self.is_open_at(clock.now())
    }
}
