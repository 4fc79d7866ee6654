//! Wall-clock seam used by lifecycle transitions and the sweeper

use chrono::{DateTime, Duration, NaiveTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Real time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// `[00:00 of the day containing `at`, 00:00 of the next day)`
pub fn day_bounds(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = at.date_naive().and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

#[cfg(test)]
pub use fixed::FixedClock;
