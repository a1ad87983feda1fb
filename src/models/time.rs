use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Full ground-to-ground busy interval of an aircraft.
///
/// A window is a half-open `[start, end)` instant interval at full date+time
/// precision. It may span multiple calendar days; all conflict logic operates
/// on this type and never on time-of-day alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperationWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl OperationWindow {
    /// Create a new window. Returns `None` unless `start < end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Window covering `start` plus a duration in minutes.
    pub fn from_start(start: NaiveDateTime, minutes: i64) -> Option<Self> {
        Self::new(start, start + Duration::minutes(minutes))
    }

    /// Full-day window covering `days` consecutive calendar days from `date`.
    pub fn full_days(date: NaiveDate, days: u32) -> Self {
        let start = date.and_hms_opt(0, 0, 0).expect("midnight is a valid time");
        Self {
            start,
            end: start + Duration::days(i64::from(days)),
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Length of the window in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Check if an instant lies inside this window (inclusive start, exclusive end).
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t < self.end
    }

    /// Check if this window overlaps with another.
    ///
    /// Two windows overlap iff `startA < endB && startB < endA`; windows that
    /// merely touch at a boundary do not conflict.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Every calendar date this window touches, in order.
    pub fn dates_touched(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut d = self.start.date();
        // The end instant is exclusive: a window ending exactly at midnight
        // does not touch the following day.
        let last = if self.end.time() == chrono::NaiveTime::MIN {
            self.end.date().pred_opt().unwrap_or(self.end.date())
        } else {
            self.end.date()
        };
        while d <= last {
            dates.push(d);
            d = match d.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
        dates
    }
}

impl std::fmt::Display for OperationWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} .. {}]", self.start, self.end)
    }
}

/// Round an instant to the nearest 5 minutes, ties rounding up.
pub fn round_to_nearest_5min(t: NaiveDateTime) -> NaiveDateTime {
    let secs_into_slot = i64::from(t.minute() % 5) * 60 + i64::from(t.second());
    let base = t - Duration::seconds(secs_into_slot);
    if secs_into_slot >= 150 {
        base + Duration::minutes(5)
    } else {
        base
    }
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod time_tests;
