//! Maintenance check classes and recurring maintenance patterns.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::api::{AircraftId, MaintenanceId};
use crate::models::time::OperationWindow;

/// Minutes in one nominal maintenance day.
pub const MINUTES_PER_DAY: i64 = 1_440;

/// Maintenance check class.
///
/// Each class has a fixed nominal duration and a maximum allowable interval
/// since the check was last performed; the interval bounds how far a blocked
/// occurrence may be rescheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckType {
    Transit,
    Daily,
    Weekly,
    ACheck,
    CCheck,
    DCheck,
}

impl CheckType {
    /// Nominal duration of the check in minutes.
    pub fn duration_minutes(&self) -> i64 {
        match self {
            CheckType::Transit => 60,
            CheckType::Daily => 120,
            CheckType::Weekly => 480,
            CheckType::ACheck => 2 * MINUTES_PER_DAY,
            CheckType::CCheck => 14 * MINUTES_PER_DAY,
            CheckType::DCheck => 42 * MINUTES_PER_DAY,
        }
    }

    /// Maximum allowable interval since the check was last performed, in days.
    pub fn max_interval_days(&self) -> i64 {
        match self {
            CheckType::Transit => 2,
            CheckType::Daily => 3,
            CheckType::Weekly => 8,
            CheckType::ACheck => 90,
            CheckType::CCheck => 730,
            CheckType::DCheck => 3_650,
        }
    }

    /// Day-scoped checks fit within one nominal day; heavier checks are
    /// multi-day and block whole calendar days.
    pub fn is_multi_day(&self) -> bool {
        self.duration_minutes() > MINUTES_PER_DAY
    }

    /// Number of nominal days the check spans: `ceil(duration / 1440)`.
    pub fn span_days(&self) -> u32 {
        (self.duration_minutes() as u64).div_ceil(MINUTES_PER_DAY as u64) as u32
    }

    pub fn name(&self) -> &'static str {
        match self {
            CheckType::Transit => "transit check",
            CheckType::Daily => "daily check",
            CheckType::Weekly => "weekly check",
            CheckType::ACheck => "A check",
            CheckType::CCheck => "C check",
            CheckType::DCheck => "D check",
        }
    }
}

impl std::fmt::Display for CheckType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// When a pattern's occurrences happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    /// One occurrence per week on the given weekday. Day-scoped checks only.
    Weekly(Weekday),
    /// A single occurrence anchored to a specific date.
    Anchored(NaiveDate),
}

/// Lifecycle status of a maintenance pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Active,
    Completed,
    Cancelled,
}

/// A maintenance obligation for an aircraft.
///
/// The obligation must be fulfilled before its deadline or actively
/// rescheduled; it is never silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenancePattern {
    pub id: MaintenanceId,
    pub aircraft_id: AircraftId,
    pub check: CheckType,
    pub recurrence: Recurrence,
    pub start_time: NaiveTime,
    /// Date the check was last performed, when known; anchors the deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_performed: Option<NaiveDate>,
    pub status: MaintenanceStatus,
}

impl MaintenancePattern {
    pub fn is_active(&self) -> bool {
        self.status == MaintenanceStatus::Active
    }

    /// Whether an occurrence of this pattern begins on `date`.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        match self.recurrence {
            Recurrence::Weekly(weekday) => date.weekday() == weekday,
            Recurrence::Anchored(anchor) => date == anchor,
        }
    }

    /// Start instant of the occurrence beginning on `date`.
    pub fn occurrence_start(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.start_time)
    }

    /// Busy interval of the occurrence beginning on `date`, as seen by the
    /// conflict detector.
    ///
    /// Day-scoped checks occupy the day-local `[start, start + duration]`
    /// interval, which may cross midnight. Multi-day checks occupy the
    /// aircraft fully on every calendar day from the start date through
    /// `start + span` days.
    pub fn conflict_window(&self, date: NaiveDate) -> OperationWindow {
        if self.check.is_multi_day() {
            OperationWindow::full_days(date, self.check.span_days() + 1)
        } else {
            OperationWindow::from_start(self.occurrence_start(date), self.check.duration_minutes())
                .expect("check durations are positive")
        }
    }

    /// Hard expiry deadline for the occurrence beginning on `occurrence`.
    ///
    /// The check must run no later than the last performance (or, when
    /// unknown, the occurrence itself) plus the class interval.
    pub fn deadline(&self, occurrence: NaiveDate) -> NaiveDate {
        self.last_performed.unwrap_or(occurrence) + Duration::days(self.check.max_interval_days())
    }
}

/// A pattern as handed to the repository for insertion (no ID yet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMaintenance {
    pub aircraft_id: AircraftId,
    pub check: CheckType,
    pub recurrence: Recurrence,
    pub start_time: NaiveTime,
    pub last_performed: Option<NaiveDate>,
}

impl NewMaintenance {
    pub fn into_pattern(self, id: MaintenanceId) -> MaintenancePattern {
        MaintenancePattern {
            id,
            aircraft_id: self.aircraft_id,
            check: self.check,
            recurrence: self.recurrence,
            start_time: self.start_time,
            last_performed: self.last_performed,
            status: MaintenanceStatus::Active,
        }
    }
}
