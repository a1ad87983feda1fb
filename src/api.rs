//! Public API surface for the Rust backend.
//!
//! This file consolidates the DTO types consumed and produced by the
//! scheduling services. All types derive Serialize/Deserialize for JSON
//! serialization; the HTTP layer that carries them is external to this crate.

pub use crate::services::batch::{BatchCandidate, BatchConflict, BatchOutcome};
pub use crate::services::blocks::{BlockSpan, MaintenanceBlock};
pub use crate::services::conflicts::ConflictKind;
pub use crate::services::error::{SchedulingError, SchedulingResult};
pub use crate::services::flight_scheduler::{DayTimeline, FlightRecord, MaintenanceRecord};
pub use crate::services::rescheduler::RescheduledSlot;

pub use crate::models::time::OperationWindow;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Operator identifier (database primary key).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperatorId(pub i64);

/// Aircraft identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AircraftId(pub i64);

/// Route identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteId(pub i64);

/// Scheduled flight identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlightId(pub i64);

/// Maintenance pattern identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaintenanceId(pub i64);

impl OperatorId {
    pub fn new(value: i64) -> Self {
        OperatorId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl AircraftId {
    pub fn new(value: i64) -> Self {
        AircraftId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl RouteId {
    pub fn new(value: i64) -> Self {
        RouteId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl FlightId {
    pub fn new(value: i64) -> Self {
        FlightId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl MaintenanceId {
    pub fn new(value: i64) -> Self {
        MaintenanceId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for OperatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for AircraftId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for FlightId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for MaintenanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AircraftId> for i64 {
    fn from(id: AircraftId) -> Self {
        id.0
    }
}

/// Request to schedule a single flight on a route/aircraft pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFlightRequest {
    pub operator_id: OperatorId,
    pub route_id: RouteId,
    pub aircraft_id: AircraftId,
    /// Calendar date of departure (operator local time).
    pub scheduled_date: NaiveDate,
    /// Departure time of day.
    pub departure_time: NaiveTime,
}

/// Request to schedule a batch of flights on one route/aircraft pair.
///
/// At most [`crate::services::batch::MAX_BATCH_SIZE`] candidates per request;
/// candidates are admitted in input order with partial-success semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFlightsBatchRequest {
    pub operator_id: OperatorId,
    pub route_id: RouteId,
    pub aircraft_id: AircraftId,
    pub candidates: Vec<BatchCandidate>,
}

/// Request to create a recurring maintenance pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMaintenanceRequest {
    pub operator_id: OperatorId,
    pub aircraft_id: AircraftId,
    pub check: crate::models::maintenance::CheckType,
    pub scheduled_date: NaiveDate,
    pub start_time: NaiveTime,
    /// When true the pattern repeats weekly on `scheduled_date`'s weekday;
    /// otherwise it is anchored to `scheduled_date`.
    #[serde(default)]
    pub repeat_weekly: bool,
}

/// Inclusive calendar date range for display-block and timeline queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Option<Self> {
        if from <= to {
            Some(Self { from, to })
        } else {
            None
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Iterate every date in the range, in order.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.from.iter_days().take_while(move |d| *d <= self.to)
    }
}
