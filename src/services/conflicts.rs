//! Pure interval-overlap conflict detection.
//!
//! No side effects here: these functions compare a candidate operation window
//! against existing commitments and either clear it or produce a structured
//! descriptor naming the blocking flight or maintenance check. Used both
//! standalone and as the admission step of the rescheduler and the batch
//! scheduler.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::api::{FlightId, MaintenanceId};
use crate::models::flight::ScheduledFlight;
use crate::models::maintenance::{CheckType, MaintenancePattern};
use crate::models::time::OperationWindow;

/// Structured description of what blocks a candidate window.
///
/// Carries enough context for a user-facing message without a further lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictKind {
    Flight {
        /// Absent when the blocking flight was accepted earlier in the same
        /// batch and has no persisted ID yet.
        flight_id: Option<FlightId>,
        route_number: String,
        origin: String,
        destination: String,
        departure: NaiveDateTime,
        arrival: NaiveDateTime,
        window: OperationWindow,
    },
    Maintenance {
        maintenance_id: MaintenanceId,
        check: CheckType,
        window: OperationWindow,
        deadline: NaiveDate,
    },
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictKind::Flight {
                route_number,
                origin,
                destination,
                departure,
                window,
                ..
            } => write!(
                f,
                "overlaps flight {route_number} {origin}-{destination} departing {departure} (busy {window})"
            ),
            ConflictKind::Maintenance {
                check,
                window,
                deadline,
                ..
            } => write!(
                f,
                "overlaps {check} occupying {window} (deadline {deadline})"
            ),
        }
    }
}

impl ConflictKind {
    pub fn for_flight(flight: &ScheduledFlight) -> Self {
        ConflictKind::Flight {
            flight_id: Some(flight.id),
            route_number: flight.route_number.clone(),
            origin: flight.origin.clone(),
            destination: flight.destination.clone(),
            departure: flight.departure,
            arrival: flight.arrival,
            window: flight.window,
        }
    }
}

/// A maintenance occurrence found blocking a candidate window.
#[derive(Debug, Clone)]
pub struct MaintenanceConflict {
    pub maintenance_id: MaintenanceId,
    pub check: CheckType,
    /// Date the blocking occurrence begins on.
    pub occurrence: NaiveDate,
    pub window: OperationWindow,
    pub deadline: NaiveDate,
}

impl MaintenanceConflict {
    pub fn descriptor(&self) -> ConflictKind {
        ConflictKind::Maintenance {
            maintenance_id: self.maintenance_id,
            check: self.check,
            window: self.window,
            deadline: self.deadline,
        }
    }
}

/// First flight whose window overlaps the candidate, in window order.
pub fn flight_conflict(
    candidate: &OperationWindow,
    flights: &[ScheduledFlight],
    exclude: Option<FlightId>,
) -> Option<ConflictKind> {
    flights
        .iter()
        .filter(|f| Some(f.id) != exclude)
        .filter(|f| f.window.overlaps(candidate))
        .min_by_key(|f| f.window.start())
        .map(ConflictKind::for_flight)
}

/// First active maintenance occurrence overlapping the candidate.
pub fn maintenance_conflict(
    candidate: &OperationWindow,
    patterns: &[MaintenancePattern],
) -> Option<MaintenanceConflict> {
    let mut best: Option<MaintenanceConflict> = None;
    for pattern in patterns.iter().filter(|p| p.is_active()) {
        if let Some((occurrence, window)) = first_occurrence_overlap(pattern, candidate) {
            let conflict = MaintenanceConflict {
                maintenance_id: pattern.id,
                check: pattern.check,
                occurrence,
                window,
                deadline: pattern.deadline(occurrence),
            };
            match &best {
                Some(b) if b.window.start() <= window.start() => {}
                _ => best = Some(conflict),
            }
        }
    }
    best
}

/// Earliest occurrence of `pattern` whose busy interval overlaps `candidate`.
///
/// The scan extends backwards past the candidate start far enough to catch
/// overnight tails and multi-day spans that began before it.
fn first_occurrence_overlap(
    pattern: &MaintenancePattern,
    candidate: &OperationWindow,
) -> Option<(NaiveDate, OperationWindow)> {
    let back_days = i64::from(pattern.check.span_days()) + 1;
    let mut date = candidate.start().date() - Duration::days(back_days);
    let last = candidate.end().date();

    while date <= last {
        if pattern.occurs_on(date) {
            let window = pattern.conflict_window(date);
            if window.overlaps(candidate) {
                return Some((date, window));
            }
        }
        date = date.succ_opt()?;
    }
    None
}

/// All occurrence busy intervals of `pattern` beginning in `[from, to]`.
///
/// Used to seed busy sets for rescheduling and batch admission.
pub fn occurrence_windows_in_range(
    pattern: &MaintenancePattern,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<(NaiveDate, OperationWindow)> {
    let mut windows = Vec::new();
    if !pattern.is_active() {
        return windows;
    }
    let mut date = from;
    while date <= to {
        if pattern.occurs_on(date) {
            windows.push((date, pattern.conflict_window(date)));
        }
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    windows
}
