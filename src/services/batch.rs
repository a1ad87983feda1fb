//! Batch flight admission.
//!
//! Up to [`MAX_BATCH_SIZE`] candidates for one route/aircraft pair are
//! admitted in input order against a running window set seeded from the
//! aircraft's existing commitments. Acceptance is partial-success: each
//! candidate either joins the running set or is recorded as a conflict, and
//! the caller persists every accepted flight (plus any maintenance moves the
//! admission triggered) in one atomic commit.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::api::{FlightId, MaintenanceId};
use crate::models::fleet::{Aircraft, Route};
use crate::models::flight::{NewFlight, ScheduledFlight};
use crate::models::maintenance::MaintenancePattern;
use crate::models::time::OperationWindow;
use crate::services::conflicts::{self, ConflictKind};
use crate::services::flight_scheduler::FlightRecord;
use crate::services::rescheduler::{self, RescheduledSlot};
use crate::services::window_calculator::WindowCalculator;

/// Upper bound on candidates per batch request.
pub const MAX_BATCH_SIZE: usize = 14;

/// One departure candidate within a batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BatchCandidate {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// A rejected candidate and what blocked it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConflict {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub conflict: ConflictKind,
}

/// Result of a batch request: partial success, both sides reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub created: Vec<FlightRecord>,
    pub conflicts: Vec<BatchConflict>,
}

/// One accepted candidate, with the maintenance move it required, if any.
#[derive(Debug, Clone)]
pub(crate) struct AcceptedCandidate {
    pub flight: NewFlight,
    pub rescheduled: Option<RescheduledSlot>,
}

/// Admission plan for a batch: what to persist and what to report.
#[derive(Debug, Clone, Default)]
pub(crate) struct BatchPlan {
    pub accepted: Vec<AcceptedCandidate>,
    pub conflicts: Vec<BatchConflict>,
    /// Final state of every pattern moved during admission, keyed once.
    pub pattern_moves: Vec<MaintenancePattern>,
}

/// Admit `candidates` in input order against the aircraft's commitments.
///
/// `existing_flights` must cover the whole admission-and-reschedule horizon;
/// `exclude` removes one flight from consideration (departure updates check
/// against everything but themselves). Pure: nothing is persisted here.
pub(crate) fn plan_batch(
    route: &Route,
    aircraft: &Aircraft,
    candidates: &[BatchCandidate],
    existing_flights: &[ScheduledFlight],
    patterns: &[MaintenancePattern],
    calculator: &WindowCalculator,
    exclude: Option<FlightId>,
) -> BatchPlan {
    let mut patterns_state: Vec<MaintenancePattern> = patterns.to_vec();
    let mut moves: HashMap<MaintenanceId, MaintenancePattern> = HashMap::new();
    let mut accepted: Vec<AcceptedCandidate> = Vec::new();
    let mut accepted_windows: Vec<(OperationWindow, ConflictKind)> = Vec::new();
    let mut conflicts_found: Vec<BatchConflict> = Vec::new();

    for candidate in candidates {
        let departure = candidate.date.and_time(candidate.time);
        let timing = calculator.flight_timing(route, aircraft, departure);
        let window = timing.window;

        if let Some(conflict) = conflicts::flight_conflict(&window, existing_flights, exclude) {
            conflicts_found.push(BatchConflict {
                date: candidate.date,
                time: candidate.time,
                conflict,
            });
            continue;
        }

        if let Some((_, descriptor)) = accepted_windows.iter().find(|(w, _)| w.overlaps(&window)) {
            conflicts_found.push(BatchConflict {
                date: candidate.date,
                time: candidate.time,
                conflict: descriptor.clone(),
            });
            continue;
        }

        let mut rescheduled = None;
        if let Some(mc) = conflicts::maintenance_conflict(&window, &patterns_state) {
            let pattern = patterns_state
                .iter()
                .find(|p| p.id == mc.maintenance_id)
                .expect("conflict refers to a known pattern")
                .clone();

            let busy = reschedule_busy_set(
                &pattern,
                mc.occurrence,
                &window,
                existing_flights,
                &accepted_windows,
                &patterns_state,
                exclude,
            );

            match rescheduler::plan_reschedule(&pattern, mc.occurrence, &busy) {
                Some(slot) => {
                    let moved = rescheduler::apply_slot(&pattern, &slot);
                    if let Some(state) = patterns_state.iter_mut().find(|p| p.id == moved.id) {
                        *state = moved.clone();
                    }
                    moves.insert(moved.id, moved);
                    rescheduled = Some(slot);
                }
                None => {
                    conflicts_found.push(BatchConflict {
                        date: candidate.date,
                        time: candidate.time,
                        conflict: mc.descriptor(),
                    });
                    continue;
                }
            }
        }

        accepted_windows.push((
            window,
            ConflictKind::Flight {
                flight_id: None,
                route_number: route.number.clone(),
                origin: route.origin.code.clone(),
                destination: route.destination.code.clone(),
                departure: timing.departure,
                arrival: timing.arrival,
                window,
            },
        ));
        accepted.push(AcceptedCandidate {
            flight: NewFlight {
                route_id: route.id,
                aircraft_id: aircraft.id,
                route_number: route.number.clone(),
                origin: route.origin.code.clone(),
                destination: route.destination.code.clone(),
                departure: timing.departure,
                arrival: timing.arrival,
                window,
            },
            rescheduled,
        });
    }

    let mut pattern_moves: Vec<MaintenancePattern> = moves.into_values().collect();
    pattern_moves.sort_by_key(|p| p.id.value());

    BatchPlan {
        accepted,
        conflicts: conflicts_found,
        pattern_moves,
    }
}

/// Every commitment a reschedule of `pattern` must avoid: the candidate
/// window, existing and already-accepted flights, and the other patterns'
/// occurrences across the deadline horizon. The blocked occurrence itself is
/// excluded — it is the thing being moved.
#[allow(clippy::too_many_arguments)]
fn reschedule_busy_set(
    pattern: &MaintenancePattern,
    occurrence: NaiveDate,
    candidate_window: &OperationWindow,
    existing_flights: &[ScheduledFlight],
    accepted_windows: &[(OperationWindow, ConflictKind)],
    patterns_state: &[MaintenancePattern],
    exclude: Option<FlightId>,
) -> Vec<OperationWindow> {
    let deadline = pattern.deadline(occurrence);
    let horizon_start = occurrence - Duration::days(i64::from(pattern.check.span_days()) + 1);
    let horizon_end = deadline + Duration::days(i64::from(pattern.check.span_days()) + 1);

    let mut busy: Vec<OperationWindow> = vec![*candidate_window];
    busy.extend(
        existing_flights
            .iter()
            .filter(|f| Some(f.id) != exclude)
            .map(|f| f.window),
    );
    busy.extend(accepted_windows.iter().map(|(w, _)| *w));
    for other in patterns_state.iter().filter(|p| p.id != pattern.id) {
        busy.extend(
            conflicts::occurrence_windows_in_range(other, horizon_start, horizon_end)
                .into_iter()
                .map(|(_, w)| w),
        );
    }
    busy
}
