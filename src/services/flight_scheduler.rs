//! Flight scheduling orchestration.
//!
//! The client-visible operations: single and batch flight creation,
//! departure updates, deletion, the maintenance lifecycle, display-block
//! expansion and day timelines. Every timeline mutation executes as one
//! sequential request holding the target aircraft's async lock, so the
//! admission reads, the decision and the write all see one consistent
//! snapshot of that aircraft's timeline. The gap optimizer runs after the
//! primary write commits and never fails the response.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;
use tracing::info;

use crate::api::{
    AircraftId, CreateFlightRequest, CreateFlightsBatchRequest, CreateMaintenanceRequest,
    DateRange, FlightId, MaintenanceId, OperatorId, RouteId,
};
use crate::config::SchedulingSettings;
use crate::db::repository::{FullRepository, RepositoryError, ScheduleCommit};
use crate::models::fleet::{Aircraft, Route};
use crate::models::flight::ScheduledFlight;
use crate::models::maintenance::{
    MaintenancePattern, MaintenanceStatus, NewMaintenance, Recurrence,
};
use crate::services::batch::{plan_batch, BatchCandidate, BatchOutcome, MAX_BATCH_SIZE};
use crate::services::blocks::{self, MaintenanceBlock};
use crate::services::conflicts::{self, ConflictKind};
use crate::services::error::{SchedulingError, SchedulingResult};
use crate::services::optimizer;
use crate::services::rescheduler::RescheduledSlot;
use crate::services::window_calculator::WindowCalculator;

/// Persisted flight enriched with route and aircraft detail, plus the
/// maintenance move its admission triggered, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightRecord {
    pub flight: ScheduledFlight,
    pub route: Route,
    pub aircraft: Aircraft,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rescheduled_maintenance: Option<RescheduledSlot>,
}

/// Persisted maintenance pattern enriched with its aircraft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub pattern: MaintenancePattern,
    pub aircraft: Aircraft,
}

/// Merged per-date view of one aircraft's commitments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayTimeline {
    pub aircraft_id: AircraftId,
    pub date: NaiveDate,
    pub flights: Vec<ScheduledFlight>,
    pub maintenance: Vec<MaintenanceBlock>,
}

/// Registry of per-aircraft async locks.
///
/// The shared mutable resource is "this aircraft's timeline"; holding its
/// lock across read-decide-write closes the time-of-check/time-of-use race
/// between concurrent requests for the same aircraft.
struct AircraftLocks {
    inner: Mutex<HashMap<AircraftId, Arc<AsyncMutex<()>>>>,
}

impl AircraftLocks {
    fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    fn for_aircraft(&self, id: AircraftId) -> Arc<AsyncMutex<()>> {
        self.inner.lock().entry(id).or_default().clone()
    }
}

/// Stateless-per-request scheduler over an abstract repository.
pub struct FlightScheduler {
    repo: Arc<dyn FullRepository>,
    calculator: WindowCalculator,
    locks: AircraftLocks,
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).expect("midnight is a valid time")
}

/// Map a rejected candidate's descriptor onto the error taxonomy: a
/// maintenance descriptor at this point means no legal reschedule existed.
fn conflict_error(kind: ConflictKind) -> SchedulingError {
    match kind {
        ConflictKind::Maintenance {
            check, deadline, ..
        } => SchedulingError::MaintenanceDeadlineViolation { check, deadline },
        flight => SchedulingError::Conflict(flight),
    }
}

impl FlightScheduler {
    pub fn new(repo: Arc<dyn FullRepository>, settings: SchedulingSettings) -> Self {
        Self {
            repo,
            calculator: WindowCalculator::new(settings),
            locks: AircraftLocks::new(),
        }
    }

    pub fn repository(&self) -> &Arc<dyn FullRepository> {
        &self.repo
    }

    pub async fn health_check(&self) -> SchedulingResult<bool> {
        Ok(self.repo.health_check().await?)
    }

    /// Schedule a single flight.
    ///
    /// A conflicting flight rejects the request; a conflicting maintenance
    /// occurrence is rescheduled when legal, and the move commits atomically
    /// with the flight.
    pub async fn create_flight(
        &self,
        request: &CreateFlightRequest,
    ) -> SchedulingResult<FlightRecord> {
        let (route, aircraft) = self
            .owned_route_and_aircraft(request.operator_id, request.route_id, request.aircraft_id)
            .await?;

        let lock = self.locks.for_aircraft(aircraft.id);
        let _guard = lock.lock().await;

        let candidate = BatchCandidate {
            date: request.scheduled_date,
            time: request.departure_time,
        };
        let (flights, patterns) = self
            .admission_snapshot(aircraft.id, request.scheduled_date, request.scheduled_date)
            .await?;
        let plan = plan_batch(
            &route,
            &aircraft,
            &[candidate],
            &flights,
            &patterns,
            &self.calculator,
            None,
        );

        if let Some(rejected) = plan.conflicts.into_iter().next() {
            return Err(conflict_error(rejected.conflict));
        }
        let accepted = plan
            .accepted
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::internal("Admission produced neither flight nor conflict"))?;

        let mut touched = accepted.flight.window.dates_touched();
        if let Some(slot) = &accepted.rescheduled {
            touched.extend(slot.original.dates_touched());
            touched.extend(slot.new.dates_touched());
            info!(
                "Rescheduled {} of aircraft {} out of the way of flight {}: now starts {}",
                slot.check,
                aircraft.id,
                route.number,
                slot.new.start()
            );
        }

        let inserted = self
            .repo
            .commit_schedule_changes(ScheduleCommit {
                flight_inserts: vec![accepted.flight],
                pattern_updates: plan.pattern_moves,
                ..Default::default()
            })
            .await?;
        let flight = inserted
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::internal("Commit returned no inserted flight"))?;

        optimizer::optimize_dates(self.repo.as_ref(), aircraft.id, &touched).await;

        Ok(FlightRecord {
            flight,
            route,
            aircraft,
            rescheduled_maintenance: accepted.rescheduled,
        })
    }

    /// Schedule up to [`MAX_BATCH_SIZE`] flights in one call.
    ///
    /// Partial success: accepted candidates are persisted together and the
    /// rejected ones are reported alongside, never instead.
    pub async fn create_flights_batch(
        &self,
        request: &CreateFlightsBatchRequest,
    ) -> SchedulingResult<BatchOutcome> {
        if request.candidates.is_empty() {
            return Err(SchedulingError::validation("Batch contains no candidates"));
        }
        if request.candidates.len() > MAX_BATCH_SIZE {
            return Err(SchedulingError::validation(format!(
                "Batch size {} exceeds the limit of {MAX_BATCH_SIZE}",
                request.candidates.len()
            )));
        }

        let (route, aircraft) = self
            .owned_route_and_aircraft(request.operator_id, request.route_id, request.aircraft_id)
            .await?;

        let lock = self.locks.for_aircraft(aircraft.id);
        let _guard = lock.lock().await;

        let first_date = request
            .candidates
            .iter()
            .map(|c| c.date)
            .min()
            .expect("batch is non-empty");
        let last_date = request
            .candidates
            .iter()
            .map(|c| c.date)
            .max()
            .expect("batch is non-empty");
        let (flights, patterns) = self
            .admission_snapshot(aircraft.id, first_date, last_date)
            .await?;

        let plan = plan_batch(
            &route,
            &aircraft,
            &request.candidates,
            &flights,
            &patterns,
            &self.calculator,
            None,
        );

        let mut touched: Vec<NaiveDate> = Vec::new();
        for accepted in &plan.accepted {
            touched.extend(accepted.flight.window.dates_touched());
            if let Some(slot) = &accepted.rescheduled {
                touched.extend(slot.original.dates_touched());
                touched.extend(slot.new.dates_touched());
            }
        }

        let reschedules: Vec<Option<RescheduledSlot>> =
            plan.accepted.iter().map(|a| a.rescheduled.clone()).collect();
        let inserted = self
            .repo
            .commit_schedule_changes(ScheduleCommit {
                flight_inserts: plan.accepted.into_iter().map(|a| a.flight).collect(),
                pattern_updates: plan.pattern_moves,
                ..Default::default()
            })
            .await?;

        optimizer::optimize_dates(self.repo.as_ref(), aircraft.id, &touched).await;

        let created = inserted
            .into_iter()
            .zip(reschedules)
            .map(|(flight, rescheduled_maintenance)| FlightRecord {
                flight,
                route: route.clone(),
                aircraft: aircraft.clone(),
                rescheduled_maintenance,
            })
            .collect();

        Ok(BatchOutcome {
            created,
            conflicts: plan.conflicts,
        })
    }

    /// Move an existing flight to a new departure.
    ///
    /// Re-runs full admission with the flight itself excluded from the
    /// conflict check.
    pub async fn update_flight_departure(
        &self,
        operator_id: OperatorId,
        flight_id: FlightId,
        new_date: NaiveDate,
        new_time: NaiveTime,
    ) -> SchedulingResult<FlightRecord> {
        let existing = self.owned_flight(operator_id, flight_id).await?;
        let route = self.repo.get_route(existing.route_id).await?;
        let aircraft = self.repo.get_aircraft(existing.aircraft_id).await?;

        let lock = self.locks.for_aircraft(aircraft.id);
        let _guard = lock.lock().await;

        let candidate = BatchCandidate {
            date: new_date,
            time: new_time,
        };
        let (flights, patterns) = self
            .admission_snapshot(aircraft.id, new_date, new_date)
            .await?;
        let plan = plan_batch(
            &route,
            &aircraft,
            &[candidate],
            &flights,
            &patterns,
            &self.calculator,
            Some(flight_id),
        );

        if let Some(rejected) = plan.conflicts.into_iter().next() {
            return Err(conflict_error(rejected.conflict));
        }
        let accepted = plan
            .accepted
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::internal("Admission produced neither flight nor conflict"))?;

        let mut touched = existing.window.dates_touched();
        touched.extend(accepted.flight.window.dates_touched());
        if let Some(slot) = &accepted.rescheduled {
            touched.extend(slot.original.dates_touched());
            touched.extend(slot.new.dates_touched());
        }

        let updated = ScheduledFlight {
            id: existing.id,
            route_id: existing.route_id,
            aircraft_id: existing.aircraft_id,
            route_number: accepted.flight.route_number.clone(),
            origin: accepted.flight.origin.clone(),
            destination: accepted.flight.destination.clone(),
            departure: accepted.flight.departure,
            arrival: accepted.flight.arrival,
            window: accepted.flight.window,
            status: existing.status,
        };
        self.repo
            .commit_schedule_changes(ScheduleCommit {
                flight_updates: vec![updated.clone()],
                pattern_updates: plan.pattern_moves,
                ..Default::default()
            })
            .await?;

        optimizer::optimize_dates(self.repo.as_ref(), aircraft.id, &touched).await;

        Ok(FlightRecord {
            flight: updated,
            route,
            aircraft,
            rescheduled_maintenance: accepted.rescheduled,
        })
    }

    /// Delete a flight and release its window.
    pub async fn delete_flight(
        &self,
        operator_id: OperatorId,
        flight_id: FlightId,
    ) -> SchedulingResult<ScheduledFlight> {
        let existing = self.owned_flight(operator_id, flight_id).await?;

        let lock = self.locks.for_aircraft(existing.aircraft_id);
        let _guard = lock.lock().await;

        let deleted = self.repo.delete_flight(flight_id).await?;
        optimizer::optimize_dates(
            self.repo.as_ref(),
            deleted.aircraft_id,
            &deleted.window.dates_touched(),
        )
        .await;
        Ok(deleted)
    }

    /// Create a maintenance pattern. The first occurrence is conflict-checked
    /// against the aircraft's existing commitments.
    pub async fn create_maintenance(
        &self,
        request: &CreateMaintenanceRequest,
    ) -> SchedulingResult<MaintenanceRecord> {
        if request.repeat_weekly && request.check.is_multi_day() {
            return Err(SchedulingError::validation(
                "Weekly recurrence is limited to day-scoped checks",
            ));
        }
        let aircraft = self
            .owned_aircraft(request.operator_id, request.aircraft_id)
            .await?;

        let lock = self.locks.for_aircraft(aircraft.id);
        let _guard = lock.lock().await;

        let recurrence = if request.repeat_weekly {
            Recurrence::Weekly(request.scheduled_date.weekday())
        } else {
            Recurrence::Anchored(request.scheduled_date)
        };
        let probe = MaintenancePattern {
            id: MaintenanceId::new(0),
            aircraft_id: aircraft.id,
            check: request.check,
            recurrence,
            start_time: request.start_time,
            last_performed: None,
            status: MaintenanceStatus::Active,
        };
        let window = probe.conflict_window(request.scheduled_date);

        let (flights, patterns) = self
            .admission_snapshot(aircraft.id, request.scheduled_date, request.scheduled_date)
            .await?;
        if let Some(conflict) = conflicts::flight_conflict(&window, &flights, None) {
            return Err(SchedulingError::Conflict(conflict));
        }
        if let Some(mc) = conflicts::maintenance_conflict(&window, &patterns) {
            return Err(SchedulingError::Conflict(mc.descriptor()));
        }

        let pattern = self
            .repo
            .insert_maintenance(NewMaintenance {
                aircraft_id: aircraft.id,
                check: request.check,
                recurrence,
                start_time: request.start_time,
                last_performed: None,
            })
            .await?;

        optimizer::optimize_dates(
            self.repo.as_ref(),
            aircraft.id,
            &window.dates_touched(),
        )
        .await;

        Ok(MaintenanceRecord { pattern, aircraft })
    }

    /// Cancel an active maintenance pattern.
    pub async fn cancel_maintenance(
        &self,
        operator_id: OperatorId,
        maintenance_id: MaintenanceId,
    ) -> SchedulingResult<MaintenancePattern> {
        let (mut pattern, aircraft) = self.owned_maintenance(operator_id, maintenance_id).await?;
        if !pattern.is_active() {
            return Err(SchedulingError::validation(
                "Only active maintenance patterns can be cancelled",
            ));
        }

        let lock = self.locks.for_aircraft(aircraft.id);
        let _guard = lock.lock().await;

        pattern.status = MaintenanceStatus::Cancelled;
        self.repo
            .commit_schedule_changes(ScheduleCommit {
                pattern_updates: vec![pattern.clone()],
                ..Default::default()
            })
            .await?;

        if let Recurrence::Anchored(anchor) = pattern.recurrence {
            optimizer::optimize_dates(
                self.repo.as_ref(),
                aircraft.id,
                &pattern.conflict_window(anchor).dates_touched(),
            )
            .await;
        }
        Ok(pattern)
    }

    /// Record a performed check.
    ///
    /// Anchored patterns complete outright; weekly patterns stay active and
    /// record the performance date, which re-bases their deadline.
    pub async fn complete_maintenance(
        &self,
        operator_id: OperatorId,
        maintenance_id: MaintenanceId,
        performed_on: NaiveDate,
    ) -> SchedulingResult<MaintenancePattern> {
        let (mut pattern, aircraft) = self.owned_maintenance(operator_id, maintenance_id).await?;
        if !pattern.is_active() {
            return Err(SchedulingError::validation(
                "Only active maintenance patterns can be completed",
            ));
        }

        let lock = self.locks.for_aircraft(aircraft.id);
        let _guard = lock.lock().await;

        pattern.last_performed = Some(performed_on);
        if matches!(pattern.recurrence, Recurrence::Anchored(_)) {
            pattern.status = MaintenanceStatus::Completed;
        }
        self.repo
            .commit_schedule_changes(ScheduleCommit {
                pattern_updates: vec![pattern.clone()],
                ..Default::default()
            })
            .await?;
        Ok(pattern)
    }

    /// Expand maintenance display blocks for one aircraft or the whole fleet.
    pub async fn expand_maintenance_blocks(
        &self,
        scope: Option<AircraftId>,
        range: &DateRange,
    ) -> SchedulingResult<Vec<MaintenanceBlock>> {
        let patterns = match scope {
            Some(aircraft_id) => {
                self.repo
                    .active_maintenance_for_aircraft(aircraft_id)
                    .await?
            }
            None => self.repo.list_active_maintenance().await?,
        };
        Ok(blocks::expand_patterns(&patterns, range))
    }

    /// Per-date merged view of one aircraft's flights and maintenance.
    pub async fn day_timeline(
        &self,
        aircraft_id: AircraftId,
        range: &DateRange,
    ) -> SchedulingResult<Vec<DayTimeline>> {
        let flights = self
            .repo
            .flights_for_aircraft(
                aircraft_id,
                midnight(range.from),
                midnight(range.to) + Duration::days(1),
            )
            .await?;
        let patterns = self.repo.active_maintenance_for_aircraft(aircraft_id).await?;
        let blocks = blocks::expand_patterns(&patterns, range);

        Ok(range
            .iter_days()
            .map(|date| DayTimeline {
                aircraft_id,
                date,
                flights: flights
                    .iter()
                    .filter(|f| f.window.dates_touched().contains(&date))
                    .cloned()
                    .collect(),
                maintenance: blocks.iter().filter(|b| b.date == date).cloned().collect(),
            })
            .collect())
    }

    /// One consistent snapshot of the aircraft's commitments, wide enough to
    /// cover both admission and the furthest reschedule any active pattern
    /// could need. Call with the aircraft lock held.
    async fn admission_snapshot(
        &self,
        aircraft_id: AircraftId,
        first_date: NaiveDate,
        last_date: NaiveDate,
    ) -> SchedulingResult<(Vec<ScheduledFlight>, Vec<MaintenancePattern>)> {
        let patterns = self.repo.active_maintenance_for_aircraft(aircraft_id).await?;
        let max_interval = patterns
            .iter()
            .map(|p| p.check.max_interval_days())
            .max()
            .unwrap_or(0);
        let max_span = patterns
            .iter()
            .map(|p| i64::from(p.check.span_days()))
            .max()
            .unwrap_or(0);

        let from = midnight(first_date - Duration::days(max_span + 2));
        let to = midnight(last_date + Duration::days(max_interval + max_span + 2));
        let flights = self.repo.flights_for_aircraft(aircraft_id, from, to).await?;
        Ok((flights, patterns))
    }

    async fn owned_route_and_aircraft(
        &self,
        operator_id: OperatorId,
        route_id: RouteId,
        aircraft_id: AircraftId,
    ) -> SchedulingResult<(Route, Aircraft)> {
        let route = match self.repo.get_route(route_id).await {
            Ok(route) => route,
            Err(e) if e.is_not_found() => {
                return Err(SchedulingError::validation(format!("Unknown route {route_id}")))
            }
            Err(e) => return Err(e.into()),
        };
        let aircraft = self.owned_aircraft(operator_id, aircraft_id).await?;
        if route.operator_id != operator_id {
            return Err(SchedulingError::validation(format!(
                "Route {} does not belong to operator {operator_id}",
                route.number
            )));
        }
        Ok((route, aircraft))
    }

    async fn owned_aircraft(
        &self,
        operator_id: OperatorId,
        aircraft_id: AircraftId,
    ) -> SchedulingResult<Aircraft> {
        let aircraft = match self.repo.get_aircraft(aircraft_id).await {
            Ok(aircraft) => aircraft,
            Err(e) if e.is_not_found() => {
                return Err(SchedulingError::validation(format!(
                    "Unknown aircraft {aircraft_id}"
                )))
            }
            Err(e) => return Err(e.into()),
        };
        if aircraft.operator_id != operator_id {
            return Err(SchedulingError::validation(format!(
                "Aircraft {} does not belong to operator {operator_id}",
                aircraft.registration
            )));
        }
        Ok(aircraft)
    }

    async fn owned_flight(
        &self,
        operator_id: OperatorId,
        flight_id: FlightId,
    ) -> SchedulingResult<ScheduledFlight> {
        let flight = match self.repo.get_flight(flight_id).await {
            Ok(flight) => flight,
            Err(e) if e.is_not_found() => {
                return Err(SchedulingError::validation(format!(
                    "Unknown flight {flight_id}"
                )))
            }
            Err(e) => return Err(e.into()),
        };
        // Ownership is carried by the aircraft.
        self.owned_aircraft(operator_id, flight.aircraft_id).await?;
        Ok(flight)
    }

    async fn owned_maintenance(
        &self,
        operator_id: OperatorId,
        maintenance_id: MaintenanceId,
    ) -> SchedulingResult<(MaintenancePattern, Aircraft)> {
        let pattern = match self.repo.get_maintenance(maintenance_id).await {
            Ok(pattern) => pattern,
            Err(e) if e.is_not_found() => {
                return Err(SchedulingError::validation(format!(
                    "Unknown maintenance pattern {maintenance_id}"
                )))
            }
            Err(e) => return Err(e.into()),
        };
        let aircraft = self.owned_aircraft(operator_id, pattern.aircraft_id).await?;
        Ok((pattern, aircraft))
    }
}
