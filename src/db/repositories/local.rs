//! In-memory local repository implementation.
//!
//! Stores all data in memory behind a single `RwLock`, suitable for unit
//! testing and local development. Because every write path takes the one
//! write lock, a [`ScheduleCommit`] is inherently atomic: either the whole
//! change set is applied or, if validation fails mid-way, nothing is.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use parking_lot::RwLock;

use crate::api::{AircraftId, FlightId, MaintenanceId, RouteId};
use crate::db::repository::{
    ErrorContext, FleetRepository, RepositoryError, RepositoryResult, ScheduleCommit,
    ScheduleRepository,
};
use crate::models::fleet::{Aircraft, Route};
use crate::models::flight::ScheduledFlight;
use crate::models::maintenance::{MaintenancePattern, NewMaintenance};

/// In-memory repository for tests and local development.
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: std::sync::Arc<RwLock<LocalData>>,
}

struct LocalData {
    aircraft: HashMap<AircraftId, Aircraft>,
    routes: HashMap<RouteId, Route>,
    flights: HashMap<FlightId, ScheduledFlight>,
    maintenance: HashMap<MaintenanceId, MaintenancePattern>,
    next_flight_id: i64,
    next_maintenance_id: i64,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            aircraft: HashMap::new(),
            routes: HashMap::new(),
            flights: HashMap::new(),
            maintenance: HashMap::new(),
            next_flight_id: 1,
            next_maintenance_id: 1,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of flights currently stored. Test helper.
    pub fn flight_count(&self) -> usize {
        self.data.read().flights.len()
    }
}

#[async_trait]
impl FleetRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }

    async fn get_aircraft(&self, id: AircraftId) -> RepositoryResult<Aircraft> {
        self.data.read().aircraft.get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Aircraft {id} not found"),
                ErrorContext::new("get_aircraft")
                    .with_entity("aircraft")
                    .with_entity_id(id),
            )
        })
    }

    async fn list_aircraft(&self) -> RepositoryResult<Vec<Aircraft>> {
        let mut aircraft: Vec<_> = self.data.read().aircraft.values().cloned().collect();
        aircraft.sort_by_key(|a| a.id);
        Ok(aircraft)
    }

    async fn get_route(&self, id: RouteId) -> RepositoryResult<Route> {
        self.data.read().routes.get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Route {id} not found"),
                ErrorContext::new("get_route")
                    .with_entity("route")
                    .with_entity_id(id),
            )
        })
    }

    async fn store_aircraft(&self, aircraft: &Aircraft) -> RepositoryResult<()> {
        self.data
            .write()
            .aircraft
            .insert(aircraft.id, aircraft.clone());
        Ok(())
    }

    async fn store_route(&self, route: &Route) -> RepositoryResult<()> {
        self.data.write().routes.insert(route.id, route.clone());
        Ok(())
    }
}

#[async_trait]
impl ScheduleRepository for LocalRepository {
    async fn get_flight(&self, id: FlightId) -> RepositoryResult<ScheduledFlight> {
        self.data.read().flights.get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Flight {id} not found"),
                ErrorContext::new("get_flight")
                    .with_entity("flight")
                    .with_entity_id(id),
            )
        })
    }

    async fn flights_for_aircraft(
        &self,
        aircraft_id: AircraftId,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepositoryResult<Vec<ScheduledFlight>> {
        let data = self.data.read();
        let mut flights: Vec<_> = data
            .flights
            .values()
            .filter(|f| f.aircraft_id == aircraft_id)
            .filter(|f| f.window.start() < to && from < f.window.end())
            .cloned()
            .collect();
        flights.sort_by_key(|f| f.window.start());
        Ok(flights)
    }

    async fn commit_schedule_changes(
        &self,
        commit: ScheduleCommit,
    ) -> RepositoryResult<Vec<ScheduledFlight>> {
        let mut data = self.data.write();

        // Validate the whole change set before touching anything so the
        // commit stays all-or-nothing.
        for update in &commit.flight_updates {
            if !data.flights.contains_key(&update.id) {
                return Err(RepositoryError::transaction(format!(
                    "Cannot update missing flight {}",
                    update.id
                )));
            }
        }
        for update in &commit.pattern_updates {
            if !data.maintenance.contains_key(&update.id) {
                return Err(RepositoryError::transaction(format!(
                    "Cannot update missing maintenance pattern {}",
                    update.id
                )));
            }
        }

        let mut inserted = Vec::with_capacity(commit.flight_inserts.len());
        for new_flight in commit.flight_inserts {
            let id = FlightId::new(data.next_flight_id);
            data.next_flight_id += 1;
            let flight = new_flight.into_flight(id);
            data.flights.insert(id, flight.clone());
            inserted.push(flight);
        }
        for update in commit.flight_updates {
            data.flights.insert(update.id, update);
        }
        for update in commit.pattern_updates {
            data.maintenance.insert(update.id, update);
        }

        Ok(inserted)
    }

    async fn delete_flight(&self, id: FlightId) -> RepositoryResult<ScheduledFlight> {
        self.data.write().flights.remove(&id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Flight {id} not found"),
                ErrorContext::new("delete_flight")
                    .with_entity("flight")
                    .with_entity_id(id),
            )
        })
    }

    async fn get_maintenance(&self, id: MaintenanceId) -> RepositoryResult<MaintenancePattern> {
        self.data
            .read()
            .maintenance
            .get(&id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Maintenance pattern {id} not found"),
                    ErrorContext::new("get_maintenance")
                        .with_entity("maintenance")
                        .with_entity_id(id),
                )
            })
    }

    async fn active_maintenance_for_aircraft(
        &self,
        aircraft_id: AircraftId,
    ) -> RepositoryResult<Vec<MaintenancePattern>> {
        let data = self.data.read();
        let mut patterns: Vec<_> = data
            .maintenance
            .values()
            .filter(|p| p.aircraft_id == aircraft_id && p.is_active())
            .cloned()
            .collect();
        patterns.sort_by_key(|p| p.id.value());
        Ok(patterns)
    }

    async fn list_active_maintenance(&self) -> RepositoryResult<Vec<MaintenancePattern>> {
        let data = self.data.read();
        let mut patterns: Vec<_> = data
            .maintenance
            .values()
            .filter(|p| p.is_active())
            .cloned()
            .collect();
        patterns.sort_by_key(|p| p.id.value());
        Ok(patterns)
    }

    async fn insert_maintenance(
        &self,
        maintenance: NewMaintenance,
    ) -> RepositoryResult<MaintenancePattern> {
        let mut data = self.data.write();
        let id = MaintenanceId::new(data.next_maintenance_id);
        data.next_maintenance_id += 1;
        let pattern = maintenance.into_pattern(id);
        data.maintenance.insert(id, pattern.clone());
        Ok(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::OperatorId;
    use crate::models::fleet::{Airport, AircraftCategory};
    use crate::models::flight::NewFlight;
    use crate::models::maintenance::{CheckType, Recurrence};
    use crate::models::time::OperationWindow;
    use chrono::{NaiveDate, NaiveTime};

    fn dt(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn new_flight(d: u32, h0: u32, h1: u32) -> NewFlight {
        NewFlight {
            route_id: RouteId::new(1),
            aircraft_id: AircraftId::new(1),
            route_number: "FO1".to_string(),
            origin: "AGP".to_string(),
            destination: "CDG".to_string(),
            departure: dt(d, h0 + 1),
            arrival: dt(d, h1 - 1),
            window: OperationWindow::new(dt(d, h0), dt(d, h1)).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_commit_assigns_sequential_ids() {
        let repo = LocalRepository::new();
        let inserted = repo
            .commit_schedule_changes(ScheduleCommit {
                flight_inserts: vec![new_flight(1, 6, 12), new_flight(1, 13, 19)],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(inserted.len(), 2);
        assert_eq!(inserted[0].id, FlightId::new(1));
        assert_eq!(inserted[1].id, FlightId::new(2));
        assert_eq!(repo.flight_count(), 2);
    }

    #[tokio::test]
    async fn test_commit_rejects_update_of_missing_flight() {
        let repo = LocalRepository::new();
        let inserted = repo
            .commit_schedule_changes(ScheduleCommit {
                flight_inserts: vec![new_flight(1, 6, 12)],
                ..Default::default()
            })
            .await
            .unwrap();

        let mut ghost = inserted[0].clone();
        ghost.id = FlightId::new(999);

        let result = repo
            .commit_schedule_changes(ScheduleCommit {
                flight_inserts: vec![new_flight(2, 6, 12)],
                flight_updates: vec![ghost],
                ..Default::default()
            })
            .await;

        assert!(result.is_err());
        // The insert in the failed commit must not have been applied.
        assert_eq!(repo.flight_count(), 1);
    }

    #[tokio::test]
    async fn test_flights_for_aircraft_window_query() {
        let repo = LocalRepository::new();
        repo.commit_schedule_changes(ScheduleCommit {
            flight_inserts: vec![new_flight(1, 6, 12), new_flight(2, 6, 12)],
            ..Default::default()
        })
        .await
        .unwrap();

        let day1 = repo
            .flights_for_aircraft(AircraftId::new(1), dt(1, 0), dt(2, 0))
            .await
            .unwrap();
        assert_eq!(day1.len(), 1);

        let other = repo
            .flights_for_aircraft(AircraftId::new(2), dt(1, 0), dt(3, 0))
            .await
            .unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_maintenance_roundtrip() {
        let repo = LocalRepository::new();
        let pattern = repo
            .insert_maintenance(NewMaintenance {
                aircraft_id: AircraftId::new(1),
                check: CheckType::Daily,
                recurrence: Recurrence::Anchored(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()),
                start_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
                last_performed: None,
            })
            .await
            .unwrap();

        let active = repo
            .active_maintenance_for_aircraft(AircraftId::new(1))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, pattern.id);

        let fetched = repo.get_maintenance(pattern.id).await.unwrap();
        assert_eq!(fetched.check, CheckType::Daily);
    }

    #[tokio::test]
    async fn test_fleet_store_and_fetch() {
        let repo = LocalRepository::new();
        let aircraft = Aircraft {
            id: AircraftId::new(5),
            operator_id: OperatorId::new(1),
            registration: "EC-AAA".to_string(),
            category: AircraftCategory::Passenger,
            capacity: 180,
            cruise_speed_kt: Some(450.0),
        };
        repo.store_aircraft(&aircraft).await.unwrap();

        let fetched = repo.get_aircraft(AircraftId::new(5)).await.unwrap();
        assert_eq!(fetched.registration, "EC-AAA");

        let missing = repo.get_route(RouteId::new(9)).await;
        assert!(matches!(missing, Err(e) if e.is_not_found()));

        let route = Route {
            id: RouteId::new(9),
            operator_id: OperatorId::new(1),
            number: "FO9".to_string(),
            origin: Airport::new("AGP", 36.675, -4.499).unwrap(),
            destination: Airport::new("CDG", 49.01, 2.55).unwrap(),
            distance_nm: Some(580.0),
            turnaround_min: 40,
            technical_stop: None,
        };
        repo.store_route(&route).await.unwrap();
        assert!(repo.get_route(RouteId::new(9)).await.is_ok());
    }
}
