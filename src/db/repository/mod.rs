//! Repository traits for fleet and timeline storage.
//!
//! These traits define the abstract persistence interface the scheduling
//! services run against. Schema and query mechanics are implementation
//! concerns; the crate ships an in-memory implementation and external
//! backends implement the same contract.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::api::{AircraftId, FlightId, MaintenanceId, RouteId};
use crate::models::fleet::{Aircraft, Route};
use crate::models::flight::{NewFlight, ScheduledFlight};
use crate::models::maintenance::{MaintenancePattern, NewMaintenance};

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

/// One atomic set of timeline changes.
///
/// Either every member is persisted or none is — a flight admission that
/// moves a maintenance pattern must never commit one without the other.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleCommit {
    pub flight_inserts: Vec<NewFlight>,
    pub flight_updates: Vec<ScheduledFlight>,
    pub pattern_updates: Vec<MaintenancePattern>,
}

impl ScheduleCommit {
    pub fn is_empty(&self) -> bool {
        self.flight_inserts.is_empty()
            && self.flight_updates.is_empty()
            && self.pattern_updates.is_empty()
    }
}

/// Repository trait for fleet master data (aircraft, routes).
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait FleetRepository: Send + Sync {
    /// Check if the storage backend is reachable and healthy.
    async fn health_check(&self) -> RepositoryResult<bool>;

    async fn get_aircraft(&self, id: AircraftId) -> RepositoryResult<Aircraft>;

    async fn list_aircraft(&self) -> RepositoryResult<Vec<Aircraft>>;

    async fn get_route(&self, id: RouteId) -> RepositoryResult<Route>;

    /// Insert or replace an aircraft record.
    async fn store_aircraft(&self, aircraft: &Aircraft) -> RepositoryResult<()>;

    /// Insert or replace a route record.
    async fn store_route(&self, route: &Route) -> RepositoryResult<()>;
}

/// Repository trait for the scheduled timeline (flights and maintenance).
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn get_flight(&self, id: FlightId) -> RepositoryResult<ScheduledFlight>;

    /// All flights of an aircraft whose operation window overlaps
    /// `[from, to)`, ordered by window start.
    async fn flights_for_aircraft(
        &self,
        aircraft_id: AircraftId,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepositoryResult<Vec<ScheduledFlight>>;

    /// Apply one atomic set of timeline changes and return the inserted
    /// flights with their assigned IDs, in insert order.
    async fn commit_schedule_changes(
        &self,
        commit: ScheduleCommit,
    ) -> RepositoryResult<Vec<ScheduledFlight>>;

    /// Delete a flight and return the deleted record.
    async fn delete_flight(&self, id: FlightId) -> RepositoryResult<ScheduledFlight>;

    async fn get_maintenance(&self, id: MaintenanceId) -> RepositoryResult<MaintenancePattern>;

    /// All maintenance patterns of an aircraft with `Active` status.
    async fn active_maintenance_for_aircraft(
        &self,
        aircraft_id: AircraftId,
    ) -> RepositoryResult<Vec<MaintenancePattern>>;

    /// All active maintenance patterns across the fleet.
    async fn list_active_maintenance(&self) -> RepositoryResult<Vec<MaintenancePattern>>;

    /// Insert a new maintenance pattern and return it with its assigned ID.
    async fn insert_maintenance(
        &self,
        maintenance: NewMaintenance,
    ) -> RepositoryResult<MaintenancePattern>;
}

/// Full repository: fleet master data plus the scheduled timeline.
pub trait FullRepository: FleetRepository + ScheduleRepository {}

impl<T: FleetRepository + ScheduleRepository> FullRepository for T {}
