//! Shared fixtures for integration tests.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use fos_rust::api::{AircraftId, CreateFlightRequest, OperatorId, RouteId};
use fos_rust::config::SchedulingSettings;
use fos_rust::db::{FleetRepository, LocalRepository};
use fos_rust::models::fleet::{Aircraft, AircraftCategory, Airport, Route};
use fos_rust::services::FlightScheduler;

pub const OPERATOR: OperatorId = OperatorId(1);
pub const OTHER_OPERATOR: OperatorId = OperatorId(2);

pub fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn aircraft(id: i64, capacity: u32) -> Aircraft {
    Aircraft {
        id: AircraftId::new(id),
        operator_id: OPERATOR,
        registration: format!("EC-A{id:02}"),
        category: AircraftCategory::Passenger,
        capacity,
        cruise_speed_kt: Some(450.0),
    }
}

pub fn route(id: i64, number: &str) -> Route {
    Route {
        id: RouteId::new(id),
        operator_id: OPERATOR,
        number: number.to_string(),
        origin: Airport::new("AGP", 36.675, -4.499).unwrap(),
        destination: Airport::new("MAD", 40.47, -3.56).unwrap(),
        distance_nm: Some(230.0),
        turnaround_min: 35,
        technical_stop: None,
    }
}

/// A scheduler over a fresh in-memory repository seeded with aircraft 1
/// (150 seats) and route 1 ("FO117"). The repository handle shares the
/// scheduler's storage.
pub async fn scheduler_with_fleet() -> (FlightScheduler, LocalRepository) {
    let repo = LocalRepository::new();
    repo.store_aircraft(&aircraft(1, 150)).await.unwrap();
    repo.store_route(&route(1, "FO117")).await.unwrap();

    let scheduler = FlightScheduler::new(
        Arc::new(repo.clone()),
        SchedulingSettings::default(),
    );
    (scheduler, repo)
}

pub fn flight_request(d: u32, h: u32, m: u32) -> CreateFlightRequest {
    CreateFlightRequest {
        operator_id: OPERATOR,
        route_id: RouteId::new(1),
        aircraft_id: AircraftId::new(1),
        scheduled_date: date(d),
        departure_time: time(h, m),
    }
}
