//! Scheduled flight record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::api::{AircraftId, FlightId, RouteId};
use crate::models::time::OperationWindow;

/// Lifecycle status of a scheduled flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    Scheduled,
    InProgress,
    Completed,
}

/// One instance of a route flown by one aircraft at a specific date/time.
///
/// The route number and airport codes are denormalized onto the record so
/// conflict descriptors can name the blocking flight without a join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledFlight {
    pub id: FlightId,
    pub route_id: RouteId,
    pub aircraft_id: AircraftId,
    pub route_number: String,
    pub origin: String,
    pub destination: String,
    pub departure: NaiveDateTime,
    /// Derived from the departure and the route round trip; always rounded
    /// to the nearest 5 minutes.
    pub arrival: NaiveDateTime,
    /// Full ground-to-ground busy interval, services included.
    pub window: OperationWindow,
    pub status: FlightStatus,
}

impl ScheduledFlight {
    /// Round-trip block minutes, departure to arrival.
    pub fn block_minutes(&self) -> i64 {
        (self.arrival - self.departure).num_minutes()
    }
}

/// A flight as handed to the repository for insertion (no ID yet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFlight {
    pub route_id: RouteId,
    pub aircraft_id: AircraftId,
    pub route_number: String,
    pub origin: String,
    pub destination: String,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub window: OperationWindow,
}

impl NewFlight {
    pub fn into_flight(self, id: FlightId) -> ScheduledFlight {
        ScheduledFlight {
            id,
            route_id: self.route_id,
            aircraft_id: self.aircraft_id,
            route_number: self.route_number,
            origin: self.origin,
            destination: self.destination,
            departure: self.departure,
            arrival: self.arrival,
            window: self.window,
            status: FlightStatus::Scheduled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> NewFlight {
        let departure = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let arrival = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(12, 45, 0)
            .unwrap();
        NewFlight {
            route_id: RouteId::new(1),
            aircraft_id: AircraftId::new(1),
            route_number: "FO117".to_string(),
            origin: "AGP".to_string(),
            destination: "CDG".to_string(),
            departure,
            arrival,
            window: OperationWindow::new(
                departure - chrono::Duration::minutes(60),
                arrival + chrono::Duration::minutes(45),
            )
            .unwrap(),
        }
    }

    #[test]
    fn test_into_flight_starts_scheduled() {
        let flight = sample().into_flight(FlightId::new(9));
        assert_eq!(flight.id, FlightId::new(9));
        assert_eq!(flight.status, FlightStatus::Scheduled);
        assert_eq!(flight.block_minutes(), 285);
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&FlightStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
