//! Fleet records: aircraft, airports and routes.
//!
//! These records are owned by the persistence layer; during scheduling they
//! are read-only inputs. A route is immutable while flights are being
//! admitted against it.

use serde::{Deserialize, Serialize};

use crate::api::{AircraftId, OperatorId, RouteId};

/// Aircraft category; cargo aircraft skip the passenger ground services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AircraftCategory {
    Passenger,
    Cargo,
}

/// One fleet unit. Its timeline is a single mutually-exclusive resource:
/// at any instant the aircraft is doing at most one thing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aircraft {
    pub id: AircraftId,
    pub operator_id: OperatorId,
    /// Registration mark, e.g. "EC-MXY".
    pub registration: String,
    pub category: AircraftCategory,
    /// Passenger capacity in seats; 0 for cargo aircraft.
    pub capacity: u32,
    /// Cruise speed in knots; defaults apply during window computation when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cruise_speed_kt: Option<f64>,
}

impl Aircraft {
    pub fn is_cargo(&self) -> bool {
        self.category == AircraftCategory::Cargo
    }
}

/// Airport endpoint with coordinates in decimal degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    /// IATA/ICAO style code, e.g. "AGP".
    pub code: String,
    /// Latitude in decimal degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180)
    pub longitude: f64,
}

impl Airport {
    pub fn new(code: impl Into<String>, latitude: f64, longitude: f64) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err("Latitude must be between -90 and 90 degrees".to_string());
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err("Longitude must be between -180 and 180 degrees".to_string());
        }
        Ok(Self {
            code: code.into(),
            latitude,
            longitude,
        })
    }
}

/// Intermediate landing splitting one route leg into two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalStop {
    pub airport: Airport,
    /// Distance origin → stop in nautical miles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_stop_nm: Option<f64>,
    /// Distance stop → destination in nautical miles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_stop_nm: Option<f64>,
    /// Fixed ground dwell at the stop, per transit, in minutes.
    pub dwell_min: i64,
}

/// A recurring city pair flown by the operator's fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub operator_id: OperatorId,
    /// User-facing route number, e.g. "FO117".
    pub number: String,
    pub origin: Airport,
    pub destination: Airport,
    /// One-way distance in nautical miles; defaults apply when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_nm: Option<f64>,
    /// Turnaround time at the destination between outbound and return legs.
    pub turnaround_min: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_stop: Option<TechnicalStop>,
}

impl Route {
    pub fn has_technical_stop(&self) -> bool {
        self.technical_stop.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_airport_validates_coordinates() {
        assert!(Airport::new("AAA", 91.0, 0.0).is_err());
        assert!(Airport::new("AAA", 0.0, -181.0).is_err());
        assert!(Airport::new("AGP", 36.675, -4.499).is_ok());
    }

    #[test]
    fn test_cargo_category() {
        let aircraft = Aircraft {
            id: crate::api::AircraftId::new(1),
            operator_id: crate::api::OperatorId::new(1),
            registration: "EC-CGO".to_string(),
            category: AircraftCategory::Cargo,
            capacity: 0,
            cruise_speed_kt: Some(430.0),
        };
        assert!(aircraft.is_cargo());
    }

    #[test]
    fn test_category_serde_lowercase() {
        let json = serde_json::to_string(&AircraftCategory::Passenger).unwrap();
        assert_eq!(json, "\"passenger\"");
    }
}
