//! Ground service duration tables.
//!
//! One shared step-function lookup keyed by capacity bracket and aircraft
//! category. Every component that needs a service duration goes through this
//! module; the brackets are never re-derived elsewhere.

use crate::models::fleet::Aircraft;

/// Capacity brackets: <100, <200, <300, 300+ seats.
fn capacity_step(capacity: u32, steps: [i64; 4]) -> i64 {
    match capacity {
        0..=99 => steps[0],
        100..=199 => steps[1],
        200..=299 => steps[2],
        _ => steps[3],
    }
}

/// Distance brackets: <500, <1500, <3000, 3000+ nautical miles.
fn distance_step(distance_nm: f64, steps: [i64; 4]) -> i64 {
    if distance_nm < 500.0 {
        steps[0]
    } else if distance_nm < 1_500.0 {
        steps[1]
    } else if distance_nm < 3_000.0 {
        steps[2]
    } else {
        steps[3]
    }
}

/// Catering minutes. Cargo aircraft are not catered.
pub fn catering_minutes(aircraft: &Aircraft) -> i64 {
    if aircraft.is_cargo() {
        return 0;
    }
    capacity_step(aircraft.capacity, [20, 30, 40, 50])
}

/// Boarding minutes. Cargo aircraft skip boarding.
pub fn boarding_minutes(aircraft: &Aircraft) -> i64 {
    if aircraft.is_cargo() {
        return 0;
    }
    capacity_step(aircraft.capacity, [25, 35, 45, 55])
}

/// Fuelling minutes, by one-way route distance.
pub fn fuelling_minutes(distance_nm: f64) -> i64 {
    distance_step(distance_nm, [30, 45, 60, 75])
}

/// Deboarding minutes. Cargo aircraft skip deboarding.
pub fn deboarding_minutes(aircraft: &Aircraft) -> i64 {
    if aircraft.is_cargo() {
        return 0;
    }
    capacity_step(aircraft.capacity, [15, 25, 35, 40])
}

/// Cabin/hold cleaning minutes, all categories.
pub fn cleaning_minutes(aircraft: &Aircraft) -> i64 {
    capacity_step(aircraft.capacity, [20, 30, 40, 45])
}

/// Pre-flight ground time: catering and boarding run in parallel with
/// fuelling, so the slower of the two chains wins.
pub fn pre_flight_minutes(aircraft: &Aircraft, distance_nm: f64) -> i64 {
    let cabin = catering_minutes(aircraft) + boarding_minutes(aircraft);
    cabin.max(fuelling_minutes(distance_nm))
}

/// Post-flight ground time: deboarding followed by cleaning.
pub fn post_flight_minutes(aircraft: &Aircraft) -> i64 {
    deboarding_minutes(aircraft) + cleaning_minutes(aircraft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AircraftId, OperatorId};
    use crate::models::fleet::AircraftCategory;

    fn aircraft(category: AircraftCategory, capacity: u32) -> Aircraft {
        Aircraft {
            id: AircraftId::new(1),
            operator_id: OperatorId::new(1),
            registration: "EC-TST".to_string(),
            category,
            capacity,
            cruise_speed_kt: Some(450.0),
        }
    }

    #[test]
    fn test_capacity_brackets() {
        let small = aircraft(AircraftCategory::Passenger, 90);
        let medium = aircraft(AircraftCategory::Passenger, 150);
        let large = aircraft(AircraftCategory::Passenger, 320);

        assert_eq!(catering_minutes(&small), 20);
        assert_eq!(catering_minutes(&medium), 30);
        assert_eq!(catering_minutes(&large), 50);
        assert_eq!(cleaning_minutes(&medium), 30);
    }

    #[test]
    fn test_cargo_skips_cabin_services() {
        let freighter = aircraft(AircraftCategory::Cargo, 0);
        assert_eq!(catering_minutes(&freighter), 0);
        assert_eq!(boarding_minutes(&freighter), 0);
        assert_eq!(deboarding_minutes(&freighter), 0);
        // Fuelling and cleaning still apply.
        assert_eq!(fuelling_minutes(900.0), 45);
        assert_eq!(cleaning_minutes(&freighter), 20);
    }

    #[test]
    fn test_pre_flight_is_slower_chain() {
        // 150 seats: catering 30 + boarding 35 = 65 > fuelling 45 on a short hop.
        let medium = aircraft(AircraftCategory::Passenger, 150);
        assert_eq!(pre_flight_minutes(&medium, 900.0), 65);

        // Long-haul fuelling dominates a cargo pre-flight entirely.
        let freighter = aircraft(AircraftCategory::Cargo, 0);
        assert_eq!(pre_flight_minutes(&freighter, 4_000.0), 75);
    }

    #[test]
    fn test_distance_bracket_edges() {
        assert_eq!(fuelling_minutes(499.9), 30);
        assert_eq!(fuelling_minutes(500.0), 45);
        assert_eq!(fuelling_minutes(3_000.0), 75);
    }
}
