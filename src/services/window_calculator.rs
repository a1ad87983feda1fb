//! Operation window computation.
//!
//! Turns (route, aircraft, departure instant) into the full ground-to-ground
//! busy interval: pre-flight services, the airborne round trip with wind and
//! per-route variation applied, turnaround and technical-stop dwells, and
//! post-flight services. The computation is fully deterministic — the same
//! inputs always yield the same window.

use chrono::{Duration, NaiveDateTime};
use sha2::{Digest, Sha256};

use crate::config::SchedulingSettings;
use crate::models::fleet::{Aircraft, Airport, Route};
use crate::models::time::{round_to_nearest_5min, OperationWindow};
use crate::services::ground_times;

/// Full timing breakdown for one scheduled round trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightTiming {
    pub departure: NaiveDateTime,
    /// Departure + round trip, rounded to the nearest 5 minutes.
    pub arrival: NaiveDateTime,
    pub pre_flight_min: i64,
    pub post_flight_min: i64,
    /// The resulting aircraft-unavailability interval.
    pub window: OperationWindow,
}

/// Computes operation windows from route and aircraft data.
#[derive(Debug, Clone)]
pub struct WindowCalculator {
    settings: SchedulingSettings,
}

impl WindowCalculator {
    pub fn new(settings: SchedulingSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SchedulingSettings {
        &self.settings
    }

    /// Compute the full timing for a round trip departing at `departure`.
    pub fn flight_timing(
        &self,
        route: &Route,
        aircraft: &Aircraft,
        departure: NaiveDateTime,
    ) -> FlightTiming {
        let distance_nm = route.distance_nm.unwrap_or(self.settings.default_distance_nm);
        let speed_kt = aircraft
            .cruise_speed_kt
            .unwrap_or(self.settings.default_cruise_speed_kt);
        let variation = self.route_variation(route);

        let mut airborne_min = 0.0;
        let mut ground_min = route.turnaround_min;

        match &route.technical_stop {
            None => {
                airborne_min +=
                    self.leg_minutes(&route.origin, &route.destination, distance_nm, speed_kt);
                airborne_min +=
                    self.leg_minutes(&route.destination, &route.origin, distance_nm, speed_kt);
            }
            Some(stop) => {
                let to_stop = stop.to_stop_nm.unwrap_or(distance_nm / 2.0);
                let from_stop = stop.from_stop_nm.unwrap_or(distance_nm / 2.0);

                airborne_min +=
                    self.leg_minutes(&route.origin, &stop.airport, to_stop, speed_kt);
                airborne_min +=
                    self.leg_minutes(&stop.airport, &route.destination, from_stop, speed_kt);
                airborne_min +=
                    self.leg_minutes(&route.destination, &stop.airport, from_stop, speed_kt);
                airborne_min +=
                    self.leg_minutes(&stop.airport, &route.origin, to_stop, speed_kt);

                // One dwell per transit through the stop.
                ground_min += 2 * stop.dwell_min;
            }
        }

        let round_trip_min = airborne_min * variation + ground_min as f64;
        let arrival =
            round_to_nearest_5min(departure + Duration::seconds((round_trip_min * 60.0) as i64));

        let pre_flight_min = ground_times::pre_flight_minutes(aircraft, distance_nm);
        let post_flight_min = ground_times::post_flight_minutes(aircraft);

        let window = OperationWindow::new(
            departure - Duration::minutes(pre_flight_min),
            arrival + Duration::minutes(post_flight_min),
        )
        .expect("round trip and service durations are positive");

        FlightTiming {
            departure,
            arrival,
            pre_flight_min,
            post_flight_min,
            window,
        }
    }

    /// Shorthand when only the busy interval is needed.
    pub fn operation_window(
        &self,
        route: &Route,
        aircraft: &Aircraft,
        departure: NaiveDateTime,
    ) -> OperationWindow {
        self.flight_timing(route, aircraft, departure).window
    }

    /// Airborne minutes for one leg, wind applied.
    fn leg_minutes(&self, from: &Airport, to: &Airport, distance_nm: f64, speed_kt: f64) -> f64 {
        let base = distance_nm / speed_kt * 60.0;
        base * self.wind_factor(from, to)
    }

    /// Directional wind multiplier on leg time.
    ///
    /// Eastbound legs ride the prevailing westerlies and get faster, westbound
    /// legs slower. The effect peaks at mid-latitudes and vanishes towards the
    /// equator and the poles, scales with the longitude delta, and is zero
    /// below the minimum delta.
    fn wind_factor(&self, from: &Airport, to: &Airport) -> f64 {
        let mut delta_lon = to.longitude - from.longitude;
        if delta_lon > 180.0 {
            delta_lon -= 360.0;
        } else if delta_lon < -180.0 {
            delta_lon += 360.0;
        }

        if delta_lon.abs() < self.settings.min_wind_lon_delta_deg {
            return 1.0;
        }

        let mean_lat = (from.latitude + to.latitude) / 2.0;
        let envelope = (2.0 * mean_lat.to_radians()).sin().abs();
        let strength = self.settings.max_wind_effect * envelope * (delta_lon.abs() / 180.0);

        if delta_lon > 0.0 {
            1.0 - strength
        } else {
            1.0 + strength
        }
    }

    /// Deterministic per-route variation multiplier in `1 ± max_route_variation`.
    ///
    /// The variation is derived from a SHA-256 digest over the four endpoint
    /// coordinates printed at fixed precision; the first eight digest bytes,
    /// read big-endian, map linearly onto the variation range. The same route
    /// always yields the same factor.
    fn route_variation(&self, route: &Route) -> f64 {
        let mut hasher = Sha256::new();
        for coord in [
            route.origin.latitude,
            route.origin.longitude,
            route.destination.latitude,
            route.destination.longitude,
        ] {
            hasher.update(format!("{coord:.6};"));
        }
        let digest = hasher.finalize();

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        let unit = u64::from_be_bytes(bytes) as f64 / u64::MAX as f64;

        1.0 + self.settings.max_route_variation * (2.0 * unit - 1.0)
    }
}
