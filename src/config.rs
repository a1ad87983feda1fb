//! Scheduler configuration file support.
//!
//! This module provides utilities for reading scheduling parameters from
//! TOML configuration files. Every knob has a default so a missing file or
//! an empty table yields a fully working configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FosConfig {
    #[serde(default)]
    pub scheduling: SchedulingSettings,
}

/// Tunables for operation window computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingSettings {
    /// One-way distance assumed when a route has no distance, in nautical miles.
    #[serde(default = "default_distance_nm")]
    pub default_distance_nm: f64,
    /// Cruise speed assumed when an aircraft has no speed, in knots.
    #[serde(default = "default_cruise_speed_kt")]
    pub default_cruise_speed_kt: f64,
    /// Upper bound on the per-leg wind effect (fraction of leg time).
    #[serde(default = "default_max_wind_effect")]
    pub max_wind_effect: f64,
    /// Upper bound on the per-route deterministic variation (fraction).
    #[serde(default = "default_max_route_variation")]
    pub max_route_variation: f64,
    /// Longitude deltas below this carry no wind effect, in degrees.
    #[serde(default = "default_min_wind_lon_delta_deg")]
    pub min_wind_lon_delta_deg: f64,
}

fn default_distance_nm() -> f64 {
    500.0
}

fn default_cruise_speed_kt() -> f64 {
    450.0
}

fn default_max_wind_effect() -> f64 {
    0.13
}

fn default_max_route_variation() -> f64 {
    0.035
}

fn default_min_wind_lon_delta_deg() -> f64 {
    1.0
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self {
            default_distance_nm: default_distance_nm(),
            default_cruise_speed_kt: default_cruise_speed_kt(),
            max_wind_effect: default_max_wind_effect(),
            max_route_variation: default_max_route_variation(),
            min_wind_lon_delta_deg: default_min_wind_lon_delta_deg(),
        }
    }
}

impl FosConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;

        let config: FosConfig =
            toml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration from the default locations, falling back to
    /// built-in defaults when no file exists.
    ///
    /// Searches for `scheduler.toml` in the current directory, `config/`,
    /// and the parent directory.
    pub fn load_or_default() -> Self {
        let search_paths = [
            PathBuf::from("scheduler.toml"),
            PathBuf::from("config/scheduler.toml"),
            PathBuf::from("../scheduler.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Ignoring unreadable config {}: {e:#}", path.display());
                    }
                }
            }
        }

        Self::default()
    }
}
