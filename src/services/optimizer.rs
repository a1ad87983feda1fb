//! Best-effort maintenance gap optimization.
//!
//! After any flight or maintenance mutation, day-scoped checks on the
//! affected dates are nudged so they end exactly where the day's first
//! flight window begins, shrinking idle gaps. This runs after the primary
//! write has committed; every failure here is logged and swallowed —
//! optimization is never required for correctness.

use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

use crate::api::AircraftId;
use crate::db::repository::{FullRepository, RepositoryResult, ScheduleCommit};
use crate::models::maintenance::Recurrence;
use crate::models::time::OperationWindow;
use crate::services::conflicts;

/// Optimize the given dates for one aircraft. Infallible by construction.
pub async fn optimize_dates(repo: &dyn FullRepository, aircraft_id: AircraftId, dates: &[NaiveDate]) {
    let mut dates: Vec<NaiveDate> = dates.to_vec();
    dates.sort();
    dates.dedup();

    for date in dates {
        if let Err(e) = optimize_day(repo, aircraft_id, date).await {
            warn!("Maintenance optimization skipped for aircraft {aircraft_id} on {date}: {e}");
        }
    }
}

async fn optimize_day(
    repo: &dyn FullRepository,
    aircraft_id: AircraftId,
    date: NaiveDate,
) -> RepositoryResult<()> {
    let day_start = date.and_hms_opt(0, 0, 0).expect("midnight is a valid time");
    let day_end = day_start + Duration::days(1);

    let flights = repo
        .flights_for_aircraft(aircraft_id, day_start, day_end)
        .await?;
    let Some(first) = flights
        .iter()
        .filter(|f| f.window.start().date() == date)
        .min_by_key(|f| f.window.start())
    else {
        return Ok(());
    };
    let target_end = first.window.start();

    let patterns = repo.active_maintenance_for_aircraft(aircraft_id).await?;
    for pattern in &patterns {
        // Heavy checks are pinned; repositioning them is the rescheduler's
        // job, and only under a conflict.
        if pattern.check.is_multi_day() || !pattern.occurs_on(date) {
            continue;
        }
        if !matches!(pattern.recurrence, Recurrence::Anchored(_)) {
            debug!(
                "Not relocating weekly {} of aircraft {aircraft_id}: a weekly start-time shift would move every occurrence",
                pattern.check
            );
            continue;
        }

        let current = pattern.conflict_window(date);
        if current.end() == target_end {
            continue;
        }

        let duration = pattern.check.duration_minutes();
        let new_start = target_end - Duration::minutes(duration);
        if new_start.date() != date {
            debug!(
                "Not relocating {} of aircraft {aircraft_id}: slot before the first flight leaves {date}",
                pattern.check
            );
            continue;
        }
        let Some(new_window) = OperationWindow::new(new_start, target_end) else {
            continue;
        };

        let flight_clash = flights.iter().any(|f| f.window.overlaps(&new_window));
        let others: Vec<_> = patterns
            .iter()
            .filter(|p| p.id != pattern.id)
            .cloned()
            .collect();
        if flight_clash || conflicts::maintenance_conflict(&new_window, &others).is_some() {
            debug!(
                "Not relocating {} of aircraft {aircraft_id} on {date}: target slot is occupied",
                pattern.check
            );
            continue;
        }

        let mut moved = pattern.clone();
        moved.start_time = new_start.time();
        repo.commit_schedule_changes(ScheduleCommit {
            pattern_updates: vec![moved],
            ..Default::default()
        })
        .await?;
        debug!(
            "Relocated {} of aircraft {aircraft_id} on {date} to end at the first flight's pre-flight start",
            pattern.check
        );
    }

    Ok(())
}
