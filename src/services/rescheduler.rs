//! Maintenance rescheduling.
//!
//! When a candidate flight's window collides with a maintenance occurrence,
//! this module searches for an alternate slot: the original day first, then
//! each following day up to the pattern's hard deadline, always preferring
//! the start instant closest to the original one. Failure to find a slot is
//! a deadline violation — the caller must reject the triggering flight and
//! leave the pattern untouched.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::api::MaintenanceId;
use crate::models::maintenance::{CheckType, MaintenancePattern, Recurrence};
use crate::models::time::OperationWindow;

/// Outcome of a successful reschedule: where the occurrence was and where it
/// moved to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduledSlot {
    pub maintenance_id: MaintenanceId,
    pub check: CheckType,
    /// The blocked occurrence's check interval.
    pub original: OperationWindow,
    /// The relocated check interval.
    pub new: OperationWindow,
    pub new_date: NaiveDate,
    pub new_start_time: NaiveTime,
}

/// Find a replacement slot for the occurrence of `pattern` beginning on
/// `occurrence`, avoiding every window in `busy`.
///
/// `busy` must contain the candidate flight's window and every other
/// commitment over the search horizon, but not the blocked occurrence
/// itself. The search runs forward from the occurrence day to the pattern
/// deadline and returns the slot with the smallest displacement from the
/// original start instant, earliest day first.
pub fn plan_reschedule(
    pattern: &MaintenancePattern,
    occurrence: NaiveDate,
    busy: &[OperationWindow],
) -> Option<RescheduledSlot> {
    let original_start = pattern.occurrence_start(occurrence);
    let deadline = pattern.deadline(occurrence);

    let mut day = occurrence;
    while day <= deadline {
        if let Some(start) = best_start_on_day(pattern, day, busy) {
            let duration = pattern.check.duration_minutes();
            return Some(RescheduledSlot {
                maintenance_id: pattern.id,
                check: pattern.check,
                original: OperationWindow::from_start(original_start, duration)
                    .expect("check durations are positive"),
                new: OperationWindow::from_start(start, duration)
                    .expect("check durations are positive"),
                new_date: start.date(),
                new_start_time: start.time(),
            });
        }
        day = day.succ_opt()?;
    }
    None
}

/// Best feasible start on `day`: the candidate closest to the pattern's
/// time-of-day projected onto that day.
///
/// Candidate starts are the original time-of-day, midnight, and the
/// boundaries of the busy windows (right after each busy end, and early
/// enough to finish right at each busy start). Multi-day checks keep their
/// start time — their conservative whole-day occupancy makes intra-day
/// placement irrelevant.
fn best_start_on_day(
    pattern: &MaintenancePattern,
    day: NaiveDate,
    busy: &[OperationWindow],
) -> Option<NaiveDateTime> {
    let duration = pattern.check.duration_minutes();
    let day_start = day.and_hms_opt(0, 0, 0).expect("midnight is a valid time");
    let day_end = day_start + Duration::days(1);

    let mut candidates: Vec<NaiveDateTime> = if pattern.check.is_multi_day() {
        vec![day.and_time(pattern.start_time)]
    } else {
        let mut starts = vec![day.and_time(pattern.start_time), day_start];
        for w in busy {
            if w.end() >= day_start && w.end() < day_end {
                starts.push(w.end());
            }
            let before = w.start() - Duration::minutes(duration);
            if before >= day_start && before < day_end {
                starts.push(before);
            }
        }
        starts
    };

    candidates.sort();
    candidates.dedup();
    candidates.retain(|start| {
        let moved = moved_conflict_window(pattern, *start);
        busy.iter().all(|b| !b.overlaps(&moved))
    });

    let reference = day.and_time(pattern.start_time);
    candidates
        .into_iter()
        .min_by_key(|start| (*start - reference).num_minutes().abs())
}

/// Busy interval the pattern would occupy if the blocked occurrence started
/// at `start`. Mirrors [`MaintenancePattern::conflict_window`].
fn moved_conflict_window(pattern: &MaintenancePattern, start: NaiveDateTime) -> OperationWindow {
    if pattern.check.is_multi_day() {
        OperationWindow::full_days(start.date(), pattern.check.span_days() + 1)
    } else {
        OperationWindow::from_start(start, pattern.check.duration_minutes())
            .expect("check durations are positive")
    }
}

/// Apply a found slot to the pattern record.
///
/// Anchored patterns re-anchor to the new date. Weekly patterns keep their
/// weekly cadence; when the slot lands on a different day the recurrence
/// weekday shifts with it.
pub fn apply_slot(pattern: &MaintenancePattern, slot: &RescheduledSlot) -> MaintenancePattern {
    let mut moved = pattern.clone();
    moved.start_time = slot.new_start_time;
    moved.recurrence = match moved.recurrence {
        Recurrence::Anchored(_) => Recurrence::Anchored(slot.new_date),
        Recurrence::Weekly(_) => Recurrence::Weekly(slot.new_date.weekday()),
    };
    moved
}
