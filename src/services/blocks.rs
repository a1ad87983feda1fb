//! Multi-day maintenance block expansion.
//!
//! Projects maintenance patterns into per-calendar-day display blocks for a
//! query date range. A pattern touching several days emits one block per
//! day: the first carries the real start time, the rest are "ongoing"
//! placeholders. The span shape is an explicit tagged variant rather than a
//! set of flags.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use chrono::NaiveDate;

use crate::api::{AircraftId, DateRange, MaintenanceId};
use crate::models::maintenance::{CheckType, MaintenancePattern, Recurrence, MINUTES_PER_DAY};

/// Calendar shape of a maintenance block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "span", rename_all = "snake_case")]
pub enum BlockSpan {
    /// Starts and ends within one calendar day.
    SingleDay,
    /// Nominally one day, but the end time lands on the following day.
    OvernightSpan { end_time_next_day: NaiveTime },
    /// Occupies `day_count` calendar days.
    MultiDaySpan { day_count: u32 },
}

/// One display block: a single calendar day's slice of a pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceBlock {
    pub maintenance_id: MaintenanceId,
    pub aircraft_id: AircraftId,
    pub check: CheckType,
    pub date: NaiveDate,
    /// Real start time on the first day; `None` on ongoing placeholder days.
    pub start_time: Option<NaiveTime>,
    pub span: BlockSpan,
}

impl MaintenanceBlock {
    /// True for the placeholder days of a multi-day check.
    pub fn is_ongoing(&self) -> bool {
        self.start_time.is_none()
    }
}

/// Expand every pattern into display blocks over `range`, ordered by date
/// then pattern ID. Inactive patterns emit nothing.
pub fn expand_patterns(patterns: &[MaintenancePattern], range: &DateRange) -> Vec<MaintenanceBlock> {
    let mut blocks = Vec::new();
    for pattern in patterns.iter().filter(|p| p.is_active()) {
        expand_pattern(pattern, range, &mut blocks);
    }
    blocks.sort_by_key(|b| (b.date, b.maintenance_id.value()));
    blocks
}

fn expand_pattern(pattern: &MaintenancePattern, range: &DateRange, out: &mut Vec<MaintenanceBlock>) {
    match pattern.recurrence {
        Recurrence::Weekly(weekday) => {
            use chrono::Datelike;
            for date in range.iter_days().filter(|d| d.weekday() == weekday) {
                out.push(MaintenanceBlock {
                    maintenance_id: pattern.id,
                    aircraft_id: pattern.aircraft_id,
                    check: pattern.check,
                    date,
                    start_time: Some(pattern.start_time),
                    span: span_shape(pattern),
                });
            }
        }
        Recurrence::Anchored(anchor) => {
            let span = pattern.check.span_days();
            if range.contains(anchor) {
                out.push(MaintenanceBlock {
                    maintenance_id: pattern.id,
                    aircraft_id: pattern.aircraft_id,
                    check: pattern.check,
                    date: anchor,
                    start_time: Some(pattern.start_time),
                    span: span_shape(pattern),
                });
            }
            for offset in 1..span {
                let date = anchor + Duration::days(i64::from(offset));
                if range.contains(date) {
                    out.push(MaintenanceBlock {
                        maintenance_id: pattern.id,
                        aircraft_id: pattern.aircraft_id,
                        check: pattern.check,
                        date,
                        start_time: None,
                        span: span_shape(pattern),
                    });
                }
            }
        }
    }
}

/// Span shape of the pattern's occurrences.
///
/// A one-day span whose end time crosses midnight is a single overnight
/// block carrying the next-day end time, never two blocks.
fn span_shape(pattern: &MaintenancePattern) -> BlockSpan {
    let span = pattern.check.span_days();
    if span > 1 {
        return BlockSpan::MultiDaySpan { day_count: span };
    }

    let start_min = pattern
        .start_time
        .signed_duration_since(NaiveTime::MIN)
        .num_minutes();
    if start_min + pattern.check.duration_minutes() > MINUTES_PER_DAY {
        // NaiveTime addition wraps past midnight, yielding the next-day end.
        BlockSpan::OvernightSpan {
            end_time_next_day: pattern.start_time
                + Duration::minutes(pattern.check.duration_minutes()),
        }
    } else {
        BlockSpan::SingleDay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::maintenance::MaintenanceStatus;
    use chrono::Weekday;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn range(from: u32, to: u32) -> DateRange {
        DateRange::new(date(from), date(to)).unwrap()
    }

    fn pattern(
        id: i64,
        check: CheckType,
        recurrence: Recurrence,
        hh: u32,
        mm: u32,
    ) -> MaintenancePattern {
        MaintenancePattern {
            id: MaintenanceId::new(id),
            aircraft_id: AircraftId::new(1),
            check,
            recurrence,
            start_time: NaiveTime::from_hms_opt(hh, mm, 0).unwrap(),
            last_performed: None,
            status: MaintenanceStatus::Active,
        }
    }

    #[test]
    fn test_weekly_pattern_one_block_per_matching_weekday() {
        let p = pattern(1, CheckType::Daily, Recurrence::Weekly(Weekday::Mon), 6, 0);
        // March 2026 Mondays in range: 2, 9, 16.
        let blocks = expand_patterns(std::slice::from_ref(&p), &range(1, 20));

        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| b.start_time.is_some()));
        assert!(blocks.iter().all(|b| b.span == BlockSpan::SingleDay));
        assert_eq!(blocks[0].date, date(2));
    }

    #[test]
    fn test_multi_day_block_count_matches_span() {
        // 14-day C check: exactly ceil(D/1440) = 14 blocks, only the first
        // carrying the real start time.
        let p = pattern(1, CheckType::CCheck, Recurrence::Anchored(date(3)), 8, 0);
        let blocks = expand_patterns(std::slice::from_ref(&p), &range(1, 31));

        assert_eq!(blocks.len(), 14);
        assert_eq!(blocks[0].date, date(3));
        assert_eq!(blocks[0].start_time, Some(NaiveTime::from_hms_opt(8, 0, 0).unwrap()));
        assert!(blocks[1..].iter().all(|b| b.is_ongoing()));
        assert!(blocks
            .iter()
            .all(|b| b.span == BlockSpan::MultiDaySpan { day_count: 14 }));
    }

    #[test]
    fn test_range_clips_multi_day_blocks() {
        let p = pattern(1, CheckType::CCheck, Recurrence::Anchored(date(3)), 8, 0);
        let blocks = expand_patterns(std::slice::from_ref(&p), &range(10, 12));

        // Days 10-12 of the 3rd-16th span: three ongoing placeholders.
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| b.is_ongoing()));
    }

    #[test]
    fn test_overnight_span_is_single_block() {
        // 8h weekly check at 22:00 ends 06:00 next day: one block with a
        // next-day end marker, not two.
        let p = pattern(1, CheckType::Weekly, Recurrence::Anchored(date(5)), 22, 0);
        let blocks = expand_patterns(std::slice::from_ref(&p), &range(1, 10));

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].date, date(5));
        assert_eq!(
            blocks[0].span,
            BlockSpan::OvernightSpan {
                end_time_next_day: NaiveTime::from_hms_opt(6, 0, 0).unwrap()
            }
        );
    }

    #[test]
    fn test_midnight_exact_end_is_single_day() {
        // 22:00 + 2h daily check ends exactly at midnight: still one day.
        let p = pattern(1, CheckType::Daily, Recurrence::Anchored(date(5)), 22, 0);
        let blocks = expand_patterns(std::slice::from_ref(&p), &range(1, 10));

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].span, BlockSpan::SingleDay);
    }

    #[test]
    fn test_cancelled_patterns_emit_nothing() {
        let mut p = pattern(1, CheckType::Daily, Recurrence::Anchored(date(5)), 6, 0);
        p.status = MaintenanceStatus::Cancelled;
        assert!(expand_patterns(std::slice::from_ref(&p), &range(1, 10)).is_empty());
    }

    #[test]
    fn test_blocks_sorted_by_date_then_pattern() {
        let p1 = pattern(2, CheckType::Daily, Recurrence::Anchored(date(5)), 6, 0);
        let p2 = pattern(1, CheckType::ACheck, Recurrence::Anchored(date(4)), 8, 0);
        let blocks = expand_patterns(&[p1, p2], &range(1, 10));

        // A check on 4th-5th (2 blocks) + daily on the 5th.
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].date, date(4));
        assert_eq!(blocks[1].date, date(5));
        assert_eq!(blocks[1].maintenance_id, MaintenanceId::new(1));
        assert_eq!(blocks[2].maintenance_id, MaintenanceId::new(2));
    }
}
