//! Reduce daily activity into a period summary.

use crate::models::{ActivityState, DailyActivity, PeriodSummary};
use crate::utils::date::DateRange;

/// Single linear, order-independent reduction.
///
/// Day buckets follow `state`; PR totals sum the counts of every day
/// regardless of its state.
pub fn summarize(entity_id: i64, period: DateRange, days: &[DailyActivity]) -> PeriodSummary {
    days.iter().fold(
        PeriodSummary::empty(entity_id, period.start(), period.end()),
        |mut acc, day| {
            match day.state {
                ActivityState::SentInTime => acc.total_days_in_time += 1,
                ActivityState::SentOutsideTime => acc.total_days_outside_time += 1,
                ActivityState::NotSent => acc.total_days_not_sent += 1,
            }
            acc.total_prs_in_time += day.count_in_time;
            acc.total_prs_outside_time += day.count_outside_time;
            acc
        },
    )
}
