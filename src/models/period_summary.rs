use chrono::NaiveDate;
use serde::Serialize;

/// Reduction of the daily activity of one entity over `[period_start, period_end]`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PeriodSummary {
    pub entity_id: i64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_days_in_time: i64,
    pub total_days_outside_time: i64,
    pub total_days_not_sent: i64,
    pub total_prs_in_time: i64,
    pub total_prs_outside_time: i64,
}

impl PeriodSummary {
    pub fn empty(entity_id: i64, period_start: NaiveDate, period_end: NaiveDate) -> Self {
        Self {
            entity_id,
            period_start,
            period_end,
            total_days_in_time: 0,
            total_days_outside_time: 0,
            total_days_not_sent: 0,
            total_prs_in_time: 0,
            total_prs_outside_time: 0,
        }
    }

    pub fn total_days(&self) -> i64 {
        self.total_days_in_time + self.total_days_outside_time + self.total_days_not_sent
    }

    pub fn total_prs(&self) -> i64 {
        self.total_prs_in_time + self.total_prs_outside_time
    }
}
