//! Joined row models returned by the listing queries.

use crate::models::{DailyActivity, Entity, PeriodSummary};

/// One `daily_activity` row with its owning user.
#[derive(Debug, Clone)]
pub struct EntityDailyRow {
    pub entity: Entity,
    pub activity: DailyActivity,
}

/// One `summaries` row with its owning user.
#[derive(Debug, Clone)]
pub struct EntitySummaryRow {
    pub entity: Entity,
    pub summary: PeriodSummary,
    pub generated_at: String,
}
