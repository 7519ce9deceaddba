use super::activity_state::ActivityState;
use chrono::NaiveDate;
use serde::Serialize;

/// Classification result for one entity on one local calendar date.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DailyActivity {
    pub entity_id: i64,
    pub date_local: NaiveDate, // ⇔ daily_activity.date_local (TEXT "YYYY-MM-DD")
    pub state: ActivityState,
    pub count_in_time: i64,
    pub count_outside_time: i64,
}

impl DailyActivity {
    /// An empty day: no pull requests at all.
    pub fn not_sent(entity_id: i64, date_local: NaiveDate) -> Self {
        Self {
            entity_id,
            date_local,
            state: ActivityState::NotSent,
            count_in_time: 0,
            count_outside_time: 0,
        }
    }

    pub fn total(&self) -> i64 {
        self.count_in_time + self.count_outside_time
    }
}
