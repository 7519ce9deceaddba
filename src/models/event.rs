use crate::core::clock;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// A single pull request attributed to an entity.
///
/// `timestamp_local` and `date_local` are derived from `timestamp_utc` and the
/// configured timezone; they are never taken from upstream.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Event {
    pub event_id: String, // ⇔ pull_requests.pr_id (globally unique node id)
    pub entity_id: i64,
    pub repository: String,
    pub title: String,
    pub timestamp_utc: DateTime<Utc>,
    pub timestamp_local: NaiveDateTime,
    pub date_local: NaiveDate, // partition key for coverage and classification
}

impl Event {
    pub fn localized(
        event_id: impl Into<String>,
        entity_id: i64,
        repository: impl Into<String>,
        title: impl Into<String>,
        timestamp_utc: DateTime<Utc>,
        tz: Tz,
    ) -> Self {
        let timestamp_local = clock::to_local(timestamp_utc, tz);
        Self {
            event_id: event_id.into(),
            entity_id,
            repository: repository.into(),
            title: title.into(),
            timestamp_utc,
            timestamp_local,
            date_local: timestamp_local.date(),
        }
    }

    /// Recompute the local fields after a timezone change.
    pub fn relocalize(&mut self, tz: Tz) {
        self.timestamp_local = clock::to_local(self.timestamp_utc, tz);
        self.date_local = self.timestamp_local.date();
    }

    pub fn local_hour(&self) -> u32 {
        self.timestamp_local.hour()
    }
}
