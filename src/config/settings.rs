//! Immutable analysis settings threaded through every component call.

use chrono::NaiveDateTime;
use chrono::Timelike;
use chrono_tz::Tz;
use std::collections::BTreeSet;

/// Half-open window of local hours: `start_hour <= hour < end_hour`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl WorkingHours {
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    pub fn contains_hour(&self, hour: u32) -> bool {
        self.start_hour <= hour && hour < self.end_hour
    }

    /// An event exactly at `end_hour:00` is outside.
    pub fn contains(&self, local: NaiveDateTime) -> bool {
        self.contains_hour(local.hour())
    }

    pub fn label(&self) -> String {
        format!("{:02}:00-{:02}:00", self.start_hour, self.end_hour)
    }
}

/// Which roster members take part in the analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRules {
    pub exclusion_set: BTreeSet<String>,
    pub email_suffix_filter: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub timezone: Tz,
    pub hours: WorkingHours,
    pub filter: FilterRules,
}
