use serde::{Serialize, Serializer};
use std::fmt;

/// Classification of one (entity, day) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityState {
    NotSent,
    SentInTime,
    SentOutsideTime,
}

impl ActivityState {
    /// Human readable label, also used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            ActivityState::NotSent => "Not Sent",
            ActivityState::SentInTime => "Sent In Time",
            ActivityState::SentOutsideTime => "Sent Outside Time",
        }
    }

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ActivityState::NotSent => "not_sent",
            ActivityState::SentInTime => "sent_in_time",
            ActivityState::SentOutsideTime => "sent_outside_time",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "not_sent" => Some(ActivityState::NotSent),
            "sent_in_time" => Some(ActivityState::SentInTime),
            "sent_outside_time" => Some(ActivityState::SentOutsideTime),
            _ => None,
        }
    }

    /// Derive the state from the in/out-of-hours split of a day.
    pub fn from_counts(count_in_time: i64, count_outside_time: i64) -> Self {
        if count_in_time > 0 {
            ActivityState::SentInTime
        } else if count_outside_time > 0 {
            ActivityState::SentOutsideTime
        } else {
            ActivityState::NotSent
        }
    }
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ActivityState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
