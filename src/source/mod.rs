//! Remote source of roster members and pull request events.

pub mod github;

use crate::errors::AppResult;
use chrono::{DateTime, NaiveDate, Utc};

pub use github::GitHubClient;

/// A team member as reported by the remote roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterMember {
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// A pull request as reported by the remote source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEvent {
    pub event_id: String,
    pub title: String,
    pub created_at_utc: DateTime<Utc>,
    pub repository: String,
}

/// Blocking, retry-free event source.
///
/// Errors are `SourceUnavailable` or `EntityNotFound`; callers treat them as
/// a failure of the single entity being processed.
pub trait EventSource {
    fn fetch_roster(&self) -> AppResult<Vec<RosterMember>>;

    /// Pull requests opened by `login` within `[window_start, window_end]`.
    ///
    /// The window is a range of local calendar dates; implementations may
    /// return a little more, the caller narrows the result by local date.
    fn fetch_events(
        &self,
        login: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> AppResult<Vec<RemoteEvent>>;
}
