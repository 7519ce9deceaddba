#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use prmonitor::config::{FilterRules, Settings, WorkingHours};
use prmonitor::db::pool::DbPool;
use prmonitor::db::queries;
use prmonitor::errors::{AppError, AppResult};
use prmonitor::models::Event;
use prmonitor::source::{EventSource, RemoteEvent, RosterMember};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

/// Environment variables that would leak the developer's setup into a test.
const CONFIG_ENV: [&str; 10] = [
    "GITHUB_TOKEN",
    "GITHUB_API_URL",
    "GITHUB_ORGANIZATION",
    "GITHUB_TEAM",
    "PROJECT_TIMEZONE",
    "WORK_START_HOUR",
    "WORK_END_HOUR",
    "EXCLUSION_LIST",
    "EMAIL_SUFFIX_FILTER",
    "DATABASE_PATH",
];

/// The binary, with `home` as HOME and no configuration in the environment.
pub fn prm(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("prmonitor");
    cmd.env("HOME", home).env_remove("RUST_LOG");
    for key in CONFIG_ENV {
        cmd.env_remove(key);
    }
    cmd
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

pub fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid rfc3339")
        .with_timezone(&Utc)
}

pub fn tz(name: &str) -> Tz {
    name.parse().expect("valid timezone")
}

/// 09:00-18:00 in `timezone`, nobody excluded.
pub fn settings(timezone: &str) -> Settings {
    Settings {
        timezone: tz(timezone),
        hours: WorkingHours::new(9, 18),
        filter: FilterRules::default(),
    }
}

pub fn settings_with_filter(timezone: &str, excluded: &[&str], suffix: &str) -> Settings {
    Settings {
        filter: FilterRules {
            exclusion_set: excluded.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            email_suffix_filter: suffix.to_string(),
        },
        ..settings(timezone)
    }
}

pub fn pool() -> DbPool {
    DbPool::in_memory().expect("in-memory db")
}

pub fn add_user(pool: &DbPool, login: &str, email: Option<&str>) -> i64 {
    queries::upsert_entity(&pool.conn, login, email, None, true).expect("upsert user")
}

pub fn event(id: &str, entity_id: i64, ts: &str, timezone: &str) -> Event {
    Event::localized(id, entity_id, "acme/api", format!("PR {id}"), utc(ts), tz(timezone))
}

pub fn store(pool: &mut DbPool, events: &[Event]) {
    queries::upsert_events(&mut pool.conn, events).expect("store events");
}

pub fn remote(id: &str, ts: &str) -> RemoteEvent {
    RemoteEvent {
        event_id: id.to_string(),
        title: format!("PR {id}"),
        created_at_utc: utc(ts),
        repository: "acme/api".to_string(),
    }
}

pub fn member(login: &str, email: Option<&str>) -> RosterMember {
    RosterMember {
        login: login.to_string(),
        name: Some(login.to_uppercase()),
        email: email.map(str::to_string),
    }
}

/// Scripted in-process source recording every event request.
#[derive(Default)]
pub struct FakeSource {
    pub roster: Vec<RosterMember>,
    pub roster_down: bool,
    pub events: HashMap<String, Vec<RemoteEvent>>,
    pub failing: HashSet<String>,
    pub calls: RefCell<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl FakeSource {
    pub fn with_roster(roster: Vec<RosterMember>) -> Self {
        Self {
            roster,
            ..Self::default()
        }
    }

    pub fn events_for(mut self, login: &str, events: Vec<RemoteEvent>) -> Self {
        self.events.insert(login.to_string(), events);
        self
    }

    pub fn failing_for(mut self, login: &str) -> Self {
        self.failing.insert(login.to_string());
        self
    }

    pub fn calls_for(&self, login: &str) -> Vec<(NaiveDate, NaiveDate)> {
        self.calls
            .borrow()
            .iter()
            .filter(|(l, _, _)| l == login)
            .map(|(_, s, e)| (*s, *e))
            .collect()
    }
}

impl EventSource for FakeSource {
    fn fetch_roster(&self) -> AppResult<Vec<RosterMember>> {
        if self.roster_down {
            return Err(AppError::SourceUnavailable("roster offline".into()));
        }
        Ok(self.roster.clone())
    }

    fn fetch_events(
        &self,
        login: &str,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> AppResult<Vec<RemoteEvent>> {
        self.calls
            .borrow_mut()
            .push((login.to_string(), window_start, window_end));

        if self.failing.contains(login) {
            return Err(AppError::SourceUnavailable(format!("timeout for {login}")));
        }
        Ok(self.events.get(login).cloned().unwrap_or_default())
    }
}
