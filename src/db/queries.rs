//! Persistence operations. Every write is an upsert keyed so that repeated
//! runs converge to the same state.

use crate::core::clock;
use crate::db::models::{EntityDailyRow, EntitySummaryRow};
use crate::errors::{AppError, AppResult};
use crate::models::{ActivityState, DailyActivity, Entity, Event, PeriodSummary};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

pub const DATE_FMT: &str = "%Y-%m-%d";
pub const LOCAL_TS_FMT: &str = "%Y-%m-%dT%H:%M:%S";

fn conversion_error(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn get_date(row: &Row, idx: usize) -> Result<NaiveDate> {
    let s: String = row.get(idx)?;
    NaiveDate::parse_from_str(&s, DATE_FMT).map_err(|_| conversion_error(idx, AppError::InvalidDate(s)))
}

fn date_str(d: NaiveDate) -> String {
    d.format(DATE_FMT).to_string()
}

// ---------------------------
// users
// ---------------------------

fn map_entity(row: &Row) -> Result<Entity> {
    Ok(Entity {
        id: row.get(0)?,
        login: row.get(1)?,
        email: row.get(2)?,
        display_name: row.get(3)?,
        included: row.get::<_, i64>(4)? == 1,
    })
}

/// Insert or update a user by login and return its id.
/// A missing email/name does not erase the stored one.
pub fn upsert_entity(
    conn: &Connection,
    login: &str,
    email: Option<&str>,
    name: Option<&str>,
    included: bool,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO users (login, email, name, included_flag)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(login) DO UPDATE SET
             email = COALESCE(excluded.email, users.email),
             name = COALESCE(excluded.name, users.name),
             included_flag = excluded.included_flag",
        params![login, email, name, included as i64],
    )?;

    let id = conn.query_row("SELECT id FROM users WHERE login = ?1", [login], |row| {
        row.get(0)
    })?;
    Ok(id)
}

pub fn set_included(conn: &Connection, entity_id: i64, included: bool) -> AppResult<()> {
    conn.execute(
        "UPDATE users SET included_flag = ?1 WHERE id = ?2",
        params![included as i64, entity_id],
    )?;
    Ok(())
}

pub fn list_entities(conn: &Connection, included_only: bool) -> AppResult<Vec<Entity>> {
    let sql = if included_only {
        "SELECT id, login, email, name, included_flag FROM users
         WHERE included_flag = 1 ORDER BY login"
    } else {
        "SELECT id, login, email, name, included_flag FROM users ORDER BY login"
    };

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], map_entity)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn find_entity(conn: &Connection, login: &str) -> AppResult<Option<Entity>> {
    let entity = conn
        .query_row(
            "SELECT id, login, email, name, included_flag FROM users WHERE login = ?1",
            [login],
            map_entity,
        )
        .optional()?;
    Ok(entity)
}

// ---------------------------
// pull_requests
// ---------------------------

fn map_event(row: &Row) -> Result<Event> {
    let utc_str: String = row.get(4)?;
    let timestamp_utc =
        clock::parse_utc(&utc_str).map_err(|e| conversion_error(4, e))?;

    let local_str: String = row.get(5)?;
    let timestamp_local = NaiveDateTime::parse_from_str(&local_str, LOCAL_TS_FMT)
        .map_err(|_| conversion_error(5, AppError::InvalidTimestamp(local_str.clone())))?;

    Ok(Event {
        event_id: row.get(0)?,
        entity_id: row.get(1)?,
        repository: row.get(2)?,
        title: row.get(3)?,
        timestamp_utc,
        timestamp_local,
        date_local: get_date(row, 6)?,
    })
}

const EVENT_COLUMNS: &str =
    "pr_id, user_id, repository, title, timestamp_utc, timestamp_local, date_local";

/// Upsert a batch of events in one transaction, keyed by event id.
/// Returns the number of rows written.
pub fn upsert_events(conn: &mut Connection, batch: &[Event]) -> AppResult<usize> {
    if batch.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    let written = write_events(&tx, batch)?;
    tx.commit()?;

    Ok(written)
}

/// Upsert events on a connection (or transaction) the caller controls.
pub fn write_events(conn: &Connection, batch: &[Event]) -> AppResult<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO pull_requests
             (pr_id, user_id, repository, title, timestamp_utc, timestamp_local, date_local)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(pr_id) DO UPDATE SET
             user_id = excluded.user_id,
             repository = excluded.repository,
             title = excluded.title,
             timestamp_utc = excluded.timestamp_utc,
             timestamp_local = excluded.timestamp_local,
             date_local = excluded.date_local,
             cached_at = CURRENT_TIMESTAMP",
    )?;

    for ev in batch {
        stmt.execute(params![
            ev.event_id,
            ev.entity_id,
            ev.repository,
            ev.title,
            ev.timestamp_utc.to_rfc3339(),
            ev.timestamp_local.format(LOCAL_TS_FMT).to_string(),
            date_str(ev.date_local),
        ])?;
    }

    Ok(batch.len())
}

/// Distinct local dates that have at least one cached event.
pub fn distinct_event_dates(conn: &Connection, entity_id: i64) -> AppResult<Vec<NaiveDate>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT date_local FROM pull_requests
         WHERE user_id = ?1
         ORDER BY date_local",
    )?;
    let rows = stmt.query_map([entity_id], |row| get_date(row, 0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn events_in_range(
    conn: &Connection,
    entity_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<Event>> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM pull_requests
         WHERE user_id = ?1 AND date_local BETWEEN ?2 AND ?3
         ORDER BY timestamp_local, pr_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![entity_id, date_str(start), date_str(end)], map_event)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn all_events(conn: &Connection) -> AppResult<Vec<Event>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM pull_requests ORDER BY pr_id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_event)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count_events(conn: &Connection) -> AppResult<i64> {
    let n = conn.query_row("SELECT COUNT(*) FROM pull_requests", [], |row| row.get(0))?;
    Ok(n)
}

// ---------------------------
// daily_activity
// ---------------------------

fn map_state(row: &Row, idx: usize) -> Result<ActivityState> {
    let s: String = row.get(idx)?;
    ActivityState::from_db_str(&s).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, format!("Invalid state: {s}").into())
    })
}

pub fn upsert_daily_activity(conn: &Connection, activity: &DailyActivity) -> AppResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO daily_activity (user_id, date_local, state, count_in_time, count_outside_time)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(user_id, date_local) DO UPDATE SET
             state = excluded.state,
             count_in_time = excluded.count_in_time,
             count_outside_time = excluded.count_outside_time",
    )?;
    stmt.execute(params![
        activity.entity_id,
        date_str(activity.date_local),
        activity.state.to_db_str(),
        activity.count_in_time,
        activity.count_outside_time,
    ])?;
    Ok(())
}

/// Upsert every day of an entity's analysis in one transaction.
pub fn upsert_daily_activities(conn: &mut Connection, days: &[DailyActivity]) -> AppResult<()> {
    let tx = conn.transaction()?;
    for day in days {
        upsert_daily_activity(&tx, day)?;
    }
    tx.commit()?;
    Ok(())
}

pub fn list_daily_activity(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<EntityDailyRow>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.login, u.email, u.name, u.included_flag,
                da.date_local, da.state, da.count_in_time, da.count_outside_time
         FROM daily_activity da
         JOIN users u ON da.user_id = u.id
         WHERE da.date_local BETWEEN ?1 AND ?2
         ORDER BY u.login, da.date_local",
    )?;

    let rows = stmt.query_map(params![date_str(start), date_str(end)], |row| {
        let entity = map_entity(row)?;
        Ok(EntityDailyRow {
            activity: DailyActivity {
                entity_id: entity.id,
                date_local: get_date(row, 5)?,
                state: map_state(row, 6)?,
                count_in_time: row.get(7)?,
                count_outside_time: row.get(8)?,
            },
            entity,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------
// summaries
// ---------------------------

pub fn upsert_summary(conn: &Connection, s: &PeriodSummary) -> AppResult<()> {
    conn.execute(
        "INSERT INTO summaries (
             user_id, period_start, period_end,
             total_days_in_time, total_days_outside_time, total_days_not_sent,
             total_prs_in_time, total_prs_outside_time
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(user_id, period_start, period_end) DO UPDATE SET
             total_days_in_time = excluded.total_days_in_time,
             total_days_outside_time = excluded.total_days_outside_time,
             total_days_not_sent = excluded.total_days_not_sent,
             total_prs_in_time = excluded.total_prs_in_time,
             total_prs_outside_time = excluded.total_prs_outside_time,
             generated_at = CURRENT_TIMESTAMP",
        params![
            s.entity_id,
            date_str(s.period_start),
            date_str(s.period_end),
            s.total_days_in_time,
            s.total_days_outside_time,
            s.total_days_not_sent,
            s.total_prs_in_time,
            s.total_prs_outside_time,
        ],
    )?;
    Ok(())
}

/// Summaries computed for exactly the period `[start, end]`.
pub fn list_summaries(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<EntitySummaryRow>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.login, u.email, u.name, u.included_flag,
                s.period_start, s.period_end,
                s.total_days_in_time, s.total_days_outside_time, s.total_days_not_sent,
                s.total_prs_in_time, s.total_prs_outside_time, s.generated_at
         FROM summaries s
         JOIN users u ON s.user_id = u.id
         WHERE s.period_start = ?1 AND s.period_end = ?2
         ORDER BY u.login",
    )?;

    let rows = stmt.query_map(params![date_str(start), date_str(end)], |row| {
        let entity = map_entity(row)?;
        Ok(EntitySummaryRow {
            summary: PeriodSummary {
                entity_id: entity.id,
                period_start: get_date(row, 5)?,
                period_end: get_date(row, 6)?,
                total_days_in_time: row.get(7)?,
                total_days_outside_time: row.get(8)?,
                total_days_not_sent: row.get(9)?,
                total_prs_in_time: row.get(10)?,
                total_prs_outside_time: row.get(11)?,
            },
            generated_at: row.get(12)?,
            entity,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Drop every derived row (daily activity and summaries).
pub fn clear_derived(conn: &Connection) -> AppResult<()> {
    conn.execute_batch("DELETE FROM daily_activity; DELETE FROM summaries;")?;
    Ok(())
}

// ---------------------------
// cache_metadata
// ---------------------------

pub fn get_meta(conn: &Connection, key: &str) -> AppResult<Option<String>> {
    let v = conn
        .query_row(
            "SELECT value FROM cache_metadata WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_meta(conn: &Connection, key: &str, value: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO cache_metadata (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        params![key, value],
    )?;
    Ok(())
}
