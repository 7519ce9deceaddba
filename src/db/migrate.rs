use rusqlite::{Connection, OptionalExtension, Result};
use tracing::{debug, info};

const SCHEMA_VERSION: i64 = 2;

/// Create every table with the current schema.
fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            login         TEXT UNIQUE NOT NULL,
            email         TEXT,
            name          TEXT,
            included_flag INTEGER NOT NULL DEFAULT 1,
            created_at    TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS pull_requests (
            pr_id           TEXT PRIMARY KEY,
            user_id         INTEGER NOT NULL REFERENCES users(id),
            repository      TEXT NOT NULL,
            title           TEXT NOT NULL DEFAULT '',
            timestamp_utc   TEXT NOT NULL,
            timestamp_local TEXT NOT NULL,
            date_local      TEXT NOT NULL,
            cached_at       TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS daily_activity (
            user_id            INTEGER NOT NULL REFERENCES users(id),
            date_local         TEXT NOT NULL,
            state              TEXT NOT NULL
                CHECK(state IN ('not_sent','sent_in_time','sent_outside_time')),
            count_in_time      INTEGER NOT NULL DEFAULT 0 CHECK(count_in_time >= 0),
            count_outside_time INTEGER NOT NULL DEFAULT 0 CHECK(count_outside_time >= 0),
            PRIMARY KEY (user_id, date_local)
        );

        CREATE TABLE IF NOT EXISTS summaries (
            user_id                 INTEGER NOT NULL REFERENCES users(id),
            period_start            TEXT NOT NULL,
            period_end              TEXT NOT NULL,
            total_days_in_time      INTEGER NOT NULL DEFAULT 0,
            total_days_outside_time INTEGER NOT NULL DEFAULT 0,
            total_days_not_sent     INTEGER NOT NULL DEFAULT 0,
            total_prs_in_time       INTEGER NOT NULL DEFAULT 0,
            total_prs_outside_time  INTEGER NOT NULL DEFAULT 0,
            generated_at            TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (user_id, period_start, period_end)
        );

        CREATE TABLE IF NOT EXISTS cache_metadata (
            key        TEXT PRIMARY KEY,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_pr_user_date ON pull_requests(user_id, date_local);
        CREATE INDEX IF NOT EXISTS idx_pr_date_local ON pull_requests(date_local);
        CREATE INDEX IF NOT EXISTS idx_activity_date ON daily_activity(date_local);
        "#,
    )?;
    Ok(())
}

fn stored_version(conn: &Connection) -> Result<i64> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM cache_metadata WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(v.and_then(|s| s.parse().ok()).unwrap_or(0))
}

/// Version 1 stored the activity state as its display label.
fn migrate_state_labels(conn: &Connection) -> Result<()> {
    let legacy: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master
         WHERE type = 'table' AND name = 'daily_activity' AND sql LIKE '%Sent In Time%'",
        [],
        |row| row.get(0),
    )?;

    if legacy == 0 {
        return Ok(());
    }

    info!("Migrating daily_activity state labels to codes...");

    conn.execute_batch(
        r#"
        ALTER TABLE daily_activity RENAME TO daily_activity_old;

        CREATE TABLE daily_activity (
            user_id            INTEGER NOT NULL REFERENCES users(id),
            date_local         TEXT NOT NULL,
            state              TEXT NOT NULL
                CHECK(state IN ('not_sent','sent_in_time','sent_outside_time')),
            count_in_time      INTEGER NOT NULL DEFAULT 0 CHECK(count_in_time >= 0),
            count_outside_time INTEGER NOT NULL DEFAULT 0 CHECK(count_outside_time >= 0),
            PRIMARY KEY (user_id, date_local)
        );

        INSERT INTO daily_activity (user_id, date_local, state, count_in_time, count_outside_time)
        SELECT user_id, date_local,
               CASE state
                   WHEN 'Sent In Time' THEN 'sent_in_time'
                   WHEN 'Sent Outside Time' THEN 'sent_outside_time'
                   ELSE 'not_sent'
               END,
               count_in_time, count_outside_time
        FROM daily_activity_old;

        DROP TABLE daily_activity_old;

        CREATE INDEX IF NOT EXISTS idx_activity_date ON daily_activity(date_local);
        "#,
    )?;

    Ok(())
}

/// Version 1 stored `timestamp_local` with its UTC offset and fractional
/// seconds (`2024-03-01T09:00:00.123-05:00`) and allowed a NULL title.
/// Keep the wall-clock part only; the first 19 characters are exactly
/// `%Y-%m-%dT%H:%M:%S`.
fn migrate_event_timestamps(conn: &Connection) -> Result<()> {
    let rewritten = conn.execute(
        "UPDATE pull_requests
         SET timestamp_local = substr(timestamp_local, 1, 19)
         WHERE length(timestamp_local) > 19",
        [],
    )?;
    conn.execute(
        "UPDATE pull_requests SET title = '' WHERE title IS NULL",
        [],
    )?;

    if rewritten > 0 {
        info!("Normalized local timestamps of {rewritten} cached pull requests");
    }
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    create_schema(conn)?;

    let version = stored_version(conn)?;
    if version >= SCHEMA_VERSION {
        return Ok(());
    }

    // The version is recorded in the same transaction as the upgrade steps.
    let tx = conn.unchecked_transaction()?;
    migrate_state_labels(&tx)?;
    migrate_event_timestamps(&tx)?;
    tx.execute(
        "INSERT INTO cache_metadata (key, value) VALUES ('schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        [SCHEMA_VERSION.to_string()],
    )?;
    tx.commit()?;

    debug!("Database schema at version {SCHEMA_VERSION}");
    Ok(())
}
