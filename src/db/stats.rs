use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, RESET, YELLOW, dimmed_or};
use chrono::NaiveDate;
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) USERS
    //
    let (users, included): (i64, i64) = pool.conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(included_flag), 0) FROM users",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    println!(
        "{}• Users:{} {}{}{} ({} included)",
        CYAN, RESET, GREEN, users, RESET, included
    );

    //
    // 3) CACHED PULL REQUESTS
    //
    let count: i64 = pool
        .conn
        .query_row("SELECT COUNT(*) FROM pull_requests", [], |row| row.get(0))?;
    println!(
        "{}• Cached pull requests:{} {}{}{}",
        CYAN, RESET, GREEN, count, RESET
    );

    //
    // 4) DATE RANGE
    //
    let (first_date, last_date): (Option<String>, Option<String>) = pool.conn.query_row(
        "SELECT MIN(date_local), MAX(date_local) FROM pull_requests",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let fmt_first = dimmed_or(first_date.as_deref());
    let fmt_last = dimmed_or(last_date.as_deref());

    println!("{}• Cached dates:{}", CYAN, RESET);
    println!("    from: {}", fmt_first);
    println!("    to:   {}", fmt_last);

    //
    // 5) AVERAGE PRS/DAY
    //
    if let (Some(f), Some(l)) = (first_date, last_date) {
        let d1 = parse_date(&f)?;
        let d2 = parse_date(&l)?;
        let days = (d2 - d1).num_days() + 1;

        let avg = count as f64 / days as f64;
        println!("{}• Average pull requests/day:{} {:.2}", CYAN, RESET, avg);
    }

    //
    // 6) TIMEZONE OF THE CACHE
    //
    let tz: Option<String> = pool
        .conn
        .query_row(
            "SELECT value FROM cache_metadata WHERE key = 'timezone'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    println!(
        "{}• Cache timezone:{} {}",
        CYAN,
        RESET,
        dimmed_or(tz)
    );

    println!();
    Ok(())
}

fn parse_date(date_str: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}
