//! Cache coverage: the dates for which an entity's events are already known.
//!
//! Coverage is always derived from the stored events (distinct `date_local`),
//! there is no bookkeeping table that could drift from them.

use crate::db::queries;
use crate::errors::AppResult;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::collections::BTreeSet;

pub fn covered_dates(conn: &Connection, entity_id: i64) -> AppResult<BTreeSet<NaiveDate>> {
    let dates = queries::distinct_event_dates(conn, entity_id)?;
    Ok(dates.into_iter().collect())
}
