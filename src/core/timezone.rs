//! Keep cached local dates consistent with the configured timezone.

use crate::db::queries;
use crate::errors::AppResult;
use chrono_tz::Tz;
use rusqlite::Connection;
use tracing::{info, warn};

const TIMEZONE_KEY: &str = "timezone";

/// Re-derive `timestamp_local`/`date_local` of every cached event when the
/// configured timezone differs from the one the cache was built with.
///
/// Derived daily activity and summaries are dropped in that case; the next
/// analysis recomputes them. The rewrite, the cleanup and the new timezone
/// marker commit together, so a failure leaves the cache to be re-derived on
/// the next call. Returns `true` when the cache was rewritten.
pub fn reconcile_timezone(conn: &mut Connection, tz: Tz) -> AppResult<bool> {
    let configured = tz.name();
    let stored = queries::get_meta(conn, TIMEZONE_KEY)?;

    match stored.as_deref() {
        Some(name) if name == configured => return Ok(false),
        None if queries::count_events(conn)? == 0 => {
            queries::set_meta(conn, TIMEZONE_KEY, configured)?;
            return Ok(false);
        }
        None => {
            warn!("Cache has no recorded timezone; re-deriving local dates for {configured}");
        }
        Some(name) => {
            warn!("Timezone changed from {name} to {configured}; re-deriving local dates");
        }
    }

    let tx = conn.transaction()?;

    let mut events = queries::all_events(&tx)?;
    for ev in events.iter_mut() {
        ev.relocalize(tz);
    }

    queries::write_events(&tx, &events)?;
    queries::clear_derived(&tx)?;
    queries::set_meta(&tx, TIMEZONE_KEY, configured)?;
    tx.commit()?;

    info!("Re-derived local dates of {} cached events", events.len());
    Ok(true)
}
