//! Decide which dates of a requested range must be fetched again.

use crate::errors::AppResult;
use crate::utils::date::DateRange;
use chrono::NaiveDate;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    /// Every requested date is cached and none of them is today.
    UpToDate,
    /// One contiguous window covering all missing dates.
    Window {
        start: NaiveDate,
        end: NaiveDate,
        missing: usize,
    },
}

impl FetchPlan {
    pub fn window(&self) -> Option<DateRange> {
        match *self {
            FetchPlan::UpToDate => None,
            FetchPlan::Window { start, end, .. } => DateRange::new(start, end).ok(),
        }
    }
}

/// Plan the remote fetch for one entity.
///
/// A date is missing when it has no cached event, and `today` is always
/// missing when it lies inside the requested range. Missing dates collapse
/// into the single window `[min, max]`; cached interior dates are fetched
/// again and upserted.
pub fn plan_fetch(
    requested_start: NaiveDate,
    requested_end: NaiveDate,
    covered: &BTreeSet<NaiveDate>,
    today: NaiveDate,
) -> AppResult<FetchPlan> {
    let requested = DateRange::new(requested_start, requested_end)?;

    let mut missing = requested
        .days()
        .filter(|d| *d == today || !covered.contains(d));

    let Some(first) = missing.next() else {
        return Ok(FetchPlan::UpToDate);
    };

    let (last, count) = missing.fold((first, 1), |(_, n), d| (d, n + 1));

    Ok(FetchPlan::Window {
        start: first,
        end: last,
        missing: count,
    })
}
