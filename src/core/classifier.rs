//! Per-day classification of pull requests against the working-hours window.

use crate::config::WorkingHours;
use crate::db::queries;
use crate::errors::AppResult;
use crate::models::{ActivityState, DailyActivity, Event};
use crate::utils::date::DateRange;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayClassification {
    pub state: ActivityState,
    pub count_in_time: i64,
    pub count_outside_time: i64,
}

/// An event together with its in/out-of-hours verdict.
#[derive(Debug, Clone)]
pub struct ClassifiedEvent {
    pub event: Event,
    pub in_working_hours: bool,
}

/// One day of the analysed range with the events that produced it.
#[derive(Debug, Clone)]
pub struct DayBreakdown {
    pub activity: DailyActivity,
    pub events: Vec<ClassifiedEvent>,
}

/// Classify the events of one local day.
///
/// Any in-hours event makes the day `SentInTime`; a day with only
/// out-of-hours events is `SentOutsideTime`; no events is `NotSent`.
pub fn classify_day(events: &[Event], hours: WorkingHours) -> DayClassification {
    let count_in_time = events
        .iter()
        .filter(|ev| hours.contains(ev.timestamp_local))
        .count() as i64;
    let count_outside_time = events.len() as i64 - count_in_time;

    DayClassification {
        state: ActivityState::from_counts(count_in_time, count_outside_time),
        count_in_time,
        count_outside_time,
    }
}

/// Break `range` down day by day.
///
/// Exactly one entry per date, ascending, whether or not the date has
/// events. Events whose local date is outside `range` are ignored.
pub fn breakdown_range(
    entity_id: i64,
    events: &[Event],
    range: DateRange,
    hours: WorkingHours,
) -> Vec<DayBreakdown> {
    let mut by_date: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();
    for ev in events.iter().filter(|ev| range.contains(ev.date_local)) {
        by_date.entry(ev.date_local).or_default().push(ev.clone());
    }

    range
        .days()
        .map(|date| {
            let mut day_events = by_date.remove(&date).unwrap_or_default();
            day_events.sort_by(|a, b| a.timestamp_utc.cmp(&b.timestamp_utc));

            let c = classify_day(&day_events, hours);
            let activity = DailyActivity {
                entity_id,
                date_local: date,
                state: c.state,
                count_in_time: c.count_in_time,
                count_outside_time: c.count_outside_time,
            };

            let events = day_events
                .into_iter()
                .map(|event| ClassifiedEvent {
                    in_working_hours: hours.contains(event.timestamp_local),
                    event,
                })
                .collect();

            DayBreakdown { activity, events }
        })
        .collect()
}

/// Daily activity for every date of `range`, ascending, without gaps.
pub fn analyze_range(
    entity_id: i64,
    events: &[Event],
    range: DateRange,
    hours: WorkingHours,
) -> Vec<DailyActivity> {
    breakdown_range(entity_id, events, range, hours)
        .into_iter()
        .map(|day| day.activity)
        .collect()
}

/// Read the cached events of an entity for `range` and break them down.
pub fn breakdown_stored(
    conn: &Connection,
    entity_id: i64,
    range: DateRange,
    hours: WorkingHours,
) -> AppResult<Vec<DayBreakdown>> {
    let events = queries::events_in_range(conn, entity_id, range.start(), range.end())?;
    Ok(breakdown_range(entity_id, &events, range, hours))
}
