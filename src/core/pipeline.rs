//! One analysis run: roster → per entity (plan → fetch → persist → classify
//! → aggregate). Entities are processed one at a time; a source failure of
//! one entity never aborts the run, a persistence failure always does.

use crate::config::Settings;
use crate::core::classifier;
use crate::core::coverage::covered_dates;
use crate::core::filter::{should_include, should_include_entity};
use crate::core::planner::{FetchPlan, plan_fetch};
use crate::core::timezone::reconcile_timezone;
use crate::core::aggregator::summarize;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::AppResult;
use crate::models::{DailyActivity, Entity, Event, PeriodSummary};
use crate::source::EventSource;
use crate::utils::date::DateRange;
use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterStats {
    pub total: usize,
    pub included: usize,
    pub excluded: usize,
    /// The remote roster was unavailable; stored users were re-filtered.
    pub from_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    UpToDate,
    Fetched { window: DateRange, events: usize },
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub roster: RosterStats,
    pub entities: usize,
    pub fetched: usize,
    pub up_to_date: usize,
    pub failed: Vec<String>,
    pub events_cached: usize,
    pub summaries: Vec<PeriodSummary>,
}

pub struct MonitorLogic;

impl MonitorLogic {
    /// Fetch the roster and upsert every member with a freshly computed
    /// `included` flag. Events of excluded members are kept.
    pub fn sync_roster(
        pool: &mut DbPool,
        source: &dyn EventSource,
        settings: &Settings,
    ) -> AppResult<RosterStats> {
        info!("Fetching team members...");
        let members = source.fetch_roster()?;

        let mut stats = RosterStats {
            total: members.len(),
            ..RosterStats::default()
        };

        for m in &members {
            let included = should_include(&m.login, m.email.as_deref(), &settings.filter);
            queries::upsert_entity(
                &pool.conn,
                &m.login,
                m.email.as_deref(),
                m.name.as_deref(),
                included,
            )?;
            if included {
                stats.included += 1;
            } else {
                stats.excluded += 1;
            }
        }

        info!(
            "Processed {} users: {} included, {} excluded",
            stats.total, stats.included, stats.excluded
        );
        Ok(stats)
    }

    /// Recompute `included` for the stored users from the current rules.
    pub fn refresh_inclusion(pool: &mut DbPool, settings: &Settings) -> AppResult<RosterStats> {
        let entities = queries::list_entities(&pool.conn, false)?;
        let mut stats = RosterStats {
            total: entities.len(),
            from_cache: true,
            ..RosterStats::default()
        };

        for entity in &entities {
            let included = should_include_entity(entity, &settings.filter);
            if included != entity.included {
                queries::set_included(&pool.conn, entity.id, included)?;
            }
            if included {
                stats.included += 1;
            } else {
                stats.excluded += 1;
            }
        }

        Ok(stats)
    }

    /// Bring the cache of one entity up to date for `range`.
    pub fn fetch_entity(
        pool: &mut DbPool,
        source: &dyn EventSource,
        entity: &Entity,
        range: DateRange,
        today: NaiveDate,
        settings: &Settings,
    ) -> AppResult<FetchOutcome> {
        let covered = covered_dates(&pool.conn, entity.id)?;
        let plan = plan_fetch(range.start(), range.end(), &covered, today)?;

        let FetchPlan::Window {
            start,
            end,
            missing,
        } = plan
        else {
            debug!("All data cached for {}", entity.login);
            return Ok(FetchOutcome::UpToDate);
        };

        let window = DateRange::new(start, end)?;
        debug!(
            "Fetching PRs for {} from {start} to {end} ({missing} missing date(s))",
            entity.login
        );

        let remote = match source.fetch_events(&entity.login, start, end) {
            Ok(events) => events,
            Err(e) if e.is_source_failure() => {
                error!("Failed to fetch PRs for {}: {e}", entity.login);
                return Ok(FetchOutcome::Failed(e.to_string()));
            }
            Err(e) => return Err(e),
        };

        let returned = remote.len();
        let batch: Vec<Event> = remote
            .into_iter()
            .map(|r| {
                Event::localized(
                    r.event_id,
                    entity.id,
                    r.repository,
                    r.title,
                    r.created_at_utc,
                    settings.timezone,
                )
            })
            .filter(|ev| window.contains(ev.date_local))
            .collect();

        if batch.len() < returned {
            debug!(
                "Dropped {} PRs of {} outside the fetch window",
                returned - batch.len(),
                entity.login
            );
        }

        let written = queries::upsert_events(&mut pool.conn, &batch)?;
        debug!("Cached {written} PRs for {}", entity.login);

        Ok(FetchOutcome::Fetched {
            window,
            events: written,
        })
    }

    /// Classify every date of `range` from the cache, persist the daily rows
    /// and the period summary.
    pub fn analyze_entity(
        pool: &mut DbPool,
        entity: &Entity,
        range: DateRange,
        settings: &Settings,
    ) -> AppResult<(Vec<DailyActivity>, PeriodSummary)> {
        let days: Vec<DailyActivity> =
            classifier::breakdown_stored(&pool.conn, entity.id, range, settings.hours)?
                .into_iter()
                .map(|d| d.activity)
                .collect();

        queries::upsert_daily_activities(&mut pool.conn, &days)?;

        let summary = summarize(entity.id, range, &days);
        queries::upsert_summary(&pool.conn, &summary)?;

        Ok((days, summary))
    }

    /// Full run. Without a source the run works offline on the cache.
    pub fn run(
        pool: &mut DbPool,
        source: Option<&dyn EventSource>,
        settings: &Settings,
        range: DateRange,
        today: NaiveDate,
    ) -> AppResult<RunReport> {
        info!(
            "Starting PR monitoring analysis for {} to {}",
            range.start(),
            range.end()
        );

        reconcile_timezone(&mut pool.conn, settings.timezone)?;

        let roster = match source {
            Some(src) => match Self::sync_roster(pool, src, settings) {
                Ok(stats) => stats,
                Err(e) if e.is_source_failure() => {
                    warn!("Roster unavailable ({e}); using stored users");
                    Self::refresh_inclusion(pool, settings)?
                }
                Err(e) => return Err(e),
            },
            None => Self::refresh_inclusion(pool, settings)?,
        };

        let entities = queries::list_entities(&pool.conn, true)?;
        let mut report = RunReport {
            roster,
            entities: entities.len(),
            ..RunReport::default()
        };

        info!("Analyzing {} users", entities.len());

        for entity in &entities {
            if let Some(src) = source {
                match Self::fetch_entity(pool, src, entity, range, today, settings)? {
                    FetchOutcome::UpToDate => report.up_to_date += 1,
                    FetchOutcome::Fetched { events, .. } => {
                        report.fetched += 1;
                        report.events_cached += events;
                    }
                    FetchOutcome::Failed(_) => report.failed.push(entity.login.clone()),
                }
            }

            let (_, summary) = Self::analyze_entity(pool, entity, range, settings)?;
            report.summaries.push(summary);
        }

        info!(
            "Run completed: {} users, {} fetched, {} up to date, {} failed, {} PRs cached",
            report.entities,
            report.fetched,
            report.up_to_date,
            report.failed.len(),
            report.events_cached
        );
        Ok(report)
    }
}
