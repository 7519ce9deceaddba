use crate::cli::parser::{Commands, PeriodArgs};
use crate::config::Config;
use crate::core::clock::today_in;
use crate::core::pipeline::{MonitorLogic, RunReport};
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::export::ReportLogic;
use crate::source::GitHubClient;
use crate::ui::messages::{header, info, warning};
use crate::utils::date::{DateRange, parse_date};
use chrono::{Local, NaiveDate};

/// Days analysed when `--start-date` is omitted.
const DEFAULT_LOOKBACK_DAYS: u64 = 7;

/// Handle the `run` command: full pipeline against the remote source.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Run { period } = cmd {
        let settings = cfg.settings()?;
        let today = today_in(settings.timezone);
        let range = resolve_range(period, today)?;

        let problems = cfg.validate(true);
        if !problems.is_empty() {
            return Err(AppError::Config(problems.join("; ")));
        }

        let client = GitHubClient::new(
            &cfg.github_token,
            &cfg.github_api_url,
            &cfg.organization,
            &cfg.team,
        )?;
        let mut pool = DbPool::new(&cfg.database)?;

        header(format!(
            "PR monitoring {} → {} ({}, {})",
            range.start(),
            range.end(),
            settings.timezone.name(),
            settings.hours.label()
        ));

        let report = MonitorLogic::run(&mut pool, Some(&client), &settings, range, today)?;
        print_run_report(&report);

        ReportLogic::generate(&mut pool, &settings, range, &period.output_prefix, Local::now())?;
    }

    Ok(())
}

/// Resolve the analysis period; defaults are relative to `today`.
pub(crate) fn resolve_range(period: &PeriodArgs, today: NaiveDate) -> AppResult<DateRange> {
    let end = match &period.end_date {
        Some(s) => parse_date(s)?,
        None => today,
    };
    let start = match &period.start_date {
        Some(s) => parse_date(s)?,
        None => DateRange::last_days(today, DEFAULT_LOOKBACK_DAYS).start(),
    };

    DateRange::new(start, end)
}

fn print_run_report(report: &RunReport) {
    if report.roster.from_cache {
        warning("Team roster unavailable, stored users were used");
    }

    info(format!(
        "{} users analyzed ({} excluded), {} fetched, {} up to date, {} PRs cached",
        report.entities,
        report.roster.excluded,
        report.fetched,
        report.up_to_date,
        report.events_cached
    ));

    if !report.failed.is_empty() {
        warning(format!(
            "Fetch failed for {} user(s), cached data used: {}",
            report.failed.len(),
            report.failed.join(", ")
        ));
    }
}
