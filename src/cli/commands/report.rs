use crate::cli::commands::run::resolve_range;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::clock::today_in;
use crate::core::pipeline::MonitorLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::ReportLogic;
use crate::ui::messages::{header, info};
use chrono::Local;

/// Handle the `report` command: analysis from the local cache only.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Report { period } = cmd {
        let settings = cfg.settings()?;
        let today = today_in(settings.timezone);
        let range = resolve_range(period, today)?;

        let mut pool = DbPool::new(&cfg.database)?;

        header(format!(
            "PR report {} → {} (offline)",
            range.start(),
            range.end()
        ));

        let report = MonitorLogic::run(&mut pool, None, &settings, range, today)?;
        info(format!("{} users analyzed from cache", report.entities));

        ReportLogic::generate(&mut pool, &settings, range, &period.output_prefix, Local::now())?;
    }

    Ok(())
}
