// src/export/logic.rs

use crate::config::Settings;
use crate::core::classifier;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::AppResult;
use crate::export::console;
use crate::export::fs_utils::{report_path, save_report};
use crate::export::model::{ConfigExport, FullReport, PeriodExport};
use crate::export::render;
use crate::utils::date::DateRange;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use tracing::info;

/// High level report generation from the persisted analysis.
pub struct ReportLogic;

impl ReportLogic {
    /// Render and save every report for `range`, then print the console
    /// summary. Returns the written paths.
    pub fn generate(
        pool: &mut DbPool,
        settings: &Settings,
        range: DateRange,
        prefix: &str,
        generated_at: DateTime<Local>,
    ) -> AppResult<Vec<PathBuf>> {
        info!("Generating reports...");
        let stamp = generated_at.format("%Y%m%d_%H%M%S").to_string();

        let daily = queries::list_daily_activity(&pool.conn, range.start(), range.end())?;
        let summaries = queries::list_summaries(&pool.conn, range.start(), range.end())?;
        let users = queries::list_entities(&pool.conn, false)?;

        let mut detailed = Vec::new();
        for entity in users.iter().filter(|u| u.included) {
            let days = classifier::breakdown_stored(&pool.conn, entity.id, range, settings.hours)?;
            detailed.extend(render::detailed_rows(entity, &days));
        }

        let daily_rows = render::daily_rows(&daily);
        let summary_rows = render::summary_rows(&summaries);

        let full = FullReport {
            period: PeriodExport {
                start: range.start().to_string(),
                end: range.end().to_string(),
            },
            config: ConfigExport {
                timezone: settings.timezone.name().to_string(),
                working_hours: settings.hours.label(),
            },
            daily_activities: daily_rows.clone(),
            summaries: summary_rows.clone(),
            users: render::user_rows(&users),
            generated_at: generated_at.to_rfc3339(),
        };

        let outputs = [
            (
                report_path(prefix, "daily", &stamp, "csv"),
                render::render_csv(&daily_rows)?,
                "Daily activity CSV",
            ),
            (
                report_path(prefix, "detailed", &stamp, "csv"),
                render::render_csv(&detailed)?,
                "Detailed PRs CSV",
            ),
            (
                report_path(prefix, "summary", &stamp, "csv"),
                render::render_csv(&summary_rows)?,
                "Summary CSV",
            ),
            (
                report_path(prefix, "users", &stamp, "csv"),
                render::render_users_csv(&users, &settings.filter)?,
                "Users CSV",
            ),
            (
                report_path(prefix, "full", &stamp, "json"),
                render::render_json(&full)?,
                "Full JSON",
            ),
        ];

        let mut written = Vec::new();
        for (path, content, label) in outputs {
            save_report(&path, &content, label)?;
            written.push(path);
        }

        console::print_summary(&summaries, range);

        info!("All reports generated successfully");
        Ok(written)
    }
}
