// src/export/render.rs

//! Pure renderers: rows in, report text out.

use crate::config::FilterRules;
use crate::core::classifier::DayBreakdown;
use crate::db::models::{EntityDailyRow, EntitySummaryRow};
use crate::errors::{AppError, AppResult};
use crate::export::model::{
    DailyActivityExport, DetailedPrExport, FullReport, SummaryExport, UserExport,
};
use crate::models::Entity;
use serde::Serialize;

const DISPLAY_TS_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub fn daily_rows(rows: &[EntityDailyRow]) -> Vec<DailyActivityExport> {
    rows.iter()
        .map(|r| DailyActivityExport {
            login: r.entity.login.clone(),
            email: r.entity.email_or_empty().to_string(),
            name: r.entity.name_or_empty().to_string(),
            date: r.activity.date_local.to_string(),
            state: r.activity.state.label().to_string(),
            count_in_time: r.activity.count_in_time,
            count_outside_time: r.activity.count_outside_time,
        })
        .collect()
}

pub fn summary_rows(rows: &[EntitySummaryRow]) -> Vec<SummaryExport> {
    rows.iter()
        .map(|r| SummaryExport {
            login: r.entity.login.clone(),
            email: r.entity.email_or_empty().to_string(),
            name: r.entity.name_or_empty().to_string(),
            total_days_in_time: r.summary.total_days_in_time,
            total_days_outside_time: r.summary.total_days_outside_time,
            total_days_not_sent: r.summary.total_days_not_sent,
            total_prs_in_time: r.summary.total_prs_in_time,
            total_prs_outside_time: r.summary.total_prs_outside_time,
            generated_at: r.generated_at.clone(),
        })
        .collect()
}

pub fn user_rows(users: &[Entity]) -> Vec<UserExport> {
    users
        .iter()
        .map(|u| UserExport {
            login: u.login.clone(),
            email: u.email_or_empty().to_string(),
            name: u.name_or_empty().to_string(),
            included: u.included,
        })
        .collect()
}

/// One row per pull request; days without any get a single `No PRs` row.
pub fn detailed_rows(entity: &Entity, days: &[DayBreakdown]) -> Vec<DetailedPrExport> {
    let mut out = Vec::new();

    for day in days {
        let date = day.activity.date_local.to_string();

        if day.events.is_empty() {
            out.push(DetailedPrExport {
                login: entity.login.clone(),
                name: entity.name_or_empty().to_string(),
                date,
                pr_title: "No PRs".to_string(),
                repository: String::new(),
                created_time_local: String::new(),
                created_time_utc: String::new(),
                is_in_working_hours: false,
            });
            continue;
        }

        for ce in &day.events {
            out.push(DetailedPrExport {
                login: entity.login.clone(),
                name: entity.name_or_empty().to_string(),
                date: date.clone(),
                pr_title: ce.event.title.clone(),
                repository: ce.event.repository.clone(),
                created_time_local: ce.event.timestamp_local.format(DISPLAY_TS_FMT).to_string(),
                created_time_utc: ce.event.timestamp_utc.format(DISPLAY_TS_FMT).to_string(),
                is_in_working_hours: ce.in_working_hours,
            });
        }
    }

    out
}

/// Serialize rows as CSV, header taken from the field names.
pub fn render_csv<T: Serialize>(rows: &[T]) -> AppResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for row in rows {
        wtr.serialize(row)?;
    }
    finish(wtr)
}

/// Filtering summary followed by the user list.
pub fn render_users_csv(users: &[Entity], rules: &FilterRules) -> AppResult<String> {
    let included = users.iter().filter(|u| u.included).count();
    let excluded = users.len() - included;
    let exclusion_list: Vec<&str> = rules.exclusion_set.iter().map(String::as_str).collect();
    let email_filter = if rules.email_suffix_filter.is_empty() {
        "None"
    } else {
        rules.email_suffix_filter.as_str()
    };

    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    wtr.write_record(["# User Filtering Summary"])?;
    wtr.write_record(["Total users", users.len().to_string().as_str()])?;
    wtr.write_record(["Included users", included.to_string().as_str()])?;
    wtr.write_record(["Excluded users", excluded.to_string().as_str()])?;
    wtr.write_record(["Exclusion list", exclusion_list.join(", ").as_str()])?;
    wtr.write_record(["Email filter", email_filter])?;
    wtr.write_record([""])?;

    wtr.write_record(["login", "email", "name", "included"])?;
    for u in user_rows(users) {
        wtr.write_record([
            u.login.as_str(),
            u.email.as_str(),
            u.name.as_str(),
            if u.included { "Yes" } else { "No" },
        ])?;
    }

    finish(wtr)
}

pub fn render_json(report: &FullReport) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> AppResult<String> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Export(format!("CSV flush error: {e}")))?;
    String::from_utf8(bytes).map_err(|e| AppError::Export(format!("CSV encoding error: {e}")))
}
