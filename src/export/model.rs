// src/export/model.rs

use serde::Serialize;

/// Flat row of the daily activity report.
#[derive(Serialize, Clone, Debug)]
pub struct DailyActivityExport {
    pub login: String,
    pub email: String,
    pub name: String,
    pub date: String,
    pub state: String,
    pub count_in_time: i64,
    pub count_outside_time: i64,
}

/// Flat row of the detailed report: one pull request, or a `No PRs` day.
#[derive(Serialize, Clone, Debug)]
pub struct DetailedPrExport {
    pub login: String,
    pub name: String,
    pub date: String,
    pub pr_title: String,
    pub repository: String,
    pub created_time_local: String,
    pub created_time_utc: String,
    pub is_in_working_hours: bool,
}

/// Flat row of the summary report.
#[derive(Serialize, Clone, Debug)]
pub struct SummaryExport {
    pub login: String,
    pub email: String,
    pub name: String,
    pub total_days_in_time: i64,
    pub total_days_outside_time: i64,
    pub total_days_not_sent: i64,
    pub total_prs_in_time: i64,
    pub total_prs_outside_time: i64,
    pub generated_at: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct UserExport {
    pub login: String,
    pub email: String,
    pub name: String,
    pub included: bool,
}

#[derive(Serialize, Clone, Debug)]
pub struct PeriodExport {
    pub start: String,
    pub end: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct ConfigExport {
    pub timezone: String,
    pub working_hours: String,
}

/// Everything in one JSON document.
#[derive(Serialize, Clone, Debug)]
pub struct FullReport {
    pub period: PeriodExport,
    pub config: ConfigExport,
    pub daily_activities: Vec<DailyActivityExport>,
    pub summaries: Vec<SummaryExport>,
    pub users: Vec<UserExport>,
    pub generated_at: String,
}
