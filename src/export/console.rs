// src/export/console.rs

use crate::db::models::EntitySummaryRow;
use crate::utils::date::DateRange;
use crate::utils::table::{Column, Table};
use ansi_term::Style;

/// Plain-text summary of a period, one line per user plus totals.
pub fn render_summary(summaries: &[EntitySummaryRow], period: DateRange) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    out.push_str(&format!(
        "{rule}\nPR ACTIVITY SUMMARY ({} to {})\n{rule}\n",
        period.start(),
        period.end()
    ));

    if summaries.is_empty() {
        out.push_str("No data available for the specified period.\n");
        return out;
    }

    let mut table = Table::new(vec![
        Column::new("User", 24),
        Column::new("In Time", 8),
        Column::new("Outside", 8),
        Column::new("Not Sent", 8),
        Column::new("Total PRs", 10),
    ]);

    let (mut in_time, mut outside, mut not_sent, mut prs, mut user_days) = (0, 0, 0, 0, 0);

    for row in summaries {
        let s = &row.summary;
        table.add_row(vec![
            row.entity.login.clone(),
            s.total_days_in_time.to_string(),
            s.total_days_outside_time.to_string(),
            s.total_days_not_sent.to_string(),
            s.total_prs().to_string(),
        ]);

        in_time += s.total_days_in_time;
        outside += s.total_days_outside_time;
        not_sent += s.total_days_not_sent;
        prs += s.total_prs();
        user_days += s.total_days();
    }

    let dash = "-".repeat(60);
    out.push_str(&table.render_header());
    out.push('\n');
    out.push_str(&dash);
    out.push('\n');
    for r in &table.rows {
        out.push_str(&table.render_row(r));
        out.push('\n');
    }
    out.push_str(&dash);
    out.push('\n');
    out.push_str(&table.render_row(&[
        "TOTAL".to_string(),
        in_time.to_string(),
        outside.to_string(),
        not_sent.to_string(),
        prs.to_string(),
    ]));
    out.push('\n');

    let users = summaries.len() as f64;
    let in_time_pct = if user_days > 0 {
        in_time as f64 / user_days as f64 * 100.0
    } else {
        0.0
    };

    out.push_str("\nStatistics:\n");
    out.push_str(&format!("- Users analyzed: {}\n", summaries.len()));
    out.push_str(&format!("- Days with in-time activity: {in_time_pct:.1}%\n"));
    out.push_str(&format!("- Total PRs created: {prs}\n"));
    out.push_str(&format!(
        "- Average PRs per user: {:.1}\n",
        prs as f64 / users
    ));

    out
}

pub fn print_summary(summaries: &[EntitySummaryRow], period: DateRange) {
    let text = render_summary(summaries, period);
    println!();
    for line in text.lines() {
        if line.starts_with("PR ACTIVITY") || line.starts_with("TOTAL") {
            println!("{}", Style::new().bold().paint(line));
        } else {
            println!("{line}");
        }
    }
}
