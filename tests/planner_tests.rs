mod common;
use common::date;
use prmonitor::core::planner::{FetchPlan, plan_fetch};
use prmonitor::errors::AppError;
use std::collections::BTreeSet;

fn covered(dates: &[&str]) -> BTreeSet<chrono::NaiveDate> {
    dates.iter().map(|d| date(d)).collect()
}

#[test]
fn test_empty_cache_fetches_whole_range() {
    let plan = plan_fetch(
        date("2024-03-01"),
        date("2024-03-07"),
        &BTreeSet::new(),
        date("2024-04-01"),
    )
    .unwrap();

    assert_eq!(
        plan,
        FetchPlan::Window {
            start: date("2024-03-01"),
            end: date("2024-03-07"),
            missing: 7,
        }
    );
}

#[test]
fn test_fully_cached_past_range_is_up_to_date() {
    let cache = covered(&["2024-03-01", "2024-03-02", "2024-03-03"]);
    let plan = plan_fetch(date("2024-03-01"), date("2024-03-03"), &cache, date("2024-03-10")).unwrap();

    assert_eq!(plan, FetchPlan::UpToDate);
    assert!(plan.window().is_none());
}

#[test]
fn test_today_is_always_refetched() {
    let cache = covered(&["2024-03-01", "2024-03-02", "2024-03-03"]);
    let plan = plan_fetch(date("2024-03-01"), date("2024-03-03"), &cache, date("2024-03-03")).unwrap();

    assert_eq!(
        plan,
        FetchPlan::Window {
            start: date("2024-03-03"),
            end: date("2024-03-03"),
            missing: 1,
        }
    );
}

#[test]
fn test_gaps_collapse_into_one_window() {
    // 02 and 05 missing: the window spans the cached 03 and 04 too.
    let cache = covered(&["2024-03-01", "2024-03-03", "2024-03-04", "2024-03-06"]);
    let plan = plan_fetch(date("2024-03-01"), date("2024-03-06"), &cache, date("2024-05-01")).unwrap();

    assert_eq!(
        plan,
        FetchPlan::Window {
            start: date("2024-03-02"),
            end: date("2024-03-05"),
            missing: 2,
        }
    );
    let window = plan.window().unwrap();
    assert_eq!(window.num_days(), 4);
}

#[test]
fn test_cached_dates_outside_range_do_not_count() {
    let cache = covered(&["2024-02-28", "2024-03-09"]);
    let plan = plan_fetch(date("2024-03-01"), date("2024-03-02"), &cache, date("2024-05-01")).unwrap();

    assert_eq!(
        plan.window().map(|w| (w.start(), w.end())),
        Some((date("2024-03-01"), date("2024-03-02")))
    );
}

#[test]
fn test_start_after_end_is_rejected() {
    let err = plan_fetch(
        date("2024-03-05"),
        date("2024-03-01"),
        &BTreeSet::new(),
        date("2024-03-05"),
    )
    .unwrap_err();

    assert!(matches!(err, AppError::InvalidRange { .. }));
}
