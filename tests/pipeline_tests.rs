mod common;
use common::{FakeSource, add_user, date, event, member, pool, remote, settings, settings_with_filter, store};
use prmonitor::core::pipeline::{FetchOutcome, MonitorLogic};
use prmonitor::db::queries;
use prmonitor::models::ActivityState;
use prmonitor::source::EventSource;
use prmonitor::utils::date::DateRange;

fn range(start: &str, end: &str) -> DateRange {
    DateRange::parse(start, end).unwrap()
}

#[test]
fn test_roster_sync_applies_filter() {
    let mut pool = pool();
    let source = FakeSource::with_roster(vec![
        member("alice", Some("alice@acme.io")),
        member("carol", Some("carol@gmail.com")),
        member("dave", None),
        member("bot", Some("bot@acme.io")),
    ]);
    let s = settings_with_filter("UTC", &["bot"], "@acme.io");

    let stats = MonitorLogic::sync_roster(&mut pool, &source, &s).unwrap();
    assert_eq!((stats.total, stats.included, stats.excluded), (4, 2, 2));
    assert!(!stats.from_cache);

    let included: Vec<_> = queries::list_entities(&pool.conn, true)
        .unwrap()
        .into_iter()
        .map(|e| e.login)
        .collect();
    assert_eq!(included, vec!["alice", "dave"]);
}

#[test]
fn test_fetch_requests_only_the_missing_window() {
    let mut pool = pool();
    let id = add_user(&pool, "alice", None);
    store(
        &mut pool,
        &[
            event("c1", id, "2024-03-01T10:00:00Z", "UTC"),
            event("c2", id, "2024-03-02T10:00:00Z", "UTC"),
        ],
    );
    let entity = queries::find_entity(&pool.conn, "alice").unwrap().unwrap();
    let source = FakeSource::default().events_for(
        "alice",
        vec![
            remote("n1", "2024-03-04T11:00:00Z"),
            // Outside the window: returned by the source, never persisted.
            remote("old", "2024-02-20T11:00:00Z"),
        ],
    );

    let outcome = MonitorLogic::fetch_entity(
        &mut pool,
        &source,
        &entity,
        range("2024-03-01", "2024-03-04"),
        date("2024-04-01"),
        &settings("UTC"),
    )
    .unwrap();

    assert_eq!(
        source.calls_for("alice"),
        vec![(date("2024-03-03"), date("2024-03-04"))]
    );
    assert_eq!(
        outcome,
        FetchOutcome::Fetched {
            window: range("2024-03-03", "2024-03-04"),
            events: 1,
        }
    );
    assert_eq!(queries::count_events(&pool.conn).unwrap(), 3);
}

#[test]
fn test_fully_cached_entity_is_not_fetched() {
    let mut pool = pool();
    let id = add_user(&pool, "alice", None);
    store(
        &mut pool,
        &[
            event("c1", id, "2024-03-01T10:00:00Z", "UTC"),
            event("c2", id, "2024-03-02T10:00:00Z", "UTC"),
        ],
    );
    let entity = queries::find_entity(&pool.conn, "alice").unwrap().unwrap();
    let source = FakeSource::default();

    let outcome = MonitorLogic::fetch_entity(
        &mut pool,
        &source,
        &entity,
        range("2024-03-01", "2024-03-02"),
        date("2024-04-01"),
        &settings("UTC"),
    )
    .unwrap();

    assert_eq!(outcome, FetchOutcome::UpToDate);
    assert!(source.calls_for("alice").is_empty());
}

#[test]
fn test_today_is_fetched_again() {
    let mut pool = pool();
    let id = add_user(&pool, "alice", None);
    store(&mut pool, &[event("c1", id, "2024-03-02T10:00:00Z", "UTC")]);
    let entity = queries::find_entity(&pool.conn, "alice").unwrap().unwrap();
    let source = FakeSource::default().events_for(
        "alice",
        vec![
            remote("c1", "2024-03-02T10:00:00Z"),
            remote("c2", "2024-03-02T15:00:00Z"),
        ],
    );

    MonitorLogic::fetch_entity(
        &mut pool,
        &source,
        &entity,
        range("2024-03-02", "2024-03-02"),
        date("2024-03-02"),
        &settings("UTC"),
    )
    .unwrap();

    assert_eq!(source.calls_for("alice").len(), 1);
    assert_eq!(queries::count_events(&pool.conn).unwrap(), 2);
}

#[test]
fn test_failing_entity_is_skipped_and_analyzed_from_cache() {
    let mut pool = pool();
    let source = FakeSource::with_roster(vec![member("alice", None), member("bob", None)])
        .events_for("alice", vec![remote("a1", "2024-03-01T10:00:00Z")])
        .failing_for("bob");

    // bob already has one cached PR from an earlier run.
    let bob = add_user(&pool, "bob", None);
    store(&mut pool, &[event("b0", bob, "2024-03-02T20:00:00Z", "UTC")]);

    let period = range("2024-03-01", "2024-03-03");
    let report = MonitorLogic::run(
        &mut pool,
        Some(&source as &dyn EventSource),
        &settings("UTC"),
        period,
        date("2024-04-01"),
    )
    .unwrap();

    assert_eq!(report.entities, 2);
    assert_eq!(report.fetched, 1);
    assert_eq!(report.failed, vec!["bob".to_string()]);
    assert_eq!(report.events_cached, 1);
    assert_eq!(report.summaries.len(), 2);

    let rows = queries::list_summaries(&pool.conn, period.start(), period.end()).unwrap();
    let bob_summary = rows.iter().find(|r| r.entity.login == "bob").unwrap();
    assert_eq!(bob_summary.summary.total_days_outside_time, 1);
    assert_eq!(bob_summary.summary.total_days_not_sent, 2);

    let alice_days = queries::list_daily_activity(&pool.conn, period.start(), period.end())
        .unwrap()
        .into_iter()
        .filter(|r| r.entity.login == "alice")
        .map(|r| r.activity.state)
        .collect::<Vec<_>>();
    assert_eq!(
        alice_days,
        vec![
            ActivityState::SentInTime,
            ActivityState::NotSent,
            ActivityState::NotSent
        ]
    );
}

#[test]
fn test_rerun_converges() {
    let mut pool = pool();
    let source = FakeSource::with_roster(vec![member("alice", None)]).events_for(
        "alice",
        vec![
            remote("a1", "2024-03-01T10:00:00Z"),
            remote("a2", "2024-03-01T22:00:00Z"),
        ],
    );
    let period = range("2024-03-01", "2024-03-02");

    for _ in 0..2 {
        MonitorLogic::run(
            &mut pool,
            Some(&source as &dyn EventSource),
            &settings("UTC"),
            period,
            date("2024-04-01"),
        )
        .unwrap();
    }

    assert_eq!(queries::count_events(&pool.conn).unwrap(), 2);
    assert_eq!(
        queries::list_daily_activity(&pool.conn, period.start(), period.end())
            .unwrap()
            .len(),
        2
    );
    let summaries = queries::list_summaries(&pool.conn, period.start(), period.end()).unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].summary.total_prs_in_time, 1);
    assert_eq!(summaries[0].summary.total_prs_outside_time, 1);

    // Second run found 2024-03-01 cached and refetched only the empty day.
    let calls = source.calls_for("alice");
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1], (date("2024-03-02"), date("2024-03-02")));
}

#[test]
fn test_roster_outage_falls_back_to_stored_users() {
    let mut pool = pool();
    add_user(&pool, "alice", Some("alice@acme.io"));
    add_user(&pool, "carol", Some("carol@gmail.com"));

    let source = FakeSource {
        roster_down: true,
        ..FakeSource::default()
    };
    let s = settings_with_filter("UTC", &[], "@acme.io");

    let report = MonitorLogic::run(
        &mut pool,
        Some(&source as &dyn EventSource),
        &s,
        range("2024-03-01", "2024-03-01"),
        date("2024-04-01"),
    )
    .unwrap();

    assert!(report.roster.from_cache);
    assert_eq!(report.roster.excluded, 1);
    assert_eq!(report.entities, 1);
    assert_eq!(source.calls_for("alice").len(), 1);
    assert!(source.calls_for("carol").is_empty());
}

#[test]
fn test_offline_run_uses_cache_only() {
    let mut pool = pool();
    let id = add_user(&pool, "alice", None);
    store(&mut pool, &[event("a1", id, "2024-03-01T12:00:00Z", "UTC")]);

    let report = MonitorLogic::run(
        &mut pool,
        None,
        &settings("UTC"),
        range("2024-03-01", "2024-03-02"),
        date("2024-04-01"),
    )
    .unwrap();

    assert_eq!(report.entities, 1);
    assert_eq!(report.fetched + report.up_to_date, 0);
    assert_eq!(report.summaries[0].total_days_in_time, 1);
    assert_eq!(report.summaries[0].total_days_not_sent, 1);
}
