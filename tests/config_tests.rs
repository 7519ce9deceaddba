use prmonitor::config::Config;
use prmonitor::errors::AppError;
use std::collections::HashMap;
use std::fs;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_defaults_need_remote_credentials() {
    let cfg = Config::default();
    assert_eq!(cfg.timezone, "UTC");
    assert_eq!((cfg.work_start_hour, cfg.work_end_hour), (9, 18));

    assert!(cfg.validate(false).is_empty());
    let problems = cfg.validate(true);
    assert_eq!(problems.len(), 3);
    assert!(problems.iter().any(|p| p.contains("GITHUB_TOKEN")));
}

#[test]
fn test_environment_overrides_file_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prmonitor.conf");
    fs::write(
        &path,
        "database: /tmp/pr.sqlite\norganization: acme\nteam: core\ntimezone: Europe/Rome\n",
    )
    .unwrap();

    let mut cfg = Config::load_file(&path).unwrap();
    assert_eq!(cfg.organization, "acme");
    assert_eq!(cfg.github_api_url, "https://api.github.com");

    cfg.apply_overrides(lookup(&[
        ("GITHUB_TOKEN", "t0ken"),
        ("GITHUB_TEAM", "platform"),
        ("WORK_START_HOUR", "8"),
        ("EXCLUSION_LIST", "bot, ,ci-user"),
        ("EMAIL_SUFFIX_FILTER", "@acme.io"),
    ]))
    .unwrap();

    assert_eq!(cfg.team, "platform");
    assert_eq!(cfg.work_start_hour, 8);
    assert!(cfg.validate(true).is_empty());

    let settings = cfg.settings().unwrap();
    assert_eq!(settings.timezone.name(), "Europe/Rome");
    assert_eq!(settings.hours.label(), "08:00-18:00");
    assert_eq!(
        settings.filter.exclusion_set.iter().collect::<Vec<_>>(),
        vec!["bot", "ci-user"]
    );
    assert_eq!(settings.filter.email_suffix_filter, "@acme.io");
}

#[test]
fn test_invalid_values_are_reported() {
    let mut cfg = Config::default();
    cfg.apply_overrides(lookup(&[
        ("PROJECT_TIMEZONE", "Mars/Olympus"),
        ("WORK_START_HOUR", "19"),
    ]))
    .unwrap();

    let problems = cfg.validate(false);
    assert!(problems.iter().any(|p| p.contains("Invalid timezone")));
    assert!(problems.iter().any(|p| p.contains("less than")));
    assert!(matches!(cfg.settings(), Err(AppError::Config(_))));
}

#[test]
fn test_non_numeric_hour_is_rejected() {
    let mut cfg = Config::default();
    let err = cfg
        .apply_overrides(lookup(&[("WORK_END_HOUR", "six")]))
        .unwrap_err();
    assert!(err.to_string().contains("WORK_END_HOUR"));
}
