//! Environment overrides for the guide configuration.

mod support;

use guide_timeline::api::{GuideConfig, GuideError};

const ALL_KEYS: [&str; 5] = [
    "GUIDE_PAST_DAYS",
    "GUIDE_BOOST_INTERVAL_MS",
    "GUIDE_STEADY_INTERVAL_MS",
    "GUIDE_BOOST_THRESHOLD",
    "GUIDE_IMMEDIATE_RUN_WAIT_MS",
];

fn cleared() -> Vec<(&'static str, Option<&'static str>)> {
    ALL_KEYS.iter().map(|k| (*k, None)).collect()
}

#[test]
fn test_from_env_without_variables_is_default() {
    support::with_scoped_env(&cleared(), || {
        assert_eq!(GuideConfig::from_env().unwrap(), GuideConfig::default());
    });
}

#[test]
fn test_from_env_overrides() {
    let mut env = cleared();
    env.extend([
        ("GUIDE_PAST_DAYS", Some("7")),
        ("GUIDE_BOOST_INTERVAL_MS", Some("200")),
        ("GUIDE_STEADY_INTERVAL_MS", Some(" 800 ")),
        ("GUIDE_BOOST_THRESHOLD", Some("2")),
        ("GUIDE_IMMEDIATE_RUN_WAIT_MS", Some("30")),
    ]);

    support::with_scoped_env(&env, || {
        let config = GuideConfig::from_env().unwrap();
        assert_eq!(config.timeline.past_days_to_display, 7);
        assert_eq!(config.worker.boost_interval_ms, 200);
        assert_eq!(config.worker.steady_interval_ms, 800);
        assert_eq!(config.worker.boost_threshold, 2);
        assert_eq!(config.worker.immediate_run_wait_ms, 30);
    });
}

#[test]
fn test_env_overrides_apply_on_top_of_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guide.toml");
    std::fs::write(
        &path,
        "[timeline]\npast_days_to_display = 3\n\n[worker]\nboost_threshold = 9\n",
    )
    .unwrap();

    let mut env = cleared();
    env.push(("GUIDE_PAST_DAYS", Some("5")));

    support::with_scoped_env(&env, || {
        let config = GuideConfig::from_file(&path)
            .unwrap()
            .with_env_overrides()
            .unwrap();
        assert_eq!(config.timeline.past_days_to_display, 5);
        assert_eq!(config.worker.boost_threshold, 9);
    });
}

#[test]
fn test_invalid_number_is_configuration_error() {
    let mut env = cleared();
    env.push(("GUIDE_BOOST_THRESHOLD", Some("many")));

    support::with_scoped_env(&env, || {
        let err = GuideConfig::from_env().unwrap_err();
        assert!(matches!(err, GuideError::ConfigurationError { .. }));
        assert!(err.to_string().contains("GUIDE_BOOST_THRESHOLD"));
        assert_eq!(err.context().details.as_deref(), Some("many"));
    });
}

#[test]
fn test_overrides_are_validated() {
    let mut env = cleared();
    env.push(("GUIDE_STEADY_INTERVAL_MS", Some("10")));

    support::with_scoped_env(&env, || {
        assert!(GuideConfig::from_env().is_err());
    });
}

#[test]
fn test_past_days_override_is_bounded() {
    let mut env = cleared();
    env.push(("GUIDE_PAST_DAYS", Some("4000000000")));

    support::with_scoped_env(&env, || {
        let err = GuideConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("past_days_to_display"));
    });
}

#[test]
fn test_shipped_config_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/guide.toml");
    let config = GuideConfig::from_file(path).unwrap();
    assert_eq!(config, GuideConfig::default());
}
