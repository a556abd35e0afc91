//! Tests for configuration validation

use std::collections::HashMap;
use std::time::Duration;

use capacity_gate::config::{ControllerConfig, parse_ceiling};
use capacity_gate::core::{AdmissionError, ExecutionStatus};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_controller_config_defaults() {
    let config = ControllerConfig::new(10);
    assert!(config.validate().is_ok());
    assert_eq!(config.limits().query_timeout, Duration::from_secs(5));
    assert_eq!(config.limits().count_statuses, vec![ExecutionStatus::Running]);
    assert_eq!(config.refresh_interval(), None);
}

#[test]
fn test_controller_config_invalid_ceiling() {
    assert!(ControllerConfig::new(0).validate().is_err());
}

#[test]
fn test_controller_config_invalid_page_size() {
    let mut config = ControllerConfig::new(10);
    config.page_size = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_controller_config_invalid_timeout() {
    let mut config = ControllerConfig::new(10);
    config.query_timeout_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_controller_config_invalid_refresh() {
    let mut config = ControllerConfig::new(10);
    config.ceiling_refresh_secs = Some(0);
    assert!(config.validate().is_err());
}

#[test]
fn test_controller_config_from_json() {
    let json = r#"{
        "name": "orders",
        "ceiling": 100,
        "query_timeout_ms": 2000,
        "count_statuses": ["running", "pending"],
        "ceiling_refresh_secs": 60
    }"#;

    let config = ControllerConfig::from_json_str(json).unwrap();
    assert_eq!(config.name, "orders");
    assert_eq!(config.ceiling, 100);
    assert_eq!(config.page_size, 1000);
    assert_eq!(config.limits().query_timeout, Duration::from_millis(2000));
    assert_eq!(config.refresh_interval(), Some(Duration::from_secs(60)));
}

#[test]
fn test_controller_config_json_rejects_string_ceiling() {
    let err = ControllerConfig::from_json_str(r#"{ "ceiling": "100" }"#).unwrap_err();
    assert!(matches!(err, AdmissionError::Config(_)));
}

#[test]
fn test_controller_config_json_rejects_missing_and_negative() {
    assert!(ControllerConfig::from_json_str(r#"{ "name": "x" }"#).is_err());
    assert!(ControllerConfig::from_json_str(r#"{ "ceiling": -3 }"#).is_err());
    assert!(ControllerConfig::from_json_str(r#"{ "ceiling": 2.5 }"#).is_err());
    assert!(ControllerConfig::from_json_str(r#"{ "ceiling": 0 }"#).is_err());
}

#[test]
fn test_controller_config_json_rejects_unknown_fields() {
    assert!(ControllerConfig::from_json_str(r#"{ "ceiling": 3, "max_units": 5 }"#).is_err());
}

#[test]
fn test_controller_config_from_file() {
    let path = std::env::temp_dir().join(format!("capacity-gate-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "ceiling": 12 }"#).unwrap();
    let config = ControllerConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config.ceiling, 12);

    assert!(ControllerConfig::from_json_file(&path).is_err());
}

#[test]
fn test_controller_config_from_lookup() {
    let config = ControllerConfig::from_lookup(lookup(&[
        ("MAX_QUEUE_CAPACITY", " 25 "),
        ("ADMISSION_CONTROLLER_NAME", "orders"),
        ("ADMISSION_PAGE_SIZE", "200"),
        ("ADMISSION_MAX_PAGES", "8"),
        ("ADMISSION_QUERY_TIMEOUT_MS", "750"),
        ("ADMISSION_COUNT_STATUSES", "RUNNING, Scheduled"),
        ("ADMISSION_CEILING_REFRESH_SECS", "30"),
    ]))
    .unwrap();

    assert_eq!(config.ceiling, 25);
    assert_eq!(config.name, "orders");
    assert_eq!(config.page_size, 200);
    assert_eq!(config.max_pages, 8);
    assert_eq!(config.query_timeout_ms, 750);
    assert_eq!(
        config.count_statuses,
        vec![ExecutionStatus::Running, ExecutionStatus::Scheduled]
    );
    assert_eq!(config.ceiling_refresh_secs, Some(30));
}

#[test]
fn test_controller_config_from_lookup_requires_ceiling() {
    let err = ControllerConfig::from_lookup(lookup(&[])).unwrap_err();
    assert_eq!(err, AdmissionError::Config("MAX_QUEUE_CAPACITY is not set".to_string()));
}

#[test]
fn test_controller_config_from_lookup_rejects_signed_limits() {
    let result = ControllerConfig::from_lookup(lookup(&[
        ("MAX_QUEUE_CAPACITY", "5"),
        ("ADMISSION_PAGE_SIZE", "+100"),
    ]));
    assert!(result.is_err());
}

#[test]
fn test_controller_config_from_lookup_rejects_unknown_status() {
    let result = ControllerConfig::from_lookup(lookup(&[
        ("MAX_QUEUE_CAPACITY", "5"),
        ("ADMISSION_COUNT_STATUSES", "running,paused"),
    ]));
    assert!(result.is_err());
}

#[test]
fn test_parse_ceiling_is_strict() {
    assert_eq!(parse_ceiling("C", Some("3")), Ok(3));
    for bad in ["", "abc", "3.0", "-1", "0", "1e3", "+5", "+0"] {
        assert!(parse_ceiling("C", Some(bad)).is_err(), "accepted `{bad}`");
    }
    assert!(parse_ceiling("C", None).is_err());
}
