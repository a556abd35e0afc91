//! Tests for error types

use std::time::Duration;

use capacity_gate::core::{AdmissionError, BackendError};

#[test]
fn test_config_error() {
    let err = AdmissionError::Config("ceiling must be a positive integer".to_string());
    assert_eq!(format!("{}", err), "config error: ceiling must be a positive integer");
    assert!(!err.is_backend());
}

#[test]
fn test_backend_unavailable_error() {
    let err = AdmissionError::BackendUnavailable("connection failed".to_string());
    assert_eq!(format!("{}", err), "backend unavailable: connection failed");
    assert!(err.is_backend());
}

#[test]
fn test_backend_timeout_error() {
    let err = AdmissionError::BackendTimeout(Duration::from_millis(250));
    assert_eq!(format!("{}", err), "backend timed out after 250ms");
}

#[test]
fn test_backend_inconsistent_error() {
    let err = AdmissionError::BackendInconsistent("listing truncated".to_string());
    assert_eq!(format!("{}", err), "backend inconsistent: listing truncated");
    assert!(err.is_backend());
}

#[test]
fn test_backend_error_converts_to_unavailable() {
    let err: AdmissionError = BackendError::Rejected("throttled".to_string()).into();
    assert_eq!(err, AdmissionError::BackendUnavailable("rejected: throttled".to_string()));
}
