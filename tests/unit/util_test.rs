//! Tests for utility functions

use capacity_gate::core::{CeilingHandle, ExecutionStatus};
use capacity_gate::util::{init_tracing, now_ms};

#[test]
fn test_now_ms_is_monotonic_enough() {
    let a = now_ms();
    let b = now_ms();
    assert!(a > 0);
    assert!(b >= a);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
}

#[test]
fn test_ceiling_handle_rejects_zero() {
    assert!(CeilingHandle::new(0).is_err());
    let handle = CeilingHandle::new(4).unwrap();
    assert!(handle.set(0).is_err());
    assert_eq!(handle.get(), 4);
    assert_eq!(handle.set(6), Ok(4));
    assert_eq!(handle.get(), 6);
}

#[test]
fn test_execution_status_parsing() {
    assert_eq!("RUNNING".parse::<ExecutionStatus>(), Ok(ExecutionStatus::Running));
    assert_eq!(" pending ".parse::<ExecutionStatus>(), Ok(ExecutionStatus::Pending));
    assert!("paused".parse::<ExecutionStatus>().is_err());
    assert!(ExecutionStatus::Scheduled.is_live());
    assert!(!ExecutionStatus::Failed.is_live());
    assert_eq!(ExecutionStatus::Succeeded.to_string(), "succeeded");
}
