//! Tests for audit sink

use capacity_gate::core::{
    AdmissionDecision, AdmissionError, AuditAction, AuditSink, InMemoryAuditSink,
    build_audit_event,
};

#[test]
fn test_in_memory_audit_sink() {
    let sink = InMemoryAuditSink::new(10);
    let decision = AdmissionDecision::from_observation(5, 2, 1);

    sink.record(build_audit_event("orders", &decision));
    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].controller, "orders");
    assert_eq!(events[0].action, AuditAction::Admit);
    assert_eq!(events[0].ceiling, 5);
    assert_eq!(events[0].observed_active, Some(2));
    assert!(events[0].detail.is_none());
}

#[test]
fn test_audit_sink_overflow() {
    let sink = InMemoryAuditSink::new(2);
    for active in 0..3 {
        sink.record(build_audit_event("c", &AdmissionDecision::from_observation(10, active, 1)));
    }

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].observed_active, Some(1)); // First one popped
    assert_eq!(events[1].observed_active, Some(2));
}

#[test]
fn test_build_audit_event_for_fail_closed() {
    let decision = AdmissionDecision::fail_closed(
        3,
        AdmissionError::BackendUnavailable("dns".to_string()),
        1,
    );
    let event = build_audit_event("c", &decision);

    assert_eq!(event.action, AuditAction::FailClosed);
    assert_eq!(event.action.as_str(), "fail_closed");
    assert_eq!(event.observed_active, None);
    assert_eq!(event.detail.as_deref(), Some("backend unavailable: dns"));
    assert!(event.created_at_ms > 0);
    assert_eq!(event.event_id.len(), 36);
}

#[test]
fn test_event_ids_are_unique() {
    let decision = AdmissionDecision::from_observation(3, 3, 1);
    let a = build_audit_event("c", &decision);
    let b = build_audit_event("c", &decision);
    assert_eq!(a.action, AuditAction::Deny);
    assert_ne!(a.event_id, b.event_id);
}

#[test]
fn test_partial_count_deny_is_noted() {
    let event = build_audit_event("c", &AdmissionDecision::from_lower_bound(150, 200, 1));
    assert_eq!(event.action, AuditAction::Deny);
    assert_eq!(event.observed_active, Some(200));
    assert!(event.detail.is_some());
}
