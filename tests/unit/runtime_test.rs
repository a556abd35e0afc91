//! Tests for runtime adapters and API models

use std::sync::Arc;

use capacity_gate::core::{AdmissionController, BackendError, ExecutionStatus, Spawn};
use capacity_gate::infra::InMemoryBackend;
use capacity_gate::runtime::{TokioSpawner, check_capacity, health, snapshot};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[test]
fn test_tokio_spawner_current_outside_runtime() {
    assert!(TokioSpawner::current().is_none());
}

#[tokio::test]
async fn test_check_capacity_response_shape() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.fill(2, ExecutionStatus::Running);
    let controller = AdmissionController::configure(3, Arc::clone(&backend)).unwrap();

    let response = check_capacity(&controller).await;
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["admitted"], true);
    assert_eq!(value["ceiling"], 3);
    assert_eq!(value["observedActive"], 2);
    assert_eq!(value["observedActiveIsLowerBound"], false);
    assert!(value["error"].is_null());
}

#[tokio::test]
async fn test_check_capacity_flags_partial_count() {
    let backend = Arc::new(InMemoryBackend::new().with_max_page_size(100));
    backend.fill(1000, ExecutionStatus::Running);
    let controller = AdmissionController::configure(150, Arc::clone(&backend)).unwrap();

    let value = serde_json::to_value(check_capacity(&controller).await).unwrap();
    assert_eq!(value["admitted"], false);
    assert_eq!(value["observedActive"], 200);
    assert_eq!(value["observedActiveIsLowerBound"], true);
    assert!(value["error"].is_null());
}

#[tokio::test]
async fn test_check_capacity_reports_backend_failure() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.fail_listing(Some(BackendError::Request("unreachable".into())));
    let controller = AdmissionController::configure(3, Arc::clone(&backend)).unwrap();

    let response = check_capacity(&controller).await;
    assert!(!response.admitted);
    assert_eq!(response.observed_active, None);
    assert_eq!(
        response.error.as_deref(),
        Some("backend unavailable: request failed: unreachable")
    );
}

#[test]
fn test_snapshot_and_health() {
    let controller = AdmissionController::configure(9, InMemoryBackend::new())
        .unwrap()
        .with_name("orders");
    let snap = snapshot(&controller);
    assert_eq!(snap.name, "orders");
    assert_eq!(snap.ceiling, 9);
    assert_eq!(snap.page_size, 1000);
    assert!(health().ok);
}
