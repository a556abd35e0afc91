//! Runtime adapters and caller-facing API surface.

pub mod api;
pub mod tokio_spawner;

pub use api::{AdmissionResponse, ControllerSnapshot, Health, check_capacity, health, snapshot};
pub use tokio_spawner::TokioSpawner;
