//! # Capacity Gate
//!
//! Fail-closed admission control for bounded-concurrency execution backends.
//!
//! A workflow engine (or any system that runs units of work) is given a
//! ceiling on how many executions may be live at once. Before starting one
//! more, a caller asks the [`AdmissionController`](core::AdmissionController)
//! whether there is room. The controller counts live executions on the
//! backend, following pagination to the end, and admits only when the count
//! is strictly below the ceiling.
//!
//! ## Behaviour
//!
//! - **Single shot**: `try_admit` never waits for capacity and never retries.
//! - **Fail closed**: backend errors, timeouts, truncated listings and runaway
//!   pagination all deny, with the cause attached to the decision.
//! - **Best effort**: counts are stale as soon as they are read. Concurrent
//!   callers observing the same count can both be admitted.
//! - **Injected backends**: the controller never constructs clients itself.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use capacity_gate::core::{AdmissionController, ExecutionStatus};
//! use capacity_gate::infra::InMemoryBackend;
//!
//! let backend = Arc::new(InMemoryBackend::new());
//! backend.fill(9, ExecutionStatus::Running);
//!
//! let controller = AdmissionController::configure(10, Arc::clone(&backend))?;
//! let decision = controller.try_admit().await;
//! assert!(decision.admitted());
//! ```
//!
//! For wiring from configuration see [`builders::ControllerBuilder`] and
//! [`config::ControllerConfig::from_env`].

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core admission abstractions and capacity accounting.
pub mod core;
/// Configuration models for controllers.
pub mod config;
/// Builders to construct controllers from configuration.
pub mod builders;
/// Infrastructure adapters for execution backends.
pub mod infra;
/// Runtime adapters and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
