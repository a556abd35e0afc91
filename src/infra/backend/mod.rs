//! Execution backend adapters.

pub mod memory;

pub use memory::{Execution, InMemoryBackend, PagingMode};
