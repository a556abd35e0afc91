//! Infrastructure adapters for execution backends.

pub mod backend;

pub use backend::InMemoryBackend;
