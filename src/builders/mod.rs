//! Builders to construct admission components from configuration.

pub mod controller_builder;

pub use controller_builder::ControllerBuilder;
