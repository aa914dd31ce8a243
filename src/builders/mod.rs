//! Builders to construct the allocation service from configuration.

pub mod service_builder;

pub use service_builder::{build_from_app_config, ServiceBuilder};
