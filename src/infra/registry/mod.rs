//! Agency registry sources.

pub mod file;
pub mod memory;

pub use file::JsonFileRegistry;
pub use memory::{default_agencies, StaticRegistry};
