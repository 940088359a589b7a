//! Configuration for the map editor
//!
//! Provides types and parsing for `mapsmith.toml` project configuration.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
