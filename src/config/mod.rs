//! Configuration module for the level compiler
//!
//! Provides types and parsing for `levels.toml` project configuration.

pub mod loader;
pub mod schema;

pub use loader::{default_config, load_config, CliOverrides, ConfigError};
pub use schema::*;
