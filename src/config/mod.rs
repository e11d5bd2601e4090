//! Configuration module for the greeting engine
//!
//! Provides types and parsing for `heartfelt.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
