//! Server bootstrap helpers.

pub mod config;

pub use config::{ConfigError, ServerConfig};
