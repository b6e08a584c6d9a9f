//! Configuration and error types.

pub mod config;
pub mod errors;

pub use config::{BridgeConfig, ShellConfig};
pub use errors::{BridgeError, Result};
