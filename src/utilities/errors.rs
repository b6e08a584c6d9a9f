//! Error types for the bridge.

use thiserror::Error;

/// Errors surfaced by the bridge.
///
/// Only construction-time failures are represented here. Runtime trouble on
/// the backend side (crashes, closed streams, garbage output) is logged and
/// swallowed; the bridge simply stops receiving operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The shell hosting the backend could not be spawned.
    #[error("failed to launch reasoning process '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// `equip` was called on an agent that already owns a process.
    #[error("agent already has a reasoning process equipped")]
    AlreadyEquipped,

    /// The background loops need a tokio runtime to be spawned on.
    #[error("no tokio runtime available to host the bridge loops")]
    NoRuntime,

    /// A dialect name that matches none of the built-in profiles.
    #[error("unknown dialect: {0}")]
    UnknownDialect(String),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading a configuration file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML configuration could not be parsed.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// JSON configuration could not be parsed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, BridgeError>;
