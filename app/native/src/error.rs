//! Error types for Zonesnap.
//!
//! The engine itself never surfaces errors: it logs and carries on. These types
//! cover the outer surfaces (configuration loading and the CLI).

use thiserror::Error;

use crate::config::ConfigError;
use crate::modules::zoning::ActorError;

/// Errors reported by the CLI and other entry points.
#[derive(Debug, Error)]
pub enum ZoneSnapError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The engine actor is unreachable.
    #[error("Engine error: {0}")]
    Engine(#[from] ActorError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<String> for ZoneSnapError {
    fn from(msg: String) -> Self { Self::InvalidArguments(msg) }
}

impl From<&str> for ZoneSnapError {
    fn from(msg: &str) -> Self { Self::InvalidArguments(msg.to_string()) }
}
