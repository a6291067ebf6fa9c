//! Error types for the controls crate

use thiserror::Error;

/// Controls errors
///
/// Behavior methods never fail; these only surface at construction and
/// parsing boundaries.
#[derive(Debug, Error)]
pub enum ControlsError {
    /// Invalid configuration value
    #[error("Invalid controls configuration: {0}")]
    InvalidConfig(String),

    /// Unrecognised rotation direction name
    #[error("Unknown rotation direction: {0}")]
    UnknownDirection(String),

    /// Unrecognised signal name
    #[error("Unknown signal: {0}")]
    UnknownSignal(String),

    /// Configuration could not be parsed
    #[error("Failed to parse controls configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for controls operations
pub type ControlsResult<T> = std::result::Result<T, ControlsError>;
