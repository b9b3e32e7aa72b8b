//! Error types for the chatterline engine.
//!
//! Configuration problems are rejected before any timeline exists; runtime
//! emit failures abort the remaining timeline without retry.

use thiserror::Error;

/// Errors that can occur in the chatterline engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// A configuration knob failed validation at load/build time
    #[error("Invalid configuration: {field} - {message}")]
    ConfigValidation { field: String, message: String },

    /// Error reading or parsing a configuration file
    #[error("Configuration load error: {0}")]
    ConfigLoad(String),

    /// The external text generator failed; no timeline is built for the turn
    #[error("Text generation failed: {0}")]
    GenerationFailed(String),

    /// The transport rejected an emitted action; remaining actions are dropped
    #[error("Emit failed for action {action_id}: {message}")]
    EmitFailure { action_id: u64, message: String },

    /// A timeline was handed to a coordinator that is not idle
    #[error("Coordinator is not idle (state: {0})")]
    CoordinatorBusy(String),

    /// Error when serializing a wire event
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl EngineError {
    /// Shorthand used by config validation paths.
    pub fn config(field: &str, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for chatterline operations
pub type Result<T> = std::result::Result<T, EngineError>;
