//! Error types for Focus Flux

use thiserror::Error;

use crate::types::SessionId;

/// Errors that can occur while driving a focus session
#[derive(Debug, Error)]
pub enum FocusError {
    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("No session has been started")]
    NoSession,

    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}
