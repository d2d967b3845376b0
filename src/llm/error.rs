//! Completion backend errors

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendError {
    /// The provider rejected or failed the request
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// No completion within the request timeout
    TimeoutError { seconds: u64 },

    /// The endpoint could not be reached
    NetworkError { message: String },

    /// Unknown provider, missing model, bad endpoint
    ConfigurationError { message: String },

    Other { message: String },
}

impl BackendError {
    /// Failures where the same request may succeed later
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::TimeoutError { .. } | BackendError::NetworkError { .. } => true,
            BackendError::ApiError { status_code, .. } => {
                matches!(status_code, Some(429) | Some(500..=599))
            }
            BackendError::ConfigurationError { .. } | BackendError::Other { .. } => false,
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::ApiError {
                message,
                status_code: Some(code),
            } => write!(f, "API error ({}): {}", code, message),
            BackendError::ApiError { message, .. } => write!(f, "API error: {}", message),
            BackendError::TimeoutError { seconds } => {
                write!(f, "Completion timed out after {} seconds", seconds)
            }
            BackendError::NetworkError { message } => write!(f, "Network error: {}", message),
            BackendError::ConfigurationError { message } => {
                write!(f, "Backend configuration error: {}", message)
            }
            BackendError::Other { message } => f.write_str(message),
        }
    }
}

impl std::error::Error for BackendError {}
