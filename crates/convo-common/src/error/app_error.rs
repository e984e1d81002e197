//! Application error types
//!
//! Unified error handling for transports, configuration, and binaries.

use convo_core::DomainError;
use serde::Serialize;
use std::fmt;

use crate::config::ConfigError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Missing or rejected credentials")]
    Unauthorized,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    // Transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Remote rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Build from a non-success HTTP status and its body text
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound(message),
            429 => Self::RateLimited,
            400 | 422 => Self::Validation(message),
            _ => Self::Rejected { status, message },
        }
    }

    /// Get error code for display and logs
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::RateLimited => "RATE_LIMITED",
            Self::Rejected { .. } => "REJECTED",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    /// Check if retrying later may succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout | Self::RateLimited => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::Domain(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Create a transport error
    #[must_use]
    pub fn transport(msg: impl fmt::Display) -> Self {
        Self::Transport(msg.to_string())
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Store adapters report through the domain port, so transport failures are
/// folded into the matching domain variant.
impl From<AppError> for DomainError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Domain(e) => e,
            AppError::Unauthorized => DomainError::Unauthorized,
            AppError::Validation(msg) => DomainError::ValidationError(msg),
            AppError::NotFound(msg) => DomainError::StoreRejected {
                status: 404,
                message: msg,
            },
            AppError::Transport(msg) => DomainError::StoreUnavailable(msg),
            AppError::Timeout => DomainError::StoreTimeout,
            AppError::RateLimited => DomainError::StoreRejected {
                status: 429,
                message: "rate limited".to_string(),
            },
            AppError::Rejected { status, message } => {
                DomainError::StoreRejected { status, message }
            }
            AppError::Decode(msg) => DomainError::MalformedResponse(msg),
            AppError::Internal(e) => DomainError::InternalError(e.to_string()),
            AppError::Config(msg) => DomainError::InternalError(msg),
        }
    }
}

/// Error payload handed to the view for inline display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<&DomainError> for ErrorResponse {
    fn from(err: &DomainError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
