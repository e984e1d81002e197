//! Sync layer error types
//!
//! Only send failures and staging/validation failures are meant for the
//! user. Poll and pagination failures never leave the engine.

use convo_common::{AppError, ErrorResponse};
use convo_core::DomainError;
use std::fmt;

/// Sync layer error type
#[derive(Debug)]
pub enum SyncError {
    /// The store failed or rejected a send; local state is unchanged
    Send(DomainError),

    /// A selected file or the draft failed local validation
    Validation(DomainError),

    /// Domain rule violation outside the send path
    Domain(DomainError),

    /// Application error (configuration, transport setup)
    App(AppError),

    /// Operation requires an open conversation
    NoActiveConversation,

    /// A send for this conversation is still outstanding
    SendInProgress,
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Send(e) => write!(f, "Failed to send message: {e}"),
            Self::Validation(e) => write!(f, "{e}"),
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::NoActiveConversation => write!(f, "No conversation is open"),
            Self::SendInProgress => write!(f, "A message is already being sent"),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Send(e) | Self::Validation(e) | Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            _ => None,
        }
    }
}

impl SyncError {
    /// Create a validation error from a message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(DomainError::ValidationError(msg.into()))
    }

    /// Whether the view should show this error to the user
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::Send(_) | Self::Validation(_) | Self::SendInProgress)
    }

    /// Whether retrying the same operation later may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Send(e) | Self::Domain(e) => e.is_transient(),
            Self::App(e) => e.is_transient(),
            Self::SendInProgress => true,
            _ => false,
        }
    }

    /// Get the error code for display and logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Send(_) => "SEND_FAILED",
            Self::Validation(e) | Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::NoActiveConversation => "NO_ACTIVE_CONVERSATION",
            Self::SendInProgress => "SEND_IN_PROGRESS",
        }
    }

    /// Inline error payload for the view
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

impl From<DomainError> for SyncError {
    fn from(err: DomainError) -> Self {
        if err.is_validation() {
            Self::Validation(err)
        } else {
            Self::Domain(err)
        }
    }
}

impl From<AppError> for SyncError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<validator::ValidationErrors> for SyncError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect::<Vec<_>>()
            .join("; ");
        Self::validation(message)
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
