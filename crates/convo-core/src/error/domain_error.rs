//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::entities::ConversationId;
use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Message has no text and no attachments")]
    EmptyMessage,

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Attachment '{filename}' rejected: {reason}")]
    AttachmentRejected { filename: String, reason: String },

    #[error("Too many attachments: max {max} per message")]
    TooManyAttachments { max: usize },

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not authorized to access this conversation")]
    Unauthorized,

    // =========================================================================
    // Store Errors (wrapped)
    // =========================================================================
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store request timed out")]
    StoreTimeout,

    #[error("Store rejected request ({status}): {message}")]
    StoreRejected { status: u16, message: String },

    #[error("Malformed store response: {0}")]
    MalformedResponse(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for display and logs
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::ConversationNotFound(_) => "UNKNOWN_CONVERSATION",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::EmptyMessage => "EMPTY_MESSAGE",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::AttachmentRejected { .. } => "ATTACHMENT_REJECTED",
            Self::TooManyAttachments { .. } => "TOO_MANY_ATTACHMENTS",

            // Authorization
            Self::Unauthorized => "UNAUTHORIZED",

            // Store
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::StoreTimeout => "STORE_TIMEOUT",
            Self::StoreRejected { .. } => "STORE_REJECTED",
            Self::MalformedResponse(_) => "MALFORMED_RESPONSE",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ConversationNotFound(_) | Self::MessageNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::EmptyMessage
                | Self::ContentTooLong { .. }
                | Self::AttachmentRejected { .. }
                | Self::TooManyAttachments { .. }
        )
    }

    /// Check if retrying the same request later may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::StoreUnavailable(_) | Self::StoreTimeout => true,
            Self::StoreRejected { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
