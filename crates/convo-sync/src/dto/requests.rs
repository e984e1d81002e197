//! Request DTOs
//!
//! Input built from view state and checked with `Validate` before anything
//! reaches the store.

use uuid::Uuid;
use validator::Validate;

/// Hard ceiling on a message body regardless of configuration
pub const BODY_HARD_LIMIT: u64 = 16_000;

/// Outgoing message as assembled from the draft and the staging buffer
#[derive(Debug, Clone, Validate)]
pub struct SendMessageRequest {
    #[validate(length(max = 16000, message = "Message must be at most 16000 characters"))]
    pub body: Option<String>,

    /// Local ids of the staged files going out with this message
    #[validate(length(max = 100, message = "Too many attachments"))]
    pub attachments: Vec<Uuid>,
}

impl SendMessageRequest {
    /// Build from draft text; a whitespace-only draft carries no body
    pub fn new(draft: &str, attachments: Vec<Uuid>) -> Self {
        let body = (!draft.trim().is_empty()).then(|| draft.to_string());
        Self { body, attachments }
    }

    /// Neither text nor attachments
    pub fn is_empty(&self) -> bool {
        self.body.is_none() && self.attachments.is_empty()
    }

    /// Body length in characters
    pub fn body_chars(&self) -> usize {
        self.body.as_deref().map_or(0, |b| b.chars().count())
    }
}
