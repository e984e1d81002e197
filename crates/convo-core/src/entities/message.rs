//! Message entity - one confirmed entry of a conversation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::conversation::ConversationId;
use super::participant::Receipt;
use crate::value_objects::Snowflake;

/// Delivery state of an outgoing message, ordered `Sent < Delivered < Read`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Accepted by the store, not yet received by the recipient
    #[default]
    Sent,
    /// Received by the recipient's client
    Delivered,
    /// Seen by the recipient
    Read,
}

impl DeliveryStatus {
    /// Collapse per-recipient states into the status shown for the message.
    ///
    /// A message is only as far along as its slowest recipient. No recipients
    /// means nothing has acknowledged it yet.
    pub fn aggregate<I>(states: I) -> Self
    where
        I: IntoIterator<Item = DeliveryStatus>,
    {
        states.into_iter().min().unwrap_or_default()
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent => write!(f, "sent"),
            Self::Delivered => write!(f, "delivered"),
            Self::Read => write!(f, "read"),
        }
    }
}

/// Message entity
///
/// Always carries a store-assigned `id` and `created_at`; unconfirmed drafts
/// are never represented as a `Message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    pub conversation_id: ConversationId,
    pub author_id: Snowflake,
    pub body: Option<String>,
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    /// Acknowledgement records, one per recipient
    #[serde(default)]
    pub receipts: Vec<Receipt>,
}

impl Message {
    /// Create a text message with no attachments or receipts
    pub fn new(
        id: Snowflake,
        conversation_id: ConversationId,
        author_id: Snowflake,
        body: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            conversation_id,
            author_id,
            body: Some(body.into()),
            attachments: Vec::new(),
            created_at,
            receipts: Vec::new(),
        }
    }

    /// Attach files (builder style)
    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Attach acknowledgement records (builder style)
    #[must_use]
    pub fn with_receipts(mut self, receipts: Vec<Receipt>) -> Self {
        self.receipts = receipts;
        self
    }

    /// Canonical ordering key: creation time, then id for equal timestamps
    #[inline]
    pub fn sort_key(&self) -> (DateTime<Utc>, Snowflake) {
        (self.created_at, self.id)
    }

    #[inline]
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    /// Check if message has neither text nor attachments
    pub fn is_empty(&self) -> bool {
        let no_text = self.body.as_deref().map_or(true, |b| b.trim().is_empty());
        no_text && self.attachments.is_empty()
    }
}

/// Attachment metadata of a confirmed message
///
/// `path` is relative to the file storage root. It is resolved against the
/// configured base URL at render time and never stored absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Snowflake,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub path: String,
}

impl Attachment {
    pub fn new(
        id: Snowflake,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        size: u64,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id,
            filename: filename.into(),
            content_type: content_type.into(),
            size,
            path: path.into(),
        }
    }

    /// Check if attachment is an image
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Join the relative storage path onto `base_url`
    pub fn resolve_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}
