//! Message wire models

use chrono::{DateTime, Utc};
use convo_core::Snowflake;
use serde::{Deserialize, Serialize};

/// Message as returned by the list and create endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct MessageModel {
    pub id: Snowflake,
    pub author_id: Snowflake,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentModel>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub receipts: Vec<ReceiptModel>,
}

/// Attachment metadata
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentModel {
    pub id: Snowflake,
    pub filename: String,
    #[serde(alias = "mime_type")]
    pub content_type: String,
    pub size: u64,
    /// Storage path; some deployments send a full URL here
    pub path: String,
}

impl AttachmentModel {
    #[inline]
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Per-recipient acknowledgement timestamps
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptModel {
    pub user_id: Snowflake,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
}

/// Receipts of one message as returned by the receipts endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct MessageReceiptsModel {
    pub message_id: Snowflake,
    #[serde(default)]
    pub receipts: Vec<ReceiptModel>,
}

/// Body of the mark-as-read request
#[derive(Debug, Clone, Serialize)]
pub struct MarkReadBody {
    pub user_id: Snowflake,
}
