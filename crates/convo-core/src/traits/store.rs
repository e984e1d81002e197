//! Message store port - the remote store as seen by the sync engine
//!
//! The store is an opaque request/response service. The engine only relies on
//! the contract spelled out here; transports live in adapter crates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{ConversationId, Message, MessageReceipts, Participant};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for store operations
pub type StoreResult<T> = Result<T, DomainError>;

/// Bounds for a message fetch
///
/// `since` and `until` are both exclusive. Which `limit` matches a store
/// returns depends on the bound:
///
/// - `since` set: the **oldest** `limit` messages after `since`. Polls
///   advance their lower bound to the newest message returned, so handing
///   back the newest matches instead would skip everything in between.
/// - `until` set, or no bound: the **newest** `limit` messages before
///   `until` (or overall).
///
/// Within a batch the order is unspecified and results may overlap earlier
/// fetches; callers sort and deduplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageQuery {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: u32,
}

impl MessageQuery {
    /// Newest page, no bounds
    pub fn latest(limit: u32) -> Self {
        Self {
            since: None,
            until: None,
            limit,
        }
    }

    /// Messages strictly newer than `since` (no lower bound when `None`)
    pub fn newer_than(since: Option<DateTime<Utc>>, limit: u32) -> Self {
        Self {
            since,
            until: None,
            limit,
        }
    }

    /// Messages strictly older than `until`
    pub fn older_than(until: DateTime<Utc>, limit: u32) -> Self {
        Self {
            since: None,
            until: Some(until),
            limit,
        }
    }

    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.since.is_some() || self.until.is_some()
    }
}

/// A locally selected file on its way to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadFile {
    #[inline]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Payload of a create-message request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub author_id: Snowflake,
    pub body: Option<String>,
    pub files: Vec<UploadFile>,
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Fetch messages of a conversation within the query bounds
    async fn fetch_messages(
        &self,
        conversation: ConversationId,
        query: MessageQuery,
    ) -> StoreResult<Vec<Message>>;

    /// Create a message and return the confirmed record with its
    /// store-assigned id, timestamp, and attachment metadata
    async fn create_message(
        &self,
        conversation: ConversationId,
        message: NewMessage,
    ) -> StoreResult<Message>;

    /// Current per-recipient acknowledgements of the given messages.
    ///
    /// Ids the store does not know are left out of the result.
    async fn fetch_receipts(
        &self,
        conversation: ConversationId,
        message_ids: &[Snowflake],
    ) -> StoreResult<Vec<MessageReceipts>>;

    /// Mark the conversation read for `user_id` (idempotent)
    async fn mark_read(&self, conversation: ConversationId, user_id: Snowflake) -> StoreResult<()>;

    /// Fetch member presence for the conversation
    async fn fetch_participants(&self, conversation: ConversationId)
        -> StoreResult<Vec<Participant>>;
}
