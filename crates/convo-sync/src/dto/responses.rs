//! Snapshot DTOs
//!
//! Everything the surrounding UI renders for the open conversation. All types
//! implement `Serialize` so a view layer can ship them as JSON.

use convo_common::ErrorResponse;
use convo_core::{ConversationId, DeliveryStatus, Message, Snowflake};
use serde::Serialize;
use uuid::Uuid;

use crate::presence::PresenceLine;

/// Loading flags of the open conversation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncFlags {
    pub initial_loading: bool,
    pub polling: bool,
    pub paginating: bool,
    pub sending: bool,
}

/// Immutable view of one conversation at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationSnapshot {
    /// `None` while no conversation is open
    pub conversation: Option<ConversationId>,
    pub messages: Vec<MessageView>,
    pub has_more: bool,
    pub flags: SyncFlags,
    /// Last send failure; cleared by the next send attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_error: Option<ErrorResponse>,
    pub draft: String,
    pub staged: Vec<StagedFileView>,
    pub participants: Vec<ParticipantView>,
}

impl ConversationSnapshot {
    pub fn is_open(&self) -> bool {
        self.conversation.is_some()
    }

    /// Message ids in display order
    pub fn message_ids(&self) -> Vec<Snowflake> {
        self.messages.iter().map(|m| m.message.id).collect()
    }

    pub fn find(&self, id: Snowflake) -> Option<&MessageView> {
        self.messages.iter().find(|m| m.message.id == id)
    }
}

/// One message as rendered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageView {
    pub message: Message,
    /// Authored by the current user
    pub outgoing: bool,
    /// Delivery status; only set on outgoing messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeliveryStatus>,
    pub attachments: Vec<AttachmentView>,
}

/// Attachment with its storage path resolved to a URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentView {
    pub id: Snowflake,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub url: String,
    pub is_image: bool,
}

/// File waiting in the staging buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFileView {
    pub local_id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
}

/// Conversation member with its presence line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantView {
    pub user_id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub presence: PresenceLine,
}
