//! Message, attachment, and receipt model → entity mapper

use convo_core::{Attachment, ConversationId, DeliveryStatus, Message, MessageReceipts, Receipt};

use crate::models::{AttachmentModel, MessageModel, MessageReceiptsModel, ReceiptModel};

impl MessageModel {
    /// Convert to a Message entity of `conversation`
    ///
    /// The list endpoints are scoped by URL, so the payload carries no
    /// conversation id of its own.
    pub fn into_entity(self, conversation: ConversationId) -> Message {
        Message {
            id: self.id,
            conversation_id: conversation,
            author_id: self.author_id,
            body: self.body.filter(|b| !b.is_empty()),
            attachments: self.attachments.into_iter().map(Attachment::from).collect(),
            created_at: self.created_at,
            receipts: self.receipts.into_iter().map(Receipt::from).collect(),
        }
    }
}

/// Convert AttachmentModel to Attachment entity
impl From<AttachmentModel> for Attachment {
    fn from(model: AttachmentModel) -> Self {
        Attachment {
            id: model.id,
            path: relative_path(&model.path).to_string(),
            filename: model.filename,
            content_type: model.content_type,
            size: model.size,
        }
    }
}

/// Convert ReceiptModel to Receipt entity
impl From<ReceiptModel> for Receipt {
    fn from(model: ReceiptModel) -> Self {
        let status = match (model.read_at, model.delivered_at) {
            (Some(_), _) => DeliveryStatus::Read,
            (None, Some(_)) => DeliveryStatus::Delivered,
            (None, None) => DeliveryStatus::Sent,
        };
        Receipt::new(model.user_id, status)
    }
}

impl From<MessageReceiptsModel> for MessageReceipts {
    fn from(model: MessageReceiptsModel) -> Self {
        MessageReceipts::new(
            model.message_id,
            model.receipts.into_iter().map(Receipt::from).collect(),
        )
    }
}

/// Strip scheme and host from an absolute URL, leaving the storage path.
///
/// Paths that are already relative are returned without a leading slash.
pub fn relative_path(path: &str) -> &str {
    let path = match path.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |i| &rest[i..]),
        None => path,
    };
    path.trim_start_matches('/')
}
