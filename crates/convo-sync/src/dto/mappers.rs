//! Entity to DTO mappers

use convo_core::{Attachment, Message, Participant};

use super::responses::{AttachmentView, MessageView, ParticipantView, StagedFileView};
use crate::presence::{PresenceLine, ReadTracker};
use crate::staging::StagedFile;

impl AttachmentView {
    pub fn from_attachment(attachment: &Attachment, base_url: &str) -> Self {
        Self {
            id: attachment.id,
            filename: attachment.filename.clone(),
            content_type: attachment.content_type.clone(),
            size: attachment.size,
            url: attachment.resolve_url(base_url),
            is_image: attachment.is_image(),
        }
    }
}

impl MessageView {
    pub fn from_message(message: &Message, tracker: &ReadTracker, base_url: &str) -> Self {
        Self {
            outgoing: tracker.is_outgoing(message),
            status: tracker.status(message),
            attachments: message
                .attachments
                .iter()
                .map(|a| AttachmentView::from_attachment(a, base_url))
                .collect(),
            message: message.clone(),
        }
    }
}

impl From<&StagedFile> for StagedFileView {
    fn from(file: &StagedFile) -> Self {
        Self {
            local_id: file.local_id,
            filename: file.filename.clone(),
            content_type: file.content_type.clone(),
            size: file.size(),
        }
    }
}

impl From<&Participant> for ParticipantView {
    fn from(participant: &Participant) -> Self {
        Self {
            user_id: participant.user_id,
            display_name: participant.display_name.clone(),
            presence: PresenceLine::from(participant),
        }
    }
}
