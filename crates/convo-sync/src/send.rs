//! Send/reconcile flow
//!
//! A send is applied only once the store confirms it. The confirmed message
//! goes through the merge like any fetched one, and the draft and staged
//! files are cleared under the same lock. A failed send changes nothing but
//! the error signal.

use std::slice;

use convo_core::{DomainError, Message, NewMessage};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::dto::SendMessageRequest;
use crate::error::{SyncError, SyncResult};
use crate::view::ConversationView;

/// Local checks run before anything reaches the store
pub fn validate_send(request: &SendMessageRequest, max_length: usize) -> SyncResult<()> {
    if request.is_empty() {
        return Err(DomainError::EmptyMessage.into());
    }
    request.validate()?;
    if request.body_chars() > max_length {
        return Err(DomainError::ContentTooLong { max: max_length }.into());
    }
    Ok(())
}

impl ConversationView {
    /// Send the draft with the staged files.
    ///
    /// Returns the confirmed message. When the conversation was closed while
    /// the request was outstanding the message is returned but not applied.
    #[instrument(skip(self))]
    pub async fn send(&self) -> SyncResult<Message> {
        let ctx = &self.inner.ctx;

        let (epoch, id, request, draft_at_send, payload) = {
            let mut state = self.inner.state.lock();
            let conversation = state
                .active
                .as_mut()
                .ok_or(SyncError::NoActiveConversation)?;
            if conversation.flags.sending {
                return Err(SyncError::SendInProgress);
            }

            let request = SendMessageRequest::new(&conversation.draft, conversation.staging.ids());
            validate_send(&request, ctx.config().message_max_length)?;

            let payload = NewMessage {
                author_id: ctx.current_user(),
                body: request.body.clone(),
                files: conversation.staging.uploads(),
            };
            conversation.flags.sending = true;
            conversation.send_error = None;

            let pending = (
                conversation.epoch,
                conversation.id,
                request,
                conversation.draft.clone(),
                payload,
            );
            self.inner.publish(&state);
            pending
        };

        let result = ctx.store().create_message(id, payload).await;

        let mut state = self.inner.state.lock();
        let Some(conversation) = state.current(epoch) else {
            debug!(conversation_id = %id, "Send finished after conversation changed");
            return result.map_err(SyncError::Send);
        };
        conversation.flags.sending = false;

        match result {
            Ok(message) => {
                conversation.absorb(slice::from_ref(&message));
                conversation.cursor.record_sent(&message);
                // Keep edits made while the request was outstanding
                if conversation.draft == draft_at_send {
                    conversation.draft.clear();
                }
                conversation.staging.remove_sent(&request.attachments);

                info!(
                    conversation_id = %id,
                    message_id = %message.id,
                    attachments = message.attachments.len(),
                    "Message sent"
                );
                self.inner.publish(&state);
                Ok(message)
            }
            Err(e) => {
                let err = SyncError::Send(e);
                warn!(conversation_id = %id, error = %err, "Send failed");
                conversation.send_error = Some(err.to_response());
                self.inner.publish(&state);
                Err(err)
            }
        }
    }
}
