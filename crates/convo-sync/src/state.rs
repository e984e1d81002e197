//! Per-conversation state owned by a view
//!
//! Everything here is mutated under the view's lock and never across an
//! await point. Each open gets a fresh epoch; a response carrying an older
//! epoch belongs to a conversation that is no longer active.

use convo_common::{ErrorResponse, SyncConfig};
use convo_core::{ConversationId, Message, Participant, Snowflake};

use crate::cursor::CursorState;
use crate::dto::{ConversationSnapshot, MessageView, ParticipantView, StagedFileView, SyncFlags};
use crate::merge::MessageList;
use crate::poll::PollHandle;
use crate::presence::ReadTracker;
use crate::staging::{AttachmentStaging, StagingRules};

/// Monotonic open counter
pub type Epoch = u64;

/// State of the single active conversation
#[derive(Debug)]
pub struct ConversationState {
    pub id: ConversationId,
    pub epoch: Epoch,
    pub messages: MessageList,
    pub cursor: CursorState,
    pub flags: SyncFlags,
    pub staging: AttachmentStaging,
    pub draft: String,
    pub reads: ReadTracker,
    pub participants: Vec<Participant>,
    pub send_error: Option<ErrorResponse>,
    pub poll_failures: u32,
    /// Dropped together with the state, which stops the timer
    pub poller: Option<PollHandle>,
}

impl ConversationState {
    pub fn new(
        id: ConversationId,
        epoch: Epoch,
        current_user: Snowflake,
        rules: StagingRules,
    ) -> Self {
        Self {
            id,
            epoch,
            messages: MessageList::new(),
            cursor: CursorState::new(),
            flags: SyncFlags::default(),
            staging: AttachmentStaging::new(rules),
            draft: String::new(),
            reads: ReadTracker::new(current_user),
            participants: Vec::new(),
            send_error: None,
            poll_failures: 0,
            poller: None,
        }
    }

    /// Fold a fetched batch into receipts and the list; returns the new count
    pub fn absorb(&mut self, batch: &[Message]) -> usize {
        self.reads.observe(batch);
        self.messages.merge(batch)
    }

    pub fn snapshot(&self, config: &SyncConfig) -> ConversationSnapshot {
        let base_url = config.attachments.base_url.as_str();
        ConversationSnapshot {
            conversation: Some(self.id),
            messages: self
                .messages
                .iter()
                .map(|m| MessageView::from_message(m, &self.reads, base_url))
                .collect(),
            has_more: self.cursor.has_more(),
            flags: self.flags,
            send_error: self.send_error.clone(),
            draft: self.draft.clone(),
            staged: self.staging.files().iter().map(StagedFileView::from).collect(),
            participants: self.participants.iter().map(ParticipantView::from).collect(),
        }
    }
}

/// Lock-protected state of a view
#[derive(Debug, Default)]
pub struct ViewState {
    pub active: Option<ConversationState>,
    next_epoch: Epoch,
}

impl ViewState {
    /// Replace the active conversation, returning the new epoch.
    ///
    /// The previous conversation's state (messages, cursors, staged files,
    /// draft, timer) is dropped here.
    pub fn activate(
        &mut self,
        id: ConversationId,
        current_user: Snowflake,
        rules: StagingRules,
    ) -> Epoch {
        self.next_epoch += 1;
        let epoch = self.next_epoch;
        self.active = Some(ConversationState::new(id, epoch, current_user, rules));
        epoch
    }

    /// Active state, if it still belongs to `epoch`
    pub fn current(&mut self, epoch: Epoch) -> Option<&mut ConversationState> {
        self.active.as_mut().filter(|c| c.epoch == epoch)
    }

    pub fn deactivate(&mut self) -> Option<ConversationState> {
        self.active.take()
    }

    pub fn snapshot(&self, config: &SyncConfig) -> ConversationSnapshot {
        self.active
            .as_ref()
            .map(|c| c.snapshot(config))
            .unwrap_or_default()
    }
}
