//! Conversation view
//!
//! Owns the single active conversation of one UI view: its message list,
//! cursors, poll timer, staging buffer, and draft. Every store response is
//! checked against the epoch it was requested under and discarded if the
//! conversation changed in the meantime. The lock is never held across an
//! await.

use std::sync::{Arc, Weak};

use convo_common::MAX_PAGE_SIZE;
use convo_core::{ConversationId, MessageQuery};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::backoff::BackoffPolicy;
use crate::context::SyncContext;
use crate::dto::ConversationSnapshot;
use crate::error::{SyncError, SyncResult};
use crate::poll::{PollOutcome, PollScheduler};
use crate::staging::{SelectedFile, StagingReport, StagingRules};
use crate::state::{Epoch, ViewState};

pub(crate) struct ViewInner {
    pub(crate) ctx: SyncContext,
    pub(crate) state: Mutex<ViewState>,
    snapshots: watch::Sender<ConversationSnapshot>,
}

impl ViewInner {
    /// Push the current state to subscribers
    pub(crate) fn publish(&self, state: &ViewState) {
        self.snapshots.send_replace(state.snapshot(self.ctx.config()));
    }

    async fn initial_load(&self, epoch: Epoch) {
        let limit = self.ctx.config().pagination.initial_page_size();
        let id = {
            let state = self.state.lock();
            match state.active.as_ref().filter(|c| c.epoch == epoch) {
                Some(conversation) => conversation.id,
                None => return,
            }
        };

        let result = self
            .ctx
            .store()
            .fetch_messages(id, MessageQuery::latest(limit))
            .await;

        let mut state = self.state.lock();
        let Some(conversation) = state.current(epoch) else {
            debug!(conversation_id = %id, "Discarding initial page for inactive conversation");
            return;
        };
        conversation.flags.initial_loading = false;

        match result {
            Ok(batch) => {
                let count = conversation.absorb(&batch);
                conversation.cursor.record_initial(&batch, limit);
                debug!(
                    conversation_id = %id,
                    count,
                    has_more = conversation.cursor.has_more(),
                    "Initial page loaded"
                );
            }
            Err(e) => {
                warn!(conversation_id = %id, error = %e, "Initial load failed, polling will retry");
            }
        }

        self.publish(&state);
    }

    /// One incremental fetch under the per-conversation single-flight guard.
    ///
    /// Until the cursors are seeded (the initial page failed) a poll fetches
    /// an unbounded first page instead. After a successful fetch the
    /// receipts of outgoing messages not yet read are refreshed; a failed
    /// refresh is logged and does not count as a poll failure.
    pub(crate) async fn poll_once(&self, epoch: Epoch) -> PollOutcome {
        let config = self.ctx.config();
        let (id, query, seeding, pending) = {
            let mut state = self.state.lock();
            let Some(conversation) = state.current(epoch) else {
                return PollOutcome::Stale;
            };
            if conversation.flags.polling || conversation.flags.initial_loading {
                return PollOutcome::Skipped;
            }

            let seeding = !conversation.cursor.is_seeded();
            let query = if seeding {
                MessageQuery::latest(config.pagination.initial_page_size())
            } else {
                conversation.cursor.poll_query(config.poll.limit())
            };
            let pending = if seeding {
                Vec::new()
            } else {
                conversation.reads.pending(MAX_PAGE_SIZE as usize)
            };
            conversation.flags.polling = true;
            let id = conversation.id;

            self.publish(&state);
            (id, query, seeding, pending)
        };

        let result = self.ctx.store().fetch_messages(id, query).await;
        let refreshed = if result.is_ok() && !pending.is_empty() {
            Some(self.ctx.store().fetch_receipts(id, &pending).await)
        } else {
            None
        };

        let mut state = self.state.lock();
        let Some(conversation) = state.current(epoch) else {
            debug!(conversation_id = %id, "Discarding poll response for inactive conversation");
            return PollOutcome::Stale;
        };
        conversation.flags.polling = false;

        let outcome = match result {
            Ok(batch) => {
                let new = conversation.absorb(&batch);
                if seeding {
                    conversation.cursor.record_initial(&batch, query.limit);
                } else {
                    conversation.cursor.record_poll(&batch, query);
                }
                match refreshed {
                    Some(Ok(receipts)) => conversation.reads.observe_receipts(&receipts),
                    Some(Err(e)) => {
                        warn!(conversation_id = %id, error = %e, "Receipt refresh failed");
                    }
                    None => {}
                }
                conversation.poll_failures = 0;
                if new > 0 {
                    debug!(conversation_id = %id, new, "Poll merged new messages");
                }
                PollOutcome::Applied { new }
            }
            Err(e) => {
                conversation.poll_failures += 1;
                warn!(
                    conversation_id = %id,
                    consecutive = conversation.poll_failures,
                    error = %e,
                    "Poll failed"
                );
                PollOutcome::Failed {
                    consecutive: conversation.poll_failures,
                }
            }
        };

        self.publish(&state);
        outcome
    }

    async fn load_participants(&self, epoch: Epoch, id: ConversationId) {
        let participants = match self.ctx.store().fetch_participants(id).await {
            Ok(participants) => participants,
            Err(e) => {
                warn!(conversation_id = %id, error = %e, "Participant refresh failed");
                return;
            }
        };

        let mut state = self.state.lock();
        let Some(conversation) = state.current(epoch) else {
            debug!(conversation_id = %id, "Discarding participants for inactive conversation");
            return;
        };
        conversation.participants = participants;
        self.publish(&state);
    }

    fn spawn_mark_read(&self, id: ConversationId) {
        let store = self.ctx.store_handle();
        let user_id = self.ctx.current_user();

        tokio::spawn(async move {
            match store.mark_read(id, user_id).await {
                Ok(()) => debug!(conversation_id = %id, "Conversation marked read"),
                Err(e) => warn!(conversation_id = %id, error = %e, "Mark-as-read failed"),
            }
        });
    }

    fn start_polling(self: &Arc<Self>, epoch: Epoch) {
        let config = &self.ctx.config().poll;
        let scheduler =
            PollScheduler::new(config.interval()).with_backoff(BackoffPolicy::from_config(config));

        let mut state = self.state.lock();
        let Some(conversation) = state.current(epoch) else {
            return;
        };

        let weak: Weak<ViewInner> = Arc::downgrade(self);
        let handle = scheduler.start(conversation.id, move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(inner) => inner.poll_once(epoch).await,
                    None => PollOutcome::Stale,
                }
            }
        });
        conversation.poller = Some(handle);
    }

    /// Epoch and id of the active conversation
    pub(crate) fn active(&self) -> SyncResult<(Epoch, ConversationId)> {
        self.state
            .lock()
            .active
            .as_ref()
            .map(|c| (c.epoch, c.id))
            .ok_or(SyncError::NoActiveConversation)
    }
}

/// One view over at most one open conversation
pub struct ConversationView {
    pub(crate) inner: Arc<ViewInner>,
}

impl ConversationView {
    pub fn new(ctx: SyncContext) -> Self {
        let (snapshots, _) = watch::channel(ConversationSnapshot::default());
        Self {
            inner: Arc::new(ViewInner {
                ctx,
                state: Mutex::new(ViewState::default()),
                snapshots,
            }),
        }
    }

    /// Make `id` the active conversation.
    ///
    /// Drops the previous conversation's state and timer, marks the new one
    /// read in the background, loads the first page, and starts polling.
    /// Opening the conversation that is already active changes nothing.
    #[instrument(skip_all, fields(conversation_id = %id))]
    pub async fn open(&self, id: ConversationId) -> ConversationSnapshot {
        let ctx = &self.inner.ctx;
        let epoch = {
            let mut state = self.inner.state.lock();
            if state.active.as_ref().is_some_and(|c| c.id == id) {
                return state.snapshot(ctx.config());
            }

            let rules = StagingRules::from_config(&ctx.config().attachments);
            let epoch = state.activate(id, ctx.current_user(), rules);
            if let Some(conversation) = state.current(epoch) {
                conversation.flags.initial_loading = true;
            }
            self.inner.publish(&state);
            epoch
        };
        info!("Conversation opened");

        self.inner.spawn_mark_read(id);
        self.inner.initial_load(epoch).await;
        self.inner.load_participants(epoch, id).await;
        self.inner.start_polling(epoch);

        self.snapshot()
    }

    /// Close the active conversation and stop its timer
    #[instrument(skip(self))]
    pub fn close(&self) {
        let mut state = self.inner.state.lock();
        if let Some(conversation) = state.deactivate() {
            info!(conversation_id = %conversation.id, "Conversation closed");
        }
        self.inner.publish(&state);
    }

    pub fn active_conversation(&self) -> Option<ConversationId> {
        self.inner.state.lock().active.as_ref().map(|c| c.id)
    }

    /// Whether a poll timer is running for the active conversation
    pub fn is_polling_scheduled(&self) -> bool {
        self.inner
            .state
            .lock()
            .active
            .as_ref()
            .and_then(|c| c.poller.as_ref())
            .is_some_and(|p| !p.is_finished())
    }

    /// Run one incremental fetch now, unless one is already outstanding
    pub async fn poll_now(&self) -> SyncResult<PollOutcome> {
        let (epoch, _) = self.inner.active()?;
        Ok(self.inner.poll_once(epoch).await)
    }

    /// Re-fetch participant presence; failures are logged only
    pub async fn refresh_participants(&self) -> SyncResult<()> {
        let (epoch, id) = self.inner.active()?;
        self.inner.load_participants(epoch, id).await;
        Ok(())
    }

    pub fn set_draft(&self, text: impl Into<String>) -> SyncResult<()> {
        let mut state = self.inner.state.lock();
        let conversation = state.active.as_mut().ok_or(SyncError::NoActiveConversation)?;
        conversation.draft = text.into();
        self.inner.publish(&state);
        Ok(())
    }

    /// Stage selected files for the next send.
    ///
    /// Unsupported types are dropped silently; the report lists files that
    /// were refused with a message for the user.
    pub fn stage_files(
        &self,
        files: impl IntoIterator<Item = SelectedFile>,
    ) -> SyncResult<StagingReport> {
        let mut state = self.inner.state.lock();
        let conversation = state.active.as_mut().ok_or(SyncError::NoActiveConversation)?;
        let report = conversation.staging.add(files);
        if !report.staged.is_empty() {
            self.inner.publish(&state);
        }
        Ok(report)
    }

    pub fn unstage(&self, local_id: Uuid) -> SyncResult<bool> {
        let mut state = self.inner.state.lock();
        let conversation = state.active.as_mut().ok_or(SyncError::NoActiveConversation)?;
        let removed = conversation.staging.remove(local_id);
        if removed {
            self.inner.publish(&state);
        }
        Ok(removed)
    }

    /// Receive a snapshot after every state change
    pub fn subscribe(&self) -> watch::Receiver<ConversationSnapshot> {
        self.inner.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        self.inner.snapshots.borrow().clone()
    }
}

impl Drop for ConversationView {
    fn drop(&mut self) {
        self.inner.state.lock().deactivate();
    }
}

impl std::fmt::Debug for ConversationView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationView")
            .field("active", &self.active_conversation())
            .finish()
    }
}
