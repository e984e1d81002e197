//! Pagination controller
//!
//! Backward paging on explicit user request. Shares the merge path with
//! polling, so a page and a poll landing in either order give the same list.

use tracing::{debug, instrument, warn};

use crate::error::{SyncError, SyncResult};
use crate::view::ConversationView;

impl ConversationView {
    /// Fetch one page strictly older than the oldest loaded message.
    ///
    /// Returns the updated `has_more`. A no-op when history is exhausted or a
    /// page is already in flight. Fetch failures are logged and leave the
    /// state as it was so the user can simply ask again.
    #[instrument(skip(self))]
    pub async fn load_older(&self) -> SyncResult<bool> {
        let page_size = self.inner.ctx.config().pagination.page_size();

        let (epoch, id, query) = {
            let mut state = self.inner.state.lock();
            let conversation = state
                .active
                .as_mut()
                .ok_or(SyncError::NoActiveConversation)?;
            if conversation.flags.paginating {
                return Ok(conversation.cursor.has_more());
            }
            let Some(query) = conversation.cursor.page_query(page_size) else {
                return Ok(false);
            };

            conversation.flags.paginating = true;
            let request = (conversation.epoch, conversation.id, query);
            self.inner.publish(&state);
            request
        };

        let result = self.inner.ctx.store().fetch_messages(id, query).await;

        let mut state = self.inner.state.lock();
        let Some(conversation) = state.current(epoch) else {
            debug!(conversation_id = %id, "Discarding page for inactive conversation");
            return Ok(false);
        };
        conversation.flags.paginating = false;

        match result {
            Ok(batch) => {
                let new = conversation.absorb(&batch);
                conversation.cursor.record_page(&batch, query.limit);
                debug!(
                    conversation_id = %id,
                    fetched = batch.len(),
                    new,
                    has_more = conversation.cursor.has_more(),
                    "Older page merged"
                );
            }
            Err(e) => {
                warn!(conversation_id = %id, error = %e, "Loading older messages failed");
            }
        }

        let has_more = conversation.cursor.has_more();
        self.inner.publish(&state);
        Ok(has_more)
    }
}
