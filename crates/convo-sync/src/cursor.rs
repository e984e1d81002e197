//! Cursor manager
//!
//! Tracks the time boundaries of what is held locally for one conversation
//! and turns them into the next fetch's query.

use chrono::{DateTime, Utc};
use convo_core::{Message, MessageQuery};

/// Time boundaries of one conversation's local list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorState {
    /// Timestamp of the newest message known locally; lower bound for polls
    newest_seen: Option<DateTime<Utc>>,
    /// Timestamp of the oldest message known locally; upper bound for pages
    oldest_loaded: Option<DateTime<Utc>>,
    /// Whether older history may still exist on the store
    has_more: bool,
    /// Whether an unbounded first page has been applied
    seeded: bool,
}

impl CursorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn newest_seen(&self) -> Option<DateTime<Utc>> {
        self.newest_seen
    }

    pub fn oldest_loaded(&self) -> Option<DateTime<Utc>> {
        self.oldest_loaded
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Query for the next incremental poll.
    ///
    /// With nothing seen yet the poll has no lower bound and behaves like a
    /// first page.
    pub fn poll_query(&self, limit: u32) -> MessageQuery {
        MessageQuery::newer_than(self.newest_seen, limit)
    }

    /// Query for the next backward page, or `None` when there is nothing
    /// older to ask for.
    pub fn page_query(&self, page_size: u32) -> Option<MessageQuery> {
        if !self.has_more {
            return None;
        }
        self.oldest_loaded
            .map(|until| MessageQuery::older_than(until, page_size))
    }

    /// Seed both cursors from an unbounded first page of `requested` items.
    pub fn record_initial(&mut self, batch: &[Message], requested: u32) {
        self.newest_seen = max_time(batch, self.newest_seen);
        self.oldest_loaded = min_time(batch, self.oldest_loaded);
        self.has_more = self.oldest_loaded.is_some() && is_full_page(batch, requested);
        self.seeded = true;
    }

    /// Advance after a successful incremental poll made with `query`.
    ///
    /// A poll without a lower bound (nothing seen yet) is answered with the
    /// newest page, so a full batch means older history may remain.
    pub fn record_poll(&mut self, batch: &[Message], query: MessageQuery) {
        if batch.is_empty() {
            return;
        }
        self.newest_seen = max_time(batch, self.newest_seen);
        if query.since.is_none() {
            self.oldest_loaded = min_time(batch, self.oldest_loaded);
            self.has_more = is_full_page(batch, query.limit);
        } else if self.oldest_loaded.is_none() {
            self.oldest_loaded = min_time(batch, None);
        }
    }

    /// Advance after a successful backward page of `requested` items.
    pub fn record_page(&mut self, batch: &[Message], requested: u32) {
        self.oldest_loaded = min_time(batch, self.oldest_loaded);
        if self.newest_seen.is_none() {
            self.newest_seen = max_time(batch, None);
        }
        self.has_more = is_full_page(batch, requested);
    }

    /// Account for a confirmed send.
    ///
    /// `newest_seen` is deliberately left alone: messages from other
    /// participants may sit between the last poll and the send's timestamp,
    /// and moving the poll bound past them would skip them for good. The
    /// next poll re-fetches the sent message and the merge drops the copy.
    pub fn record_sent(&mut self, message: &Message) {
        if self.oldest_loaded.is_none() {
            self.oldest_loaded = Some(message.created_at);
        }
    }
}

fn is_full_page(batch: &[Message], requested: u32) -> bool {
    batch.len() >= requested as usize
}

fn max_time(batch: &[Message], current: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    batch.iter().map(|m| m.created_at).chain(current).max()
}

fn min_time(batch: &[Message], current: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    batch.iter().map(|m| m.created_at).chain(current).min()
}
