//! Merge engine
//!
//! The only code path that changes a conversation's message list. Polls,
//! pagination pages, and confirmed sends all land here, so interleaved
//! responses cannot corrupt each other: merging is idempotent and the result
//! does not depend on the order batches arrive in.

use std::collections::HashSet;

use convo_core::{Message, Snowflake};

/// Merge `batch` into `existing`.
///
/// `existing` must already be deduplicated and ordered by
/// `(created_at, id)`. `batch` may overlap `existing`, repeat ids, or arrive
/// in any order. Messages already present keep their existing version.
pub fn merge(existing: &[Message], batch: &[Message]) -> Vec<Message> {
    let mut seen: HashSet<Snowflake> = existing.iter().map(|m| m.id).collect();

    let mut merged = Vec::with_capacity(existing.len() + batch.len());
    merged.extend_from_slice(existing);
    merged.extend(batch.iter().filter(|m| seen.insert(m.id)).cloned());

    merged.sort_by_key(Message::sort_key);
    merged
}

/// Canonical, deduplicated, ordered message list of one conversation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageList {
    messages: Vec<Message>,
}

impl MessageList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a batch in; returns how many messages were new
    pub fn merge(&mut self, batch: &[Message]) -> usize {
        if batch.is_empty() {
            return 0;
        }
        let before = self.messages.len();
        self.messages = merge(&self.messages, batch);
        self.messages.len() - before
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn contains(&self, id: Snowflake) -> bool {
        self.messages.iter().any(|m| m.id == id)
    }

    pub fn oldest(&self) -> Option<&Message> {
        self.messages.first()
    }

    pub fn newest(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a MessageList {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
