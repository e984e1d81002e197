//! Read/presence tracker
//!
//! Derives the delivery status shown on outgoing messages and the presence
//! line shown per participant.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use convo_core::{DeliveryStatus, Message, MessageReceipts, Participant, Receipt, Snowflake};
use serde::Serialize;

/// Shown delivery status of the current user's messages.
///
/// The status of a message is the slowest recipient's acknowledgement. Each
/// message keeps a high-water mark so a later fetch carrying older receipt
/// data can never move the shown status backwards.
#[derive(Debug, Clone)]
pub struct ReadTracker {
    current_user: Snowflake,
    shown: HashMap<Snowflake, DeliveryStatus>,
}

impl ReadTracker {
    pub fn new(current_user: Snowflake) -> Self {
        Self {
            current_user,
            shown: HashMap::new(),
        }
    }

    /// Fold the receipts of a fetched batch in
    pub fn observe(&mut self, batch: &[Message]) {
        for message in batch.iter().filter(|m| m.author_id == self.current_user) {
            let status = recipient_status(&message.receipts, message.author_id);
            self.shown
                .entry(message.id)
                .and_modify(|s| *s = (*s).max(status))
                .or_insert(status);
        }
    }

    /// Fold refreshed receipts in.
    ///
    /// Only messages already tracked as outgoing are updated; a refresh
    /// never introduces new ones.
    pub fn observe_receipts(&mut self, refreshed: &[MessageReceipts]) {
        for entry in refreshed {
            if let Some(shown) = self.shown.get_mut(&entry.message_id) {
                let status = recipient_status(&entry.receipts, self.current_user);
                *shown = (*shown).max(status);
            }
        }
    }

    /// Outgoing messages not yet read by every recipient, newest first,
    /// at most `limit` of them
    pub fn pending(&self, limit: usize) -> Vec<Snowflake> {
        let mut ids: Vec<Snowflake> = self
            .shown
            .iter()
            .filter(|(_, status)| **status < DeliveryStatus::Read)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable_by(|a, b| b.cmp(a));
        ids.truncate(limit);
        ids
    }

    /// Status to display, or `None` for messages from other participants
    pub fn status(&self, message: &Message) -> Option<DeliveryStatus> {
        if message.author_id != self.current_user {
            return None;
        }
        Some(
            self.shown
                .get(&message.id)
                .copied()
                .unwrap_or_else(|| recipient_status(&message.receipts, message.author_id)),
        )
    }

    pub fn is_outgoing(&self, message: &Message) -> bool {
        message.author_id == self.current_user
    }
}

fn recipient_status(receipts: &[Receipt], author: Snowflake) -> DeliveryStatus {
    DeliveryStatus::aggregate(
        receipts
            .iter()
            .filter(|r| r.user_id != author)
            .map(|r| r.status),
    )
}

/// Presence line of one participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "at", rename_all = "snake_case")]
pub enum PresenceLine {
    Online,
    LastSeen(DateTime<Utc>),
    Unknown,
}

impl PresenceLine {
    /// Human-readable line relative to `now`
    pub fn describe(&self, now: DateTime<Utc>) -> String {
        match self {
            Self::Online => "online".to_string(),
            Self::Unknown => "offline".to_string(),
            Self::LastSeen(at) => {
                let elapsed = now.signed_duration_since(*at);
                if elapsed < Duration::minutes(1) {
                    "last seen just now".to_string()
                } else if elapsed < Duration::hours(1) {
                    format!("last seen {} min ago", elapsed.num_minutes())
                } else if elapsed < Duration::days(1) {
                    format!("last seen {} h ago", elapsed.num_hours())
                } else {
                    format!("last seen on {}", at.format("%Y-%m-%d"))
                }
            }
        }
    }
}

impl From<&Participant> for PresenceLine {
    fn from(participant: &Participant) -> Self {
        match (participant.online, participant.last_seen) {
            (true, _) => Self::Online,
            (false, Some(at)) => Self::LastSeen(at),
            (false, None) => Self::Unknown,
        }
    }
}
