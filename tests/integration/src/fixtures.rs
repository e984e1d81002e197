//! Test fixtures and data generators
//!
//! Provides reusable test data for integration tests.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use convo_core::{ConversationId, DeliveryStatus, Message, Participant, Receipt, Snowflake};

/// The signed-in user in every scenario
pub const ME: i64 = 1;
/// Another participant
pub const ALICE: i64 = 2;
/// A third participant
pub const BOB: i64 = 3;

/// Counter for unique owner ids
static COUNTER: AtomicI64 = AtomicI64::new(100);

/// Get a unique id for test data
pub fn unique_id() -> i64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Timestamp `secs` seconds after the epoch
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// A fresh task comment thread
pub fn task_thread() -> ConversationId {
    ConversationId::task(Snowflake::new(unique_id()))
}

/// A fresh engagement chat
pub fn engagement_chat() -> ConversationId {
    ConversationId::engagement(Snowflake::new(unique_id()))
}

/// Text message whose id equals its timestamp, which keeps scenarios readable
pub fn message(conversation: ConversationId, t: i64, author: i64) -> Message {
    Message::new(
        Snowflake::new(t),
        conversation,
        Snowflake::new(author),
        format!("message at {t}"),
        at(t),
    )
}

/// Messages from ALICE at each timestamp
pub fn history(conversation: ConversationId, times: &[i64]) -> Vec<Message> {
    times
        .iter()
        .map(|t| message(conversation, *t, ALICE))
        .collect()
}

/// Outgoing message with per-recipient acknowledgements
pub fn acknowledged(
    conversation: ConversationId,
    t: i64,
    receipts: &[(i64, DeliveryStatus)],
) -> Message {
    message(conversation, t, ME).with_receipts(
        receipts
            .iter()
            .map(|(user, status)| Receipt::new(Snowflake::new(*user), *status))
            .collect(),
    )
}

pub fn online(user: i64) -> Participant {
    Participant::new(Snowflake::new(user)).online()
}

pub fn away_since(user: i64, t: i64) -> Participant {
    Participant::new(Snowflake::new(user)).last_seen_at(at(t))
}
