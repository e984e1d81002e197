//! Participant and receipt entities - presence and acknowledgement state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::DeliveryStatus;
use crate::value_objects::Snowflake;

/// Conversation member as reported by the presence endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: Snowflake,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

impl Participant {
    pub fn new(user_id: Snowflake) -> Self {
        Self {
            user_id,
            display_name: None,
            online: false,
            last_seen: None,
        }
    }

    #[must_use]
    pub fn online(mut self) -> Self {
        self.online = true;
        self
    }

    #[must_use]
    pub fn last_seen_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_seen = Some(at);
        self
    }
}

/// One recipient's acknowledgement of one message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub user_id: Snowflake,
    pub status: DeliveryStatus,
}

impl Receipt {
    pub fn new(user_id: Snowflake, status: DeliveryStatus) -> Self {
        Self { user_id, status }
    }
}

/// Latest acknowledgements of one message, as returned by a receipt refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipts {
    pub message_id: Snowflake,
    pub receipts: Vec<Receipt>,
}

impl MessageReceipts {
    pub fn new(message_id: Snowflake, receipts: Vec<Receipt>) -> Self {
        Self {
            message_id,
            receipts,
        }
    }
}
