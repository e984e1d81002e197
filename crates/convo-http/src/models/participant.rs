//! Participant wire model

use chrono::{DateTime, Utc};
use convo_core::Snowflake;
use serde::Deserialize;

/// Member presence as returned by the participants endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantModel {
    pub user_id: Snowflake,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub online: bool,
    #[serde(default, alias = "last_seen")]
    pub last_seen_at: Option<DateTime<Utc>>,
}
