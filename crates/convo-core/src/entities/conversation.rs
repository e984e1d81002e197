//! Conversation identity - a task's comment thread or an engagement's chat

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::Snowflake;

/// Which surface a conversation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationKind {
    /// Comment thread attached to a to-do task
    TaskComments,
    /// Chat thread attached to a service engagement
    EngagementChat,
}

impl ConversationKind {
    /// Path segment used by the remote API for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskComments => "tasks",
            Self::EngagementChat => "engagements",
        }
    }

    /// Inverse of [`as_str`](Self::as_str)
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "tasks" => Some(Self::TaskComments),
            "engagements" => Some(Self::EngagementChat),
            _ => None,
        }
    }
}

impl fmt::Display for ConversationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversation identity: the owning object's id qualified by its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId {
    pub kind: ConversationKind,
    pub owner_id: Snowflake,
}

impl ConversationId {
    pub fn new(kind: ConversationKind, owner_id: Snowflake) -> Self {
        Self { kind, owner_id }
    }

    /// Comment thread of a task
    pub fn task(task_id: Snowflake) -> Self {
        Self::new(ConversationKind::TaskComments, task_id)
    }

    /// Chat of an engagement
    pub fn engagement(engagement_id: Snowflake) -> Self {
        Self::new(ConversationKind::EngagementChat, engagement_id)
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.owner_id)
    }
}
