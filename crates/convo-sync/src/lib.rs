//! # convo-sync
//!
//! Conversation synchronization core: merge engine, cursors, poll
//! scheduling, backward pagination, confirm-then-merge sends, attachment
//! staging, and read/presence tracking, orchestrated by [`ConversationView`].
//!
//! The engine is conversation-agnostic; task comment threads and engagement
//! chats run through the same code, parameterized only by the
//! [`MessageStore`](convo_core::MessageStore) behind the [`SyncContext`].

pub mod backoff;
pub mod context;
pub mod cursor;
pub mod dto;
pub mod error;
pub mod merge;
pub mod pagination;
pub mod poll;
pub mod presence;
pub mod send;
pub mod staging;
pub mod state;
pub mod view;

pub use backoff::BackoffPolicy;
pub use context::{SyncContext, SyncContextBuilder};
pub use cursor::CursorState;
pub use dto::{
    AttachmentView, ConversationSnapshot, MessageView, ParticipantView, SendMessageRequest,
    StagedFileView, SyncFlags,
};
pub use error::{SyncError, SyncResult};
pub use merge::{merge, MessageList};
pub use poll::{PollHandle, PollOutcome, PollScheduler};
pub use presence::{PresenceLine, ReadTracker};
pub use send::validate_send;
pub use staging::{AttachmentStaging, SelectedFile, StagedFile, StagingReport, StagingRules};
pub use view::ConversationView;
