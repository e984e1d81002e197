//! Data transfer objects for the view layer
//!
//! This module provides:
//! - Request DTOs with validation for user input
//! - Snapshot DTOs handed to subscribers
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::SendMessageRequest;

pub use responses::{
    AttachmentView, ConversationSnapshot, MessageView, ParticipantView, StagedFileView,
    SyncFlags,
};
