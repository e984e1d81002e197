//! # convo-core
//!
//! Domain layer containing conversation entities, value objects, and the
//! message store port. This crate has zero dependencies on infrastructure
//! (HTTP client, runtime, configuration).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Attachment, ConversationId, ConversationKind, DeliveryStatus, Message, MessageReceipts,
    Participant, Receipt,
};
pub use error::DomainError;
pub use traits::{MessageQuery, MessageStore, NewMessage, StoreResult, UploadFile};
pub use value_objects::{Snowflake, SnowflakeParseError};
