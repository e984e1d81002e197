//! Domain entities - core conversation objects

mod conversation;
mod message;
mod participant;

pub use conversation::{ConversationId, ConversationKind};
pub use message::{Attachment, DeliveryStatus, Message};
pub use participant::{MessageReceipts, Participant, Receipt};
