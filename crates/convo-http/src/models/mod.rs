//! Wire models
//!
//! JSON shapes exchanged with the remote API.

mod message;
mod participant;

pub use message::{
    AttachmentModel, MarkReadBody, MessageModel, MessageReceiptsModel, ReceiptModel,
};
pub use participant::ParticipantModel;

use serde::Deserialize;

/// `{ "data": ... }` response wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}
