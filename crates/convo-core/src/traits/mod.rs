//! Ports the domain needs from the outside world

mod store;

pub use store::{MessageQuery, MessageStore, NewMessage, StoreResult, UploadFile};
