//! Store implementations

mod error;
mod message;

pub use error::{check_status, decode, map_transport_error};
pub use message::HttpMessageStore;
