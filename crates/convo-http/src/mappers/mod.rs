//! Wire model → entity mappers

mod message;
mod participant;

pub use message::relative_path;
