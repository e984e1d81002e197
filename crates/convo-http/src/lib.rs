//! # convo-http
//!
//! HTTP layer implementing the `MessageStore` port against a JSON REST API.
//!
//! ## Overview
//!
//! - Wire models with serde derives
//! - Wire model → entity mappers
//! - `HttpMessageStore`, a reqwest client speaking JSON and multipart
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use convo_common::SyncConfig;
//! use convo_http::HttpMessageStore;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SyncConfig::from_env()?;
//!     let store = Arc::new(HttpMessageStore::from_config(&config)?);
//!
//!     // Hand the store to a SyncContext...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod store;

pub use store::HttpMessageStore;
