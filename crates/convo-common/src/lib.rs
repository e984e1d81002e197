//! # convo-common
//!
//! Shared utilities including configuration, error handling, and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{
    AppSettings, AttachmentConfig, ConfigError, Environment, PaginationConfig, PollConfig,
    RemoteConfig, SyncConfig, MAX_PAGE_SIZE,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
