//! Configuration structs

mod sync_config;

pub use sync_config::{
    AppSettings, AttachmentConfig, ConfigError, Environment, PaginationConfig, PollConfig,
    RemoteConfig, SyncConfig, MAX_PAGE_SIZE,
};
