//! Sync context - dependency container for conversation views
//!
//! Holds the message store, configuration, and the identity of the signed-in
//! user. Cheap to clone; every view gets its own copy.

use std::sync::Arc;

use convo_common::SyncConfig;
use convo_core::{MessageStore, Snowflake};

use crate::error::{SyncError, SyncResult};

/// Sync context containing all dependencies
#[derive(Clone)]
pub struct SyncContext {
    store: Arc<dyn MessageStore>,
    config: Arc<SyncConfig>,
    current_user: Snowflake,
}

impl SyncContext {
    /// Create a new sync context
    pub fn new(store: Arc<dyn MessageStore>, config: SyncConfig, current_user: Snowflake) -> Self {
        Self {
            store,
            config: Arc::new(config),
            current_user,
        }
    }

    /// Get the message store
    pub fn store(&self) -> &dyn MessageStore {
        self.store.as_ref()
    }

    /// Get a shared handle to the message store (for detached tasks)
    pub fn store_handle(&self) -> Arc<dyn MessageStore> {
        Arc::clone(&self.store)
    }

    /// Get the configuration
    pub fn config(&self) -> &SyncConfig {
        self.config.as_ref()
    }

    /// The signed-in user; author of sends and target of mark-as-read
    pub fn current_user(&self) -> Snowflake {
        self.current_user
    }
}

impl std::fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContext")
            .field("store", &"dyn MessageStore")
            .field("config", &self.config)
            .field("current_user", &self.current_user)
            .finish()
    }
}

/// Builder for creating SyncContext with custom configuration
#[derive(Default)]
pub struct SyncContextBuilder {
    store: Option<Arc<dyn MessageStore>>,
    config: Option<SyncConfig>,
    current_user: Option<Snowflake>,
}

impl SyncContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(mut self, store: Arc<dyn MessageStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(mut self, config: SyncConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn current_user(mut self, user_id: Snowflake) -> Self {
        self.current_user = Some(user_id);
        self
    }

    /// Build the SyncContext
    ///
    /// Configuration falls back to defaults; store and user are required.
    ///
    /// # Errors
    /// Returns `SyncError::Validation` if a required dependency is missing
    pub fn build(self) -> SyncResult<SyncContext> {
        Ok(SyncContext::new(
            self.store
                .ok_or_else(|| SyncError::validation("store is required"))?,
            self.config.unwrap_or_default(),
            self.current_user
                .ok_or_else(|| SyncError::validation("current_user is required"))?,
        ))
    }
}
