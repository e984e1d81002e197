//! Sync configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present). Every value has a default except the remote API root, which is
//! only required by the HTTP store.

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Largest page the engine will ever request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Main sync configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub app: AppSettings,
    pub poll: PollConfig,
    pub pagination: PaginationConfig,
    pub attachments: AttachmentConfig,
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
    #[serde(default = "default_message_max_length")]
    pub message_max_length: usize,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// Poll scheduler configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
    /// Back off on consecutive failures instead of retrying every tick
    #[serde(default)]
    pub backoff_enabled: bool,
    #[serde(default = "default_poll_backoff_max_ms")]
    pub backoff_max_ms: u64,
    /// Upper bound on messages returned by one incremental fetch
    #[serde(default = "default_poll_limit")]
    pub limit: u32,
}

impl PollConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    #[must_use]
    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }

    /// Poll batch size clamped to `1..=MAX_PAGE_SIZE`
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            backoff_enabled: false,
            backoff_max_ms: default_poll_backoff_max_ms(),
            limit: default_poll_limit(),
        }
    }
}

/// Backward pagination configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_page_size")]
    pub initial_page_size: u32,
}

impl PaginationConfig {
    /// Page size clamped to `1..=MAX_PAGE_SIZE`
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    #[must_use]
    pub fn initial_page_size(&self) -> u32 {
        self.initial_page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            initial_page_size: default_page_size(),
        }
    }
}

/// Attachment staging and rendering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentConfig {
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: u32,
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_attachment_base_url")]
    pub base_url: String,
    /// Lowercase file extensions accepted at selection time
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl AttachmentConfig {
    #[must_use]
    pub fn max_file_size_bytes(&self) -> u64 {
        u64::from(self.max_file_size_mb) * 1024 * 1024
    }
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: default_max_file_size(),
            max_files: default_max_files(),
            base_url: default_attachment_base_url(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

/// Remote API configuration (HTTP store only)
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    #[serde(default = "default_remote_timeout_ms")]
    pub timeout_ms: u64,
    /// Bearer token sent with every request
    #[serde(default)]
    pub api_token: Option<String>,
}

impl RemoteConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// Default value functions
fn default_app_name() -> String {
    "convo-sync".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_poll_backoff_max_ms() -> u64 {
    60_000
}

fn default_poll_limit() -> u32 {
    MAX_PAGE_SIZE
}

fn default_page_size() -> u32 {
    20
}

fn default_max_file_size() -> u32 {
    10
}

fn default_max_files() -> usize {
    10
}

fn default_attachment_base_url() -> String {
    "http://127.0.0.1:8080/files".to_string()
}

fn default_allowed_extensions() -> Vec<String> {
    [
        "pdf", "doc", "docx", "txt", "rtf", "odt", "csv", "xls", "xlsx", "ods", "png", "jpg",
        "jpeg", "gif", "webp",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn default_remote_timeout_ms() -> u64 {
    10_000
}

fn default_message_max_length() -> usize {
    4_000
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: default_env(),
            },
            poll: PollConfig::default(),
            pagination: PaginationConfig::default(),
            attachments: AttachmentConfig::default(),
            remote: None,
            message_max_length: default_message_max_length(),
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is present but cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let remote = match lookup("REMOTE_BASE_URL") {
            Some(base_url) => Some(RemoteConfig {
                base_url,
                timeout_ms: parse_var(&lookup, "REMOTE_TIMEOUT_MS")?
                    .unwrap_or_else(default_remote_timeout_ms),
                api_token: lookup("REMOTE_API_TOKEN").filter(|t| !t.is_empty()),
            }),
            None => None,
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: parse_var(&lookup, "APP_ENV")?.unwrap_or_default(),
            },
            poll: PollConfig {
                interval_ms: parse_var(&lookup, "SYNC_POLL_INTERVAL_MS")?
                    .unwrap_or_else(default_poll_interval_ms),
                backoff_enabled: parse_var(&lookup, "SYNC_POLL_BACKOFF")?.unwrap_or(false),
                backoff_max_ms: parse_var(&lookup, "SYNC_POLL_BACKOFF_MAX_MS")?
                    .unwrap_or_else(default_poll_backoff_max_ms),
                limit: parse_var(&lookup, "SYNC_POLL_LIMIT")?.unwrap_or_else(default_poll_limit),
            },
            pagination: PaginationConfig {
                page_size: parse_var(&lookup, "SYNC_PAGE_SIZE")?.unwrap_or_else(default_page_size),
                initial_page_size: parse_var(&lookup, "SYNC_INITIAL_PAGE_SIZE")?
                    .unwrap_or_else(default_page_size),
            },
            attachments: AttachmentConfig {
                max_file_size_mb: parse_var(&lookup, "ATTACHMENT_MAX_FILE_SIZE_MB")?
                    .unwrap_or_else(default_max_file_size),
                max_files: parse_var(&lookup, "ATTACHMENT_MAX_FILES")?
                    .unwrap_or_else(default_max_files),
                base_url: lookup("ATTACHMENT_BASE_URL")
                    .unwrap_or_else(default_attachment_base_url),
                allowed_extensions: lookup("ATTACHMENT_ALLOWED_EXTENSIONS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|ext| !ext.is_empty())
                            .map(|ext| ext.trim_start_matches('.').to_lowercase())
                            .collect()
                    })
                    .unwrap_or_else(default_allowed_extensions),
            },
            remote,
            message_max_length: parse_var(&lookup, "MESSAGE_MAX_LENGTH")?
                .unwrap_or_else(default_message_max_length),
        })
    }

    /// Remote API configuration, required by the HTTP store
    pub fn require_remote(&self) -> Result<&RemoteConfig, ConfigError> {
        self.remote
            .as_ref()
            .ok_or(ConfigError::MissingVar("REMOTE_BASE_URL"))
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
