//! Tracing and logging setup
//!
//! The engine runs inside a host application, so the filter built here only
//! raises the workspace crates to the configured level. Dependencies such as
//! `reqwest` and `hyper` stay at `warn` unless `RUST_LOG` says otherwise.

use tracing::{Level, Subscriber};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::{Environment, SyncConfig};

/// Targets whose level follows [`TracingConfig::level`]
const WORKSPACE_TARGETS: [&str; 4] = ["convo_core", "convo_common", "convo_sync", "convo_http"];

/// Subscriber options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for workspace crates when `RUST_LOG` is unset
    pub level: Level,
    /// Level for everything else
    pub dependency_level: Level,
    pub json: bool,
    /// Log span open/close; useful for following a poll or send end to end
    pub span_events: bool,
    pub file_line: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            dependency_level: Level::WARN,
            json: false,
            span_events: false,
            file_line: false,
        }
    }
}

impl TracingConfig {
    /// Debug output for the engine, pretty format with span events
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            span_events: true,
            file_line: true,
            ..Self::default()
        }
    }

    /// JSON lines at info
    #[must_use]
    pub fn production() -> Self {
        Self {
            json: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self::development(),
            Environment::Staging => Self::default(),
            Environment::Production => Self::production(),
        }
    }

    /// Preset for the environment named in a loaded config
    #[must_use]
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::for_environment(config.app.env)
    }

    /// Filter directives used when `RUST_LOG` is unset
    pub fn directives(&self) -> String {
        let level = self.level.as_str().to_ascii_lowercase();
        let mut directives = vec![self.dependency_level.as_str().to_ascii_lowercase()];
        directives.extend(
            WORKSPACE_TARGETS
                .iter()
                .map(|target| format!("{target}={level}")),
        );
        directives.join(",")
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directives()))
    }

    fn fmt_layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let span_events = if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let layer = fmt::layer()
            .with_target(true)
            .with_file(self.file_line)
            .with_line_number(self.file_line)
            .with_span_events(span_events);

        if self.json {
            layer.json().with_current_span(true).boxed()
        } else {
            layer.boxed()
        }
    }
}

/// Install the global subscriber for `config`'s environment.
///
/// Host applications that already installed a subscriber get
/// [`TracingError::AlreadyInitialized`] and can ignore it.
pub fn init_tracing(config: &SyncConfig) -> Result<(), TracingError> {
    try_init_tracing_with_config(TracingConfig::from_config(config))
}

/// Install the global subscriber with explicit options
pub fn try_init_tracing_with_config(config: TracingConfig) -> Result<(), TracingError> {
    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(config.fmt_layer())
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)
}

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}
