//! Tracing subscriber setup
//!
//! The pipeline only emits `tracing` events; hosts call [`init_tracing`] once
//! if they want them printed.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Subscriber options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub default_filter: String,
    /// Emit JSON lines instead of human-readable text
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// With default filter
    #[inline]
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    /// Enable JSON format
    #[inline]
    #[must_use]
    pub fn with_json_format(mut self) -> Self {
        self.json_format = true;
        self
    }
}

/// Install a global subscriber
///
/// Returns `false` if one was already installed, which makes repeated calls
/// from tests harmless.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.json_format {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()
            .is_ok()
    } else {
        registry
            .with(fmt::layer().with_target(true).without_time())
            .try_init()
            .is_ok()
    }
}
