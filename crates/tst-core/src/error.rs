//! Error types for the TST pipeline
//!
//! Provides error handling for:
//! - Content-type policy violations
//! - Network fetch failures
//! - External compiler failures
//! - Configuration parsing
//!
//! Per-target errors are caught by the pipeline and reported as warnings;
//! configuration and cache-maintenance errors abort the run.

use tst_artifact::FingerprintError;
use tst_cache::CacheError;

/// Main pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Disallowed content type
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Fetch failed
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// External compiler failed
    #[error("compiler error: {0}")]
    Compiler(#[from] CompilerError),

    /// Cache medium failed
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// Configuration could not be read
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// Check if error belongs to a single target
    ///
    /// Target-local errors skip that target; everything else aborts the run.
    #[inline]
    #[must_use]
    pub fn is_target_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Network(_) | Self::Compiler(_) | Self::Cache(_)
        )
    }
}

/// Content-type policy violations
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Target declares a type outside the allow-list
    #[error("{target} declares disallowed content type '{content_type}'")]
    DeclaredType { target: String, content_type: String },

    /// Fetched response carries a type outside the allow-list
    #[error("{url} responded with disallowed content type {content_type:?}")]
    ResponseType {
        url: String,
        content_type: Option<String>,
    },
}

/// Fetch failures (never retried)
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Nothing inline and nowhere to fetch from
    #[error("{0} has no inline text and no source location")]
    MissingLocation(String),

    /// Location is not a valid URL
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Transport-level failure
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// Server answered with a non-success status
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },
}

impl NetworkError {
    /// Create request error for url
    pub fn request(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Request {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// External compiler failures
#[derive(Debug, thiserror::Error)]
pub enum CompilerError {
    /// Source rejected or transform crashed
    #[error("transform failed: {0}")]
    Failed(String),

    /// Compiler could not be reached or loaded
    #[error("compiler unavailable: {0}")]
    Unavailable(String),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Compiler config descriptor is not valid JSON
    #[error("invalid compiler config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Pipeline settings are not valid TOML
    #[error("invalid pipeline config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Config could not be fingerprinted
    #[error("cannot fingerprint config: {0}")]
    Fingerprint(#[from] FingerprintError),
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
