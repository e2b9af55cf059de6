//! Error types for cache operations
//!
//! Provides error handling for:
//! - Store operations (persistent medium access)
//! - Cache lookups (miss signalling)

use std::path::PathBuf;

/// Errors raised by a persistent store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error while reading or writing the backing file
    #[error("store io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing file exists but does not hold a key-value map
    #[error("corrupt store file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors during cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// No stored entry matches the requested name
    ///
    /// A miss, not a fault: callers turn this into a compile.
    #[error("unknown cache name '{0}'")]
    NotFound(String),

    /// Backing store failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl CacheError {
    /// Check if error is a plain cache miss
    #[inline]
    #[must_use]
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = CacheError::NotFound("abc0000000".to_string());
        assert_eq!(err.to_string(), "unknown cache name 'abc0000000'");
        assert!(err.is_miss());
    }

    #[test]
    fn store_error_converts() {
        let err = StoreError::io_error(
            "/tmp/store.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let cache_err: CacheError = err.into();
        assert!(!cache_err.is_miss());
        assert!(cache_err.to_string().contains("store.json"));
    }
}
