//! Content-addressed compile cache
//!
//! Stores compiled output under timestamped keys of the form
//! `<prefix>::<name>__<epoch-millis>` on top of an injected [`Store`].

use crate::clock::{Clock, SystemClock};
use crate::error::CacheError;
use crate::store::Store;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Default key namespace
pub const DEFAULT_PREFIX: &str = "ts-script-tag";

/// Default entry lifetime in days
pub const DEFAULT_LIFETIME_DAYS: u32 = 30;

const NAME_SEPARATOR: &str = "::";
const TIMESTAMP_SEPARATOR: &str = "__";

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries under this cache's prefix
    pub entry_count: usize,
}

/// Keyed store with append-only insertion and age-based eviction
///
/// # Semantics
/// - `put` never overwrites: each call adds a new timestamped entry
/// - `get` returns the first entry, in store enumeration order, whose stored
///   key contains `<prefix>::<name>`; it is *not* "most recent wins"
/// - `clean` drops entries strictly older than the lifetime
#[derive(Debug, Clone)]
pub struct ContentAddressedCache {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    prefix: String,
}

impl ContentAddressedCache {
    /// Cache over `store` with the system clock and default prefix
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    /// With key namespace
    #[inline]
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// With time source
    #[inline]
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Key namespace
    #[inline]
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Insert a new entry for `name`
    ///
    /// # Errors
    /// Returns `CacheError::Store` if the medium rejects the write
    pub async fn put(&self, name: &str, value: &str) -> Result<(), CacheError> {
        let needle = self.needle(name);
        let mut timestamp = self.clock.now().timestamp_millis();
        let mut key = stored_key(&needle, timestamp);

        // Same name within the same millisecond: bump rather than overwrite
        while self.store.get(&key).await?.is_some() {
            timestamp += 1;
            key = stored_key(&needle, timestamp);
        }

        self.store.set(&key, value).await?;
        tracing::debug!("Cached {}", key);
        Ok(())
    }

    /// Look up the value stored for `name`
    ///
    /// Only keys in this cache's namespace are considered, so a prefix that
    /// ends another cache's prefix never reads its entries.
    ///
    /// # Errors
    /// - `CacheError::NotFound` when no stored key matches (a miss)
    /// - `CacheError::Store` if the medium fails
    pub async fn get(&self, name: &str) -> Result<String, CacheError> {
        let namespace = self.namespace();
        let needle = self.needle(name);
        for key in self.store.keys().await? {
            if !key.starts_with(&namespace) || !key.contains(&needle) {
                continue;
            }
            if let Some(value) = self.store.get(&key).await? {
                return Ok(value);
            }
        }
        Err(CacheError::NotFound(name.to_string()))
    }

    /// Check if any entry exists for `name`
    pub async fn contains(&self, name: &str) -> bool {
        self.get(name).await.is_ok()
    }

    /// Evict entries older than `lifetime_days`
    ///
    /// Only keys in this cache's namespace with a parsable timestamp are
    /// considered. An entry exactly `lifetime_days` old is retained.
    ///
    /// # Returns
    /// Number of evicted entries
    ///
    /// # Errors
    /// Returns `CacheError::Store` if the medium fails
    pub async fn clean(&self, lifetime_days: u32) -> Result<usize, CacheError> {
        let now = self.clock.now();
        let lifetime = Duration::days(i64::from(lifetime_days));
        let mut evicted = 0;

        for key in self.store.keys().await? {
            let Some(stored_at) = self.timestamp_of(&key) else {
                continue;
            };
            if now - stored_at > lifetime {
                self.store.remove(&key).await?;
                tracing::debug!("Evicted {}", key);
                evicted += 1;
            }
        }

        tracing::info!("Cache maintenance evicted {} entries", evicted);
        Ok(evicted)
    }

    /// Get cache statistics
    ///
    /// # Errors
    /// Returns `CacheError::Store` if the medium fails
    pub async fn stats(&self) -> Result<CacheStats, CacheError> {
        let namespace = self.namespace();
        let entry_count = self
            .store
            .keys()
            .await?
            .iter()
            .filter(|k| k.starts_with(&namespace))
            .count();
        Ok(CacheStats { entry_count })
    }

    fn namespace(&self) -> String {
        format!("{}{}", self.prefix, NAME_SEPARATOR)
    }

    fn needle(&self, name: &str) -> String {
        format!("{}{}{}", self.prefix, NAME_SEPARATOR, name)
    }

    fn timestamp_of(&self, key: &str) -> Option<DateTime<Utc>> {
        let rest = key
            .strip_prefix(self.prefix.as_str())?
            .strip_prefix(NAME_SEPARATOR)?;
        let (_, millis) = rest.rsplit_once(TIMESTAMP_SEPARATOR)?;
        DateTime::from_timestamp_millis(millis.parse().ok()?)
    }
}

fn stored_key(needle: &str, timestamp: i64) -> String {
    format!("{needle}{TIMESTAMP_SEPARATOR}{timestamp}")
}
