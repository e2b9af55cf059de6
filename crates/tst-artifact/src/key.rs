//! Cache key construction

use crate::fingerprint::Fingerprint;
use std::fmt::{self, Display, Formatter};

/// Opaque key identifying a compiled artifact
///
/// Built as `content_tag ++ config_fingerprint`. The key is only unique for
/// the lifetime of the configuration whose fingerprint it embeds; nothing
/// downstream re-checks that binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Combine a content tag with the configuration fingerprint
    #[must_use]
    pub fn new(content_tag: &str, config_fingerprint: Fingerprint) -> Self {
        Self(format!("{content_tag}{config_fingerprint}"))
    }

    /// Borrow the key text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_tag_then_fingerprint() {
        let config = Fingerprint::compute("abc");
        let key = CacheKey::new("\"etag-1\"", config);
        assert_eq!(key.as_str(), "\"etag-1\"00022ci");
    }

    #[test]
    fn different_config_different_key() {
        let a = CacheKey::new("tag", Fingerprint::compute("{}"));
        let b = CacheKey::new("tag", Fingerprint::compute("{\"minify\":true}"));
        assert_ne!(a, b);
    }
}
