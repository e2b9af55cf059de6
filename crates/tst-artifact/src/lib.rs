//! TST Artifact System
//!
//! Value types shared by every stage of the compile-once pipeline.
//!
//! # Core Concepts
//!
//! - [`Fingerprint`]: 7-character base-36 digest of text
//! - [`CacheKey`]: content tag followed by the configuration fingerprint
//! - [`ScriptTarget`]: one discovered snippet holder
//! - [`SourceRecord`]: loaded text plus its content tag
//! - [`CompiledArtifact`]: marker-wrapped output ready for injection
//!
//! # Example
//!
//! ```rust
//! use tst_artifact::{CacheKey, Fingerprint};
//!
//! let config = Fingerprint::compute(r#"{"minify":true}"#);
//! let key = CacheKey::new(&Fingerprint::compute("let a = 1").to_string(), config);
//! assert_eq!(key.as_str().len(), 14);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod artifact;
mod fingerprint;
mod key;
mod target;

pub use artifact::CompiledArtifact;
pub use fingerprint::{Fingerprint, FingerprintError, FINGERPRINT_WIDTH};
pub use key::CacheKey;
pub use target::{ScriptTarget, SourceRecord, TargetLabel};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn inline_target_to_key() {
        let target = ScriptTarget::inline("text/typescript", "const a: number = 1;");
        let text = target.inline_text().unwrap();
        let record = SourceRecord::new(text, Fingerprint::compute(text).to_string());

        let config = Fingerprint::compute_serializable(&serde_json::json!({})).unwrap();
        let key = CacheKey::new(&record.content_tag, config);

        assert!(key.as_str().starts_with(&record.content_tag));
        assert!(key.as_str().ends_with(&config.to_string()));
    }
}
