//! Pipeline and compiler configuration
//!
//! [`PipelineConfig`] holds the pipeline's own settings; [`CompilerConfig`]
//! is the opaque record handed to the external compiler.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use tst_artifact::Fingerprint;
use tst_cache::{DEFAULT_LIFETIME_DAYS, DEFAULT_PREFIX};

/// Recognized script content types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptMime {
    /// `text/typescript`
    #[serde(rename = "text/typescript")]
    TextTypescript,
    /// `application/typescript`
    #[serde(rename = "application/typescript")]
    ApplicationTypescript,
    /// `text/x-typescript`
    #[serde(rename = "text/x-typescript")]
    TextXTypescript,
    /// `application/x-typescript`
    #[serde(rename = "application/x-typescript")]
    ApplicationXTypescript,
}

impl ScriptMime {
    /// Every recognized type
    pub const ALL: [ScriptMime; 4] = [
        ScriptMime::TextTypescript,
        ScriptMime::ApplicationTypescript,
        ScriptMime::TextXTypescript,
        ScriptMime::ApplicationXTypescript,
    ];

    /// MIME essence string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptMime::TextTypescript => "text/typescript",
            ScriptMime::ApplicationTypescript => "application/typescript",
            ScriptMime::TextXTypescript => "text/x-typescript",
            ScriptMime::ApplicationXTypescript => "application/x-typescript",
        }
    }

    /// Recognize a content-type header value
    ///
    /// Parameters (`; charset=...`) are ignored and matching is
    /// case-insensitive.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        Self::ALL.into_iter().find(|m| m.as_str() == essence)
    }
}

impl std::fmt::Display for ScriptMime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Content types accepted for compilation
    pub allowed_content_types: Vec<ScriptMime>,
    /// Cache entry lifetime in days
    pub cache_lifetime_days: u32,
    /// Cache key namespace
    pub cache_prefix: String,
    /// `data-model` value marking the compiler config descriptor
    pub config_marker: String,
    /// Text prepended to every injected unit
    pub compiled_marker: String,
    /// Content type set on injected units
    pub output_content_type: String,
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML; missing keys take their defaults
    ///
    /// # Errors
    /// Returns `ConfigError::Toml` on malformed input
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// With allowed content types
    #[inline]
    #[must_use]
    pub fn with_allowed_content_types(mut self, types: impl IntoIterator<Item = ScriptMime>) -> Self {
        self.allowed_content_types = types.into_iter().collect();
        self
    }

    /// With cache lifetime
    #[inline]
    #[must_use]
    pub fn with_cache_lifetime_days(mut self, days: u32) -> Self {
        self.cache_lifetime_days = days;
        self
    }

    /// With cache key namespace
    #[inline]
    #[must_use]
    pub fn with_cache_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_prefix = prefix.into();
        self
    }

    /// With config descriptor marker
    #[inline]
    #[must_use]
    pub fn with_config_marker(mut self, marker: impl Into<String>) -> Self {
        self.config_marker = marker.into();
        self
    }

    /// Whether a content type passes the allow-list
    #[must_use]
    pub fn allows(&self, content_type: &str) -> bool {
        ScriptMime::from_content_type(content_type)
            .is_some_and(|m| self.allowed_content_types.contains(&m))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            allowed_content_types: ScriptMime::ALL.to_vec(),
            cache_lifetime_days: DEFAULT_LIFETIME_DAYS,
            cache_prefix: DEFAULT_PREFIX.to_string(),
            config_marker: "swc-transpiler-config".to_string(),
            compiled_marker: "/* Compiled locally */".to_string(),
            output_content_type: "application/javascript".to_string(),
        }
    }
}

/// Opaque compiler configuration
///
/// Passed unmodified to the compiler. Serialization is canonical (object keys
/// sorted), so equal configs always fingerprint equally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompilerConfig(serde_json::Value);

impl CompilerConfig {
    /// Wrap a structured value
    #[inline]
    #[must_use]
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Parse descriptor text
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` if the text is not JSON
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(Self(serde_json::from_str(s)?))
    }

    /// Underlying value
    #[inline]
    #[must_use]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Fingerprint of the canonical serialization
    ///
    /// # Errors
    /// Returns `ConfigError::Fingerprint` if serialization fails
    pub fn fingerprint(&self) -> Result<Fingerprint, ConfigError> {
        Ok(Fingerprint::compute_serializable(&self.0)?)
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self(serde_json::json!({
            "jsc": {
                "target": "es2022",
                "parser": {
                    "syntax": "typescript",
                },
            },
            "minify": true,
            "sourceMaps": true,
            "module": {
                "type": "es6",
            },
        }))
    }
}
