//! Script targets and their loaded source
//!
//! A [`ScriptTarget`] is the immutable description of one discovered
//! snippet holder; a [`SourceRecord`] is what loading it produces.

use std::fmt::{self, Display, Formatter};

/// One discovered source-bearing unit
///
/// Mirrors the attributes the pipeline reads from a page script element.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScriptTarget {
    /// Remote location (`src`)
    pub src: Option<String>,
    /// Declared content type (`type`); empty when undeclared
    pub content_type: String,
    /// Inline text content
    pub text: Option<String>,
    /// Marker attribute (`data-model`)
    pub model: Option<String>,
}

impl ScriptTarget {
    /// Target with inline text
    #[must_use]
    pub fn inline(content_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Target loaded from a remote location
    #[must_use]
    pub fn remote(content_type: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            content_type: content_type.into(),
            ..Self::default()
        }
    }

    /// With marker attribute
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Inline text, if any non-empty text is present
    ///
    /// Empty inline text counts as absent.
    #[must_use]
    pub fn inline_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// Whether this target carries the given marker
    #[must_use]
    pub fn has_model(&self, model: &str) -> bool {
        self.model.as_deref() == Some(model)
    }

    /// Human-readable label for diagnostics
    #[must_use]
    pub fn label(&self) -> TargetLabel<'_> {
        TargetLabel(self)
    }
}

/// Display adapter naming a target in log output
#[derive(Debug, Clone, Copy)]
pub struct TargetLabel<'a>(&'a ScriptTarget);

impl Display for TargetLabel<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (&self.0.src, self.0.inline_text()) {
            (Some(src), _) => write!(f, "script {src}"),
            (None, Some(_)) => f.write_str("inline script"),
            (None, None) => f.write_str("empty script"),
        }
    }
}

/// Loaded source text paired with its content tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    /// Raw source text
    pub content: String,
    /// Server validation token, or computed fingerprint
    pub content_tag: String,
}

impl SourceRecord {
    /// Create record
    #[inline]
    #[must_use]
    pub fn new(content: impl Into<String>, content_tag: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_tag: content_tag.into(),
        }
    }
}
