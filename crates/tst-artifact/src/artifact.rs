//! Compiled artifacts ready for injection

/// Executable unit produced from one target
///
/// Immutable after construction; the marker is already folded into
/// [`code`](Self::code) so injection never needs to touch it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    code: String,
    content_type: String,
}

impl CompiledArtifact {
    /// Wrap compiled output with the executable marker
    #[must_use]
    pub fn new(marker: &str, compiled: &str, content_type: impl Into<String>) -> Self {
        Self {
            code: format!("{marker} {compiled}"),
            content_type: content_type.into(),
        }
    }

    /// Text to execute
    #[inline]
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Content-type marker for the injected unit
    #[inline]
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_prefixes_code() {
        let artifact = CompiledArtifact::new(
            "/* Compiled locally */",
            "console.log(1);",
            "application/javascript",
        );
        assert_eq!(artifact.code(), "/* Compiled locally */ console.log(1);");
        assert_eq!(artifact.content_type(), "application/javascript");
    }
}
