//! Compiler configuration discovery

use crate::config::CompilerConfig;
use crate::context::ExecutionContext;
use crate::error::{NetworkError, PipelineError};
use crate::fetch::Fetcher;
use std::sync::Arc;
use tst_artifact::ScriptTarget;

/// Locates and reads the page's compiler config descriptor
#[derive(Clone)]
pub struct ConfigResolver {
    fetcher: Arc<dyn Fetcher>,
    marker: String,
}

impl ConfigResolver {
    /// Resolver for descriptors marked with `marker`
    #[inline]
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>, marker: impl Into<String>) -> Self {
        Self {
            fetcher,
            marker: marker.into(),
        }
    }

    /// Marker attribute value
    #[inline]
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Whether `target` is the config descriptor
    #[inline]
    #[must_use]
    pub fn is_descriptor(&self, target: &ScriptTarget) -> bool {
        target.has_model(&self.marker)
    }

    /// Read the config descriptor, if the page has one
    ///
    /// The first marked target wins. Inline text is used when present,
    /// otherwise the descriptor's location is fetched.
    ///
    /// # Returns
    /// `None` when no descriptor exists; the caller supplies the default.
    ///
    /// # Errors
    /// - `NetworkError` if the descriptor must be fetched and that fails
    /// - `ConfigError::Parse` if the text is not JSON
    pub async fn resolve(
        &self,
        ctx: &dyn ExecutionContext,
    ) -> Result<Option<CompilerConfig>, PipelineError> {
        let Some(descriptor) = ctx.discover().into_iter().find(|t| self.is_descriptor(t)) else {
            tracing::debug!("No compiler config descriptor found");
            return Ok(None);
        };

        let json = match descriptor.inline_text() {
            Some(text) => text.to_string(),
            None => {
                let src = descriptor
                    .src
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| NetworkError::MissingLocation(descriptor.label().to_string()))?;
                self.fetcher.fetch(src).await?.body
            }
        };

        Ok(Some(CompilerConfig::from_json_str(&json)?))
    }
}

impl std::fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigResolver")
            .field("marker", &self.marker)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Document;
    use crate::error::ConfigError;
    use crate::fetch::{FetchResponse, MockFetcher};

    const MARKER: &str = "swc-transpiler-config";

    fn resolver(fetcher: MockFetcher) -> ConfigResolver {
        ConfigResolver::new(Arc::new(fetcher), MARKER)
    }

    fn no_network() -> MockFetcher {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch().never();
        fetcher
    }

    #[tokio::test]
    async fn absent_descriptor_is_none() {
        let doc = Document::new().with_target(ScriptTarget::inline("", "let a = 1"));
        let config = resolver(no_network()).resolve(&doc).await.unwrap();
        assert!(config.is_none());
    }

    #[tokio::test]
    async fn inline_descriptor() {
        let doc = Document::new().with_target(
            ScriptTarget::inline("application/json", r#"{"minify":false}"#).with_model(MARKER),
        );

        let config = resolver(no_network()).resolve(&doc).await.unwrap().unwrap();
        assert_eq!(config.as_value()["minify"], false);
    }

    #[tokio::test]
    async fn remote_descriptor() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(FetchResponse::new("application/json", r#"{"jsc":{"target":"es5"}}"#)));

        let doc = Document::new()
            .with_target(ScriptTarget::remote("application/json", "/swc.json").with_model(MARKER));

        let config = resolver(fetcher).resolve(&doc).await.unwrap().unwrap();
        assert_eq!(config.as_value()["jsc"]["target"], "es5");
    }

    #[tokio::test]
    async fn first_descriptor_wins() {
        let doc = Document::new()
            .with_target(ScriptTarget::inline("", r#"{"n":1}"#).with_model(MARKER))
            .with_target(ScriptTarget::inline("", r#"{"n":2}"#).with_model(MARKER));

        let config = resolver(no_network()).resolve(&doc).await.unwrap().unwrap();
        assert_eq!(config.as_value()["n"], 1);
    }

    #[tokio::test]
    async fn malformed_descriptor_propagates() {
        let doc = Document::new().with_target(ScriptTarget::inline("", "{ nope").with_model(MARKER));

        let err = resolver(no_network()).resolve(&doc).await.unwrap_err();
        assert!(matches!(err, PipelineError::Config(ConfigError::Parse(_))));
    }
}
