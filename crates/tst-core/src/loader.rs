//! Source loading with content-type policy
//!
//! Produces a [`SourceRecord`] for a target: inline text is fingerprinted
//! locally, remote text is fetched and tagged with the server's `ETag`.

use crate::config::PipelineConfig;
use crate::error::{NetworkError, PipelineError, ValidationError};
use crate::fetch::Fetcher;
use std::sync::Arc;
use tst_artifact::{Fingerprint, ScriptTarget, SourceRecord};

/// Obtains a target's text and validation tag
#[derive(Clone)]
pub struct SourceLoader {
    fetcher: Arc<dyn Fetcher>,
    config: PipelineConfig,
}

impl SourceLoader {
    /// Create loader enforcing `config`'s allow-list
    #[inline]
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>, config: PipelineConfig) -> Self {
        Self { fetcher, config }
    }

    /// Load a target's content
    ///
    /// # Errors
    /// - `ValidationError::DeclaredType` if the declared type is non-empty and
    ///   not allowed
    /// - `ValidationError::ResponseType` if a fetched response's type is
    ///   missing or not allowed
    /// - `NetworkError` if the fetch fails or there is nothing to fetch
    pub async fn get_content(&self, target: &ScriptTarget) -> Result<SourceRecord, PipelineError> {
        if !target.content_type.is_empty() && !self.config.allows(&target.content_type) {
            return Err(ValidationError::DeclaredType {
                target: target.label().to_string(),
                content_type: target.content_type.clone(),
            }
            .into());
        }

        if let Some(text) = target.inline_text() {
            return Ok(SourceRecord::new(text, Fingerprint::compute(text).to_string()));
        }

        let src = target
            .src
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| NetworkError::MissingLocation(target.label().to_string()))?;

        let response = self.fetcher.fetch(src).await?;

        let allowed = response
            .content_type
            .as_deref()
            .is_some_and(|ct| self.config.allows(ct));
        if !allowed {
            return Err(ValidationError::ResponseType {
                url: src.to_string(),
                content_type: response.content_type,
            }
            .into());
        }

        let content_tag = match response.etag.filter(|t| !t.is_empty()) {
            Some(etag) => etag,
            None => Fingerprint::compute(&response.body).to_string(),
        };
        Ok(SourceRecord::new(response.body, content_tag))
    }
}

impl std::fmt::Debug for SourceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceLoader")
            .field("allowed", &self.config.allowed_content_types)
            .finish_non_exhaustive()
    }
}
