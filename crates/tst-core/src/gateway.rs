//! Compile-once gateway
//!
//! Combines the cache and the external compiler: a key that is already cached
//! never reaches the compiler.
//!
//! # Caller responsibility
//! The gateway does not know which configuration produced a cached value.
//! Callers must fold the configuration fingerprint into the [`CacheKey`];
//! two configs sharing a key would share compiled output.
//!
//! # Concurrency
//! There is no in-flight de-duplication: two overlapping calls for the same
//! uncached key may both compile. A single pipeline run never issues them.

use crate::compiler::Compiler;
use crate::config::CompilerConfig;
use crate::error::PipelineError;
use std::sync::Arc;
use tst_artifact::CacheKey;
use tst_cache::{CacheError, ContentAddressedCache};

/// Compiled text and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutcome {
    /// Compiled code
    pub code: String,
    /// Served from cache without invoking the compiler
    pub from_cache: bool,
}

/// Cache-fronted compiler
#[derive(Clone)]
pub struct CompileGateway {
    cache: ContentAddressedCache,
    compiler: Arc<dyn Compiler>,
}

impl CompileGateway {
    /// Create gateway
    #[inline]
    #[must_use]
    pub fn new(cache: ContentAddressedCache, compiler: Arc<dyn Compiler>) -> Self {
        Self { cache, compiler }
    }

    /// Return cached output for `cache_key`, compiling and storing on a miss
    ///
    /// # Errors
    /// - `CompilerError` if the compiler fails (nothing is cached)
    /// - `CacheError::Store` if the medium fails
    pub async fn compile_and_cache(
        &self,
        raw_source: &str,
        cache_key: &CacheKey,
        config: &CompilerConfig,
    ) -> Result<CompileOutcome, PipelineError> {
        match self.cache.get(cache_key.as_str()).await {
            Ok(code) => {
                tracing::debug!("Cache hit for {}", cache_key);
                return Ok(CompileOutcome {
                    code,
                    from_cache: true,
                });
            }
            Err(CacheError::NotFound(_)) => {
                tracing::debug!("Cache miss for {}", cache_key);
            }
            Err(e) => return Err(e.into()),
        }

        let output = self.compiler.transform(raw_source, config).await?;
        self.cache.put(cache_key.as_str(), &output.code).await?;

        Ok(CompileOutcome {
            code: output.code,
            from_cache: false,
        })
    }

    /// Underlying cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &ContentAddressedCache {
        &self.cache
    }
}

impl std::fmt::Debug for CompileGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileGateway")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
