//! Pipeline orchestrator
//!
//! The single entry point run once per page load:
//! 1. Resolve compiler config (explicit, page descriptor, or default)
//! 2. Run cache maintenance
//! 3. Discover targets in document order
//! 4. Load, key, compile and inject each target in turn
//! 5. Isolate per-target failures as warnings

use crate::compiler::Compiler;
use crate::config::{CompilerConfig, PipelineConfig};
use crate::context::ExecutionContext;
use crate::error::PipelineError;
use crate::fetch::Fetcher;
use crate::gateway::CompileGateway;
use crate::loader::SourceLoader;
use crate::resolver::ConfigResolver;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::Instrument;
use tst_artifact::{CacheKey, CompiledArtifact, Fingerprint, ScriptTarget};
use tst_cache::{ContentAddressedCache, Store};
use ulid::Ulid;

/// Unique pipeline run identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub Ulid);

impl RunId {
    /// Generate new run ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-target lifecycle
///
/// `Discovered → Loaded → Keyed → Compiled → Injected`, or `Failed` from any
/// state before `Injected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetState {
    Discovered,
    Loaded,
    Keyed,
    Compiled,
    Injected,
    Failed,
}

/// What happened to one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetOutcome {
    /// Position among compile targets, in document order
    pub index: usize,
    /// Diagnostic name; warnings append `#<index>` to tell inline targets apart
    pub label: String,
    /// Terminal state (`Injected` or `Failed`)
    pub state: TargetState,
    /// Last state reached before a failure
    pub failed_after: Option<TargetState>,
    /// Output came from the cache
    pub cache_hit: bool,
    /// Failure description
    pub error: Option<String>,
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier
    pub run_id: RunId,
    /// Fingerprint of the compiler config in use
    pub config_fingerprint: Fingerprint,
    /// Entries removed by cache maintenance
    pub evicted: usize,
    /// Per-target outcomes in document order
    pub outcomes: Vec<TargetOutcome>,
}

impl RunReport {
    /// Number of injected artifacts
    #[must_use]
    pub fn injected(&self) -> usize {
        self.count(TargetState::Injected)
    }

    /// Number of skipped targets (one warning each)
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(TargetState::Failed)
    }

    /// Number of targets served from cache
    #[must_use]
    pub fn cache_hits(&self) -> usize {
        self.outcomes.iter().filter(|o| o.cache_hit).count()
    }

    /// Failed targets
    pub fn failures(&self) -> impl Iterator<Item = &TargetOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.state == TargetState::Failed)
    }

    fn count(&self, state: TargetState) -> usize {
        self.outcomes.iter().filter(|o| o.state == state).count()
    }
}

/// Compile-once pipeline
///
/// Owns no global state: the store, fetcher and compiler are injected.
pub struct Pipeline {
    config: PipelineConfig,
    compiler_config: Option<CompilerConfig>,
    cache: ContentAddressedCache,
    loader: SourceLoader,
    resolver: ConfigResolver,
    gateway: CompileGateway,
}

impl Pipeline {
    /// Create pipeline over `store`, namespaced by `config.cache_prefix`
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        store: Arc<dyn Store>,
        fetcher: Arc<dyn Fetcher>,
        compiler: Arc<dyn Compiler>,
    ) -> Self {
        let cache = ContentAddressedCache::new(store).with_prefix(config.cache_prefix.clone());
        Self::with_cache(config, cache, fetcher, compiler)
    }

    /// Create pipeline around a prepared cache
    #[must_use]
    pub fn with_cache(
        config: PipelineConfig,
        cache: ContentAddressedCache,
        fetcher: Arc<dyn Fetcher>,
        compiler: Arc<dyn Compiler>,
    ) -> Self {
        Self {
            loader: SourceLoader::new(fetcher.clone(), config.clone()),
            resolver: ConfigResolver::new(fetcher, config.config_marker.clone()),
            gateway: CompileGateway::new(cache.clone(), compiler),
            compiler_config: None,
            cache,
            config,
        }
    }

    /// With explicit compiler config (skips descriptor lookup)
    #[inline]
    #[must_use]
    pub fn with_compiler_config(mut self, compiler_config: CompilerConfig) -> Self {
        self.compiler_config = Some(compiler_config);
        self
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Get cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &ContentAddressedCache {
        &self.cache
    }

    /// Run the pipeline over `ctx`
    ///
    /// # Errors
    /// Only run-level failures: config resolution, config fingerprinting and
    /// cache maintenance. Target failures are reported in the [`RunReport`].
    pub async fn run(&self, ctx: &mut dyn ExecutionContext) -> Result<RunReport, PipelineError> {
        let run_id = RunId::new();
        let span = tracing::info_span!("pipeline_run", %run_id);
        self.run_inner(run_id, ctx).instrument(span).await
    }

    async fn run_inner(
        &self,
        run_id: RunId,
        ctx: &mut dyn ExecutionContext,
    ) -> Result<RunReport, PipelineError> {
        let compiler_config = match &self.compiler_config {
            Some(explicit) => explicit.clone(),
            None => self.resolver.resolve(&*ctx).await?.unwrap_or_default(),
        };
        let config_fingerprint = compiler_config.fingerprint()?;
        tracing::debug!("Compiler config fingerprint {}", config_fingerprint);

        let evicted = self.cache.clean(self.config.cache_lifetime_days).await?;

        let targets: Vec<ScriptTarget> = ctx
            .discover()
            .into_iter()
            .filter(|t| !self.resolver.is_descriptor(t))
            .collect();
        tracing::info!("Processing {} script targets", targets.len());

        let mut outcomes = Vec::with_capacity(targets.len());
        for (index, target) in targets.iter().enumerate() {
            let label = target.label().to_string();
            let mut reached = TargetState::Discovered;

            let outcome = match self
                .process_target(target, &compiler_config, config_fingerprint, &mut reached)
                .await
            {
                Ok((artifact, cache_hit)) => {
                    ctx.append(artifact);
                    TargetOutcome {
                        index,
                        label,
                        state: TargetState::Injected,
                        failed_after: None,
                        cache_hit,
                        error: None,
                    }
                }
                Err(e) => {
                    tracing::warn!(index, "{} #{} was not transpiled: {}", label, index, e);
                    TargetOutcome {
                        index,
                        label,
                        state: TargetState::Failed,
                        failed_after: Some(reached),
                        cache_hit: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        let report = RunReport {
            run_id,
            config_fingerprint,
            evicted,
            outcomes,
        };
        tracing::info!(
            "Run complete: {} injected, {} failed, {} cache hits",
            report.injected(),
            report.failed(),
            report.cache_hits()
        );
        Ok(report)
    }

    /// Load, key and compile one target
    ///
    /// `reached` tracks progress so a failure can report where it stopped.
    /// Nothing is injected here; the artifact is complete before the caller
    /// appends it.
    async fn process_target(
        &self,
        target: &ScriptTarget,
        compiler_config: &CompilerConfig,
        config_fingerprint: Fingerprint,
        reached: &mut TargetState,
    ) -> Result<(CompiledArtifact, bool), PipelineError> {
        let record = self.loader.get_content(target).await?;
        *reached = TargetState::Loaded;

        let key = CacheKey::new(&record.content_tag, config_fingerprint);
        *reached = TargetState::Keyed;

        let compiled = self
            .gateway
            .compile_and_cache(&record.content, &key, compiler_config)
            .await?;
        *reached = TargetState::Compiled;

        let artifact = CompiledArtifact::new(
            &self.config.compiled_marker,
            &compiled.code,
            self.config.output_content_type.clone(),
        );
        Ok((artifact, compiled.from_cache))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("compiler_config", &self.compiler_config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
