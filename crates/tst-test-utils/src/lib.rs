//! Testing utilities for TST workspace
//!
//! Shared fakes, fixtures, and pipeline setup.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tst_artifact::ScriptTarget;
use tst_cache::{ContentAddressedCache, FixedClock, MemoryStore, Store};
use tst_core::{
    Compiler, CompilerConfig, CompilerError, CompilerOutput, Document, FetchResponse, Fetcher,
    NetworkError, Pipeline, PipelineConfig,
};

pub const TS: &str = "text/typescript";
pub const CONFIG_MARKER: &str = "swc-transpiler-config";
pub const MARKER_PREFIX: &str = "/* Compiled locally */ ";

/// Compiler that strips `: number` annotations and counts calls
///
/// With `"minify": true` in the config, spaces are removed too, so output
/// depends on the config. Sources containing the failure pattern are rejected.
#[derive(Debug, Default)]
pub struct CountingCompiler {
    calls: AtomicUsize,
    fail_on: Option<String>,
}

impl CountingCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(pattern: impl Into<String>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on: Some(pattern.into()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Compiler for CountingCompiler {
    async fn transform(
        &self,
        source: &str,
        config: &CompilerConfig,
    ) -> Result<CompilerOutput, CompilerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(pattern) = &self.fail_on {
            if source.contains(pattern.as_str()) {
                return Err(CompilerError::Failed(format!("unexpected `{pattern}`")));
            }
        }

        let mut code = source.replace(": number", "");
        if config.as_value()["minify"] == true {
            code.retain(|c| c != ' ');
        }
        Ok(CompilerOutput::new(code))
    }
}

/// Compiler that is never available
#[derive(Debug, Default)]
pub struct FailingCompiler;

#[async_trait]
impl Compiler for FailingCompiler {
    async fn transform(
        &self,
        _source: &str,
        _config: &CompilerConfig,
    ) -> Result<CompilerOutput, CompilerError> {
        Err(CompilerError::Unavailable("compiler not loaded".to_string()))
    }
}

/// Fetcher serving fixed responses; unknown URLs answer 404
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: Mutex<HashMap<String, FetchResponse>>,
    fetches: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, url: impl Into<String>, response: FetchResponse) -> Self {
        self.serve(url, response);
        self
    }

    /// Replace the response for `url`
    pub fn serve(&self, url: impl Into<String>, response: FetchResponse) {
        self.responses.lock().insert(url.into(), response);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, NetworkError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .get(url)
            .cloned()
            .ok_or_else(|| NetworkError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

pub fn ts_inline(text: &str) -> ScriptTarget {
    ScriptTarget::inline(TS, text)
}

pub fn ts_remote(src: &str) -> ScriptTarget {
    ScriptTarget::remote(TS, src)
}

pub fn config_descriptor(json: &str) -> ScriptTarget {
    ScriptTarget::inline("application/json", json).with_model(CONFIG_MARKER)
}

pub fn page(targets: impl IntoIterator<Item = ScriptTarget>) -> Document {
    Document::from_targets(targets)
}

/// Injected code with the marker removed
pub fn injected_code(doc: &Document) -> Vec<String> {
    doc.injected()
        .iter()
        .map(|a| a.code().trim_start_matches(MARKER_PREFIX).to_string())
        .collect()
}

/// Collaborators of a test pipeline, kept for assertions
pub struct TestHarness {
    pub store: Arc<dyn Store>,
    pub clock: Arc<FixedClock>,
    pub fetcher: Arc<StaticFetcher>,
    pub compiler: Arc<CountingCompiler>,
}

impl TestHarness {
    pub fn new(fetcher: StaticFetcher, compiler: CountingCompiler) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), fetcher, compiler)
    }

    pub fn with_store(
        store: Arc<dyn Store>,
        fetcher: StaticFetcher,
        compiler: CountingCompiler,
    ) -> Self {
        Self {
            store,
            clock: Arc::new(FixedClock::new(test_epoch())),
            fetcher: Arc::new(fetcher),
            compiler: Arc::new(compiler),
        }
    }

    pub fn cache(&self, config: &PipelineConfig) -> ContentAddressedCache {
        ContentAddressedCache::new(self.store.clone())
            .with_prefix(config.cache_prefix.clone())
            .with_clock(self.clock.clone())
    }

    pub fn pipeline(&self, config: PipelineConfig) -> Pipeline {
        let cache = self.cache(&config);
        Pipeline::with_cache(config, cache, self.fetcher.clone(), self.compiler.clone())
    }
}

/// 2023-11-14T22:13:20Z
pub fn test_epoch() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
}

pub fn setup_test_pipeline() -> (Pipeline, TestHarness) {
    let harness = TestHarness::new(StaticFetcher::new(), CountingCompiler::new());
    (harness.pipeline(PipelineConfig::new()), harness)
}

