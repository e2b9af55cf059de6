//! TST Core - compile-once script pipeline
//!
//! Finds TypeScript snippets on a page, compiles each through an external
//! compiler at most once per (content, config) pair, and injects the output:
//! - Resolves the page's compiler config descriptor
//! - Loads inline and remote sources under a content-type allow-list
//! - Fronts the compiler with a content-addressed cache
//! - Evicts stale cache entries once per run
//! - Skips failed targets with a warning instead of aborting the page
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tst_cache::MemoryStore;
//! use tst_core::prelude::*;
//!
//! # async fn example(compiler: Arc<dyn Compiler>) -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::new(
//!     PipelineConfig::new(),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(HttpFetcher::new()?.with_base("https://example.com/")?),
//!     compiler,
//! );
//!
//! let mut page = Document::new()
//!     .with_target(ScriptTarget::inline("text/typescript", "let a: number = 1"));
//! let report = pipeline.run(&mut page).await?;
//!
//! println!("Injected {} scripts", report.injected());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod compiler;
pub mod config;
pub mod context;
pub mod error;
pub mod fetch;
pub mod gateway;
pub mod loader;
pub mod logging;
pub mod pipeline;
pub mod resolver;

// Re-exports for convenience
pub use compiler::{Compiler, CompilerOutput};
pub use config::{CompilerConfig, PipelineConfig, ScriptMime};
pub use context::{Document, ExecutionContext};
pub use error::{
    CompilerError, ConfigError, NetworkError, PipelineError, PipelineResult, ValidationError,
};
pub use fetch::{FetchResponse, Fetcher, HttpFetcher};
pub use gateway::{CompileGateway, CompileOutcome};
pub use loader::SourceLoader;
pub use logging::{init_tracing, LoggingConfig};
pub use pipeline::{Pipeline, RunId, RunReport, TargetOutcome, TargetState};
pub use resolver::ConfigResolver;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with TST Core
    pub use crate::{
        Compiler, CompilerConfig, CompilerOutput, Document, ExecutionContext, Fetcher,
        HttpFetcher, Pipeline, PipelineConfig, PipelineError, RunReport,
    };
    pub use tst_artifact::{CompiledArtifact, ScriptTarget};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::sync::Arc;
    use tst_artifact::ScriptTarget;
    use tst_cache::MemoryStore;

    #[tokio::test]
    async fn mixed_page_flow() {
        let mut compiler = compiler::MockCompiler::new();
        compiler
            .expect_transform()
            .times(2)
            .returning(|source, _| Ok(CompilerOutput::new(source.replace(": number", ""))));

        let mut fetcher = fetch::MockFetcher::new();
        fetcher.expect_fetch().times(1).returning(|_| {
            Ok(FetchResponse::new("text/typescript", "let b: number = 2").with_etag("\"v1\""))
        });

        let pipeline = Pipeline::new(
            PipelineConfig::new(),
            Arc::new(MemoryStore::new()),
            Arc::new(fetcher),
            Arc::new(compiler),
        );

        let mut page = Document::new()
            .with_target(ScriptTarget::inline("text/typescript", "let a: number = 1"))
            .with_target(ScriptTarget::remote("", "/b.ts"));

        let report = pipeline.run(&mut page).await.unwrap();

        assert_eq!(report.injected(), 2);
        assert_eq!(page.injected()[0].code(), "/* Compiled locally */ let a = 1");
        assert_eq!(page.injected()[1].code(), "/* Compiled locally */ let b = 2");
        assert_eq!(page.injected()[1].content_type(), "application/javascript");
    }
}
