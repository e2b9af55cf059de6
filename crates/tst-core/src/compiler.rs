//! External compiler seam

use crate::config::CompilerConfig;
use crate::error::CompilerError;
use async_trait::async_trait;

/// Result of one transform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOutput {
    /// Executable code
    pub code: String,
}

impl CompilerOutput {
    /// Create output
    #[inline]
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Black-box `(source, config) -> code` transform
///
/// May fail for any input; failures are reported per target.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Transform source text using `config`
    async fn transform(
        &self,
        source: &str,
        config: &CompilerConfig,
    ) -> Result<CompilerOutput, CompilerError>;
}
