//! Execution context abstraction
//!
//! The pipeline only needs two page primitives: enumerate script targets in
//! document order, and append an executable unit. [`Document`] is an
//! in-memory implementation for hosts that assemble pages themselves.

use tst_artifact::{CompiledArtifact, ScriptTarget};

/// Page scanning and injection
pub trait ExecutionContext: Send + Sync {
    /// All script targets, in document order
    fn discover(&self) -> Vec<ScriptTarget>;

    /// Append an executable unit after existing content
    fn append(&mut self, artifact: CompiledArtifact);
}

/// In-memory page
#[derive(Debug, Clone, Default)]
pub struct Document {
    targets: Vec<ScriptTarget>,
    injected: Vec<CompiledArtifact>,
}

impl Document {
    /// Create empty document
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Document holding `targets` in order
    #[must_use]
    pub fn from_targets(targets: impl IntoIterator<Item = ScriptTarget>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            injected: Vec::new(),
        }
    }

    /// With an additional target at the end
    #[inline]
    #[must_use]
    pub fn with_target(mut self, target: ScriptTarget) -> Self {
        self.targets.push(target);
        self
    }

    /// Units appended so far, in append order
    #[inline]
    #[must_use]
    pub fn injected(&self) -> &[CompiledArtifact] {
        &self.injected
    }
}

impl ExecutionContext for Document {
    fn discover(&self) -> Vec<ScriptTarget> {
        self.targets.clone()
    }

    fn append(&mut self, artifact: CompiledArtifact) {
        self.injected.push(artifact);
    }
}
