// Resolver API
//
// Resolver contract and its input and output types.

use ts::{CompilerHost, Diagnostic, Program};

/// A declaration (or declaration map) produced for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationOutput {
    /// Relative to the output directory, or absolute inside it.
    pub path: String,
    pub content: String,
}

impl DeclarationOutput {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResolverOutput {
    pub outputs: Vec<DeclarationOutput>,
    pub diagnostics: Vec<Diagnostic>,
    pub emit_skipped: bool,
}

impl From<Vec<DeclarationOutput>> for ResolverOutput {
    fn from(outputs: Vec<DeclarationOutput>) -> Self {
        Self {
            outputs,
            ..Default::default()
        }
    }
}

pub struct ResolverContext<'a> {
    /// Normalized module id.
    pub id: &'a str,
    pub code: &'a str,
    /// Public root: outputs mirror the source tree below it.
    pub root: &'a str,
    pub out_dir: &'a str,
    pub host: &'a dyn CompilerHost,
    pub program: &'a dyn Program,
}

pub trait Resolver: Send + Sync {
    fn name(&self) -> &str;
    fn supports(&self, id: &str) -> bool;
    fn transform(&self, ctx: &ResolverContext<'_>) -> anyhow::Result<ResolverOutput>;
}
