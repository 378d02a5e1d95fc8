// Lifecycle Hooks
//
// Callbacks a host can attach to an emission pass.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use ts::Diagnostic;

use crate::dts::bundler::BundleOutput;

/// What to do with a file about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteDecision {
    Keep,
    Skip,
    /// Replace the path and/or the content. A relative path resolves
    /// against the output directory.
    Rewrite {
        path: Option<String>,
        content: Option<String>,
    },
}

pub type BeforeWriteFileHook = dyn Fn(&str, &str) -> WriteDecision + Send + Sync;
pub type AfterRollupHook = dyn Fn(&str, &BundleOutput) + Send + Sync;
pub type AfterDiagnosticsHook = dyn Fn(&[Diagnostic]) + Send + Sync;
pub type AfterBuildHook = dyn Fn(&IndexMap<String, String>) + Send + Sync;

#[derive(Clone, Default)]
pub struct EmitHooks {
    pub before_write_file: Option<Arc<BeforeWriteFileHook>>,
    /// Receives the entry name and the bundler's result.
    pub after_rollup: Option<Arc<AfterRollupHook>>,
    pub after_diagnostics: Option<Arc<AfterDiagnosticsHook>>,
    /// Receives every finalized path with its content.
    pub after_build: Option<Arc<AfterBuildHook>>,
}

impl EmitHooks {
    pub fn before_write_file(&self, path: &str, content: &str) -> WriteDecision {
        self.before_write_file
            .as_ref()
            .map_or(WriteDecision::Keep, |hook| hook(path, content))
    }

    pub fn after_rollup(&self, entry: &str, output: &BundleOutput) {
        if let Some(hook) = &self.after_rollup {
            hook(entry, output);
        }
    }

    pub fn after_diagnostics(&self, diagnostics: &[Diagnostic]) {
        if let Some(hook) = &self.after_diagnostics {
            hook(diagnostics);
        }
    }

    pub fn after_build(&self, files: &IndexMap<String, String>) {
        if let Some(hook) = &self.after_build {
            hook(files);
        }
    }
}

impl fmt::Debug for EmitHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmitHooks")
            .field("before_write_file", &self.before_write_file.is_some())
            .field("after_rollup", &self.after_rollup.is_some())
            .field("after_diagnostics", &self.after_diagnostics.is_some())
            .field("after_build", &self.after_build.is_some())
            .finish()
    }
}
