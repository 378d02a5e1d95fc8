// Emitter Errors
//
// The error taxonomy of an emission pass. Variants marked recoverable are
// logged as warnings by the orchestrator and never abort the pass.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DtsError {
    /// The project configuration could not be read or resolved. Fatal.
    #[error("failed to resolve configuration {path}: {message}")]
    ConfigResolution { path: String, message: String },

    /// A write target lies outside every output directory. Recoverable.
    #[error("outside emitted: {path} is not within {out_dir}")]
    PathContainment { path: String, out_dir: String },

    /// A declaration map could not be parsed or rewritten. Recoverable.
    #[error("failed to process source map {path}: {message}")]
    SourceMapProcessing { path: String, message: String },

    /// A resolver failed for one module. The module is abandoned.
    #[error("resolver '{resolver}' failed for {id}: {source}")]
    ResolverTransform {
        resolver: String,
        id: String,
        #[source]
        source: anyhow::Error,
    },

    /// The declaration bundler failed. Aborts the pass.
    #[error("failed to bundle {entry}: {source}")]
    BundlerInvocation {
        entry: String,
        #[source]
        source: anyhow::Error,
    },

    /// Error diagnostics were reported and treated as fatal.
    #[error("declaration emission reported {count} error(s):\n{formatted}")]
    Diagnostics { count: usize, formatted: String },

    /// An operation ran before `configure`.
    #[error("emitter is not configured")]
    NotConfigured,

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl DtsError {
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        DtsError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(path: impl Into<String>, message: impl Into<String>) -> Self {
        DtsError::ConfigResolution {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether the pass can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DtsError::PathContainment { .. }
                | DtsError::SourceMapProcessing { .. }
                | DtsError::ResolverTransform { .. }
        )
    }
}

pub type DtsResult<T> = Result<T, DtsError>;
