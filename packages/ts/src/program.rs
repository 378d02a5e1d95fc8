use crate::source_file::SourceFile;
use crate::Diagnostic;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The subset of `compilerOptions` that affects declaration emission.
///
/// Unknown options are kept in `extra` so the full object can be handed to
/// collaborators (e.g. a declaration bundler) unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_js: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaration: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaration_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaration_map: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emit_declaration_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_emit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<IndexMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_json_module: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip_internal: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CompilerOptions {
    pub fn declaration_map(&self) -> bool {
        self.declaration_map.unwrap_or(false)
    }

    pub fn strip_internal(&self) -> bool {
        self.strip_internal.unwrap_or(false)
    }

    /// Where declarations land: `declarationDir`, then `outDir`.
    pub fn declaration_out_dir(&self) -> Option<&str> {
        self.declaration_dir.as_deref().or(self.out_dir.as_deref())
    }
}

/// Outcome of a `Program::emit` call.
#[derive(Debug, Clone, Default)]
pub struct EmitResult {
    pub emit_skipped: bool,
    pub diagnostics: Vec<Diagnostic>,
    /// Paths handed to the write callback, in order.
    pub emitted_files: Vec<String>,
}

/// Callback receiving `(path, content)` for every emitted file.
pub type WriteFileCallback<'a> = dyn FnMut(&str, &str) + 'a;

pub trait CompilerHost: Send + Sync {
    fn get_current_directory(&self) -> String;
    fn file_exists(&self, file_name: &str) -> bool;
    fn read_file(&self, file_name: &str) -> Option<String>;
    fn use_case_sensitive_file_names(&self) -> bool {
        true
    }
    fn get_new_line(&self) -> String {
        "\n".to_string()
    }
}

pub trait Program: Send + Sync {
    fn get_root_file_names(&self) -> Vec<String>;
    fn get_compiler_options(&self) -> &CompilerOptions;
    fn get_source_file(&self, file_name: &str) -> Option<SourceFile>;
    fn get_source_files(&self) -> Vec<SourceFile>;
    /// Diagnostics gathered while building the program.
    fn get_diagnostics(&self) -> Vec<Diagnostic>;
    /// Emit declarations for `target`, or for every root file when `None`.
    fn emit(&self, target: Option<&str>, write_file: &mut WriteFileCallback<'_>) -> EmitResult;
}

/// Builds programs; the runtime calls this again on every whole-program rebuild.
pub trait ProgramFactory: Send + Sync {
    fn create_program(
        &self,
        root_names: &[String],
        options: &CompilerOptions,
        host: Arc<dyn CompilerHost>,
    ) -> Result<Arc<dyn Program>, Diagnostic>;
}
