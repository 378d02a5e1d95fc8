// Echo Program
//
// A program whose "declaration" for each script is the script's own text.
// Lets pipeline tests pin exact output without a real declaration emitter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use ts::{
    CompilerHost, CompilerOptions, Diagnostic, EmitResult, Program, ProgramFactory, SourceFile,
    WriteFileCallback,
};

use crate::dts::file_system::{
    basename, common_ancestor_dir, dirname, join, normalize_id, relative, ts_to_dts,
};
use crate::dts::sourcemaps::RawSourceMap;

pub struct EchoProgram {
    root_names: Vec<String>,
    options: CompilerOptions,
    files: IndexMap<String, SourceFile>,
    diagnostics: Vec<Diagnostic>,
    root_dir: String,
}

impl EchoProgram {
    pub fn new(root_names: &[String], options: &CompilerOptions, host: &dyn CompilerHost) -> Self {
        let mut files = IndexMap::new();
        let mut diagnostics = Vec::new();
        for name in root_names {
            let name = normalize_id(name);
            match host.read_file(&name) {
                Some(text) => {
                    files.insert(name.clone(), SourceFile::new(name, text));
                }
                None => diagnostics.push(
                    Diagnostic::error(format!("File '{}' not found.", name)).with_file(&name),
                ),
            }
        }
        let root_dir = options.root_dir.clone().unwrap_or_else(|| {
            common_ancestor_dir(files.keys().map(String::as_str)).unwrap_or_else(|| "/".into())
        });
        Self {
            root_names: root_names.to_vec(),
            options: options.clone(),
            files,
            diagnostics,
            root_dir,
        }
    }

    fn emit_file(&self, file: &SourceFile, write_file: &mut WriteFileCallback<'_>, result: &mut EmitResult) {
        let out_dir = self.options.declaration_out_dir().unwrap_or(&self.root_dir);
        let dts_path = ts_to_dts(&join(out_dir, &[&relative(&self.root_dir, &file.file_name)]));
        write_file(&dts_path, file.full_text());
        result.emitted_files.push(dts_path.clone());

        if self.options.declaration_map() {
            let map_path = format!("{}.map", dts_path);
            let mut map = RawSourceMap::new(basename(&dts_path));
            map.sources = vec![relative(&dirname(&map_path), &file.file_name)];
            map.mappings = "AAAA".to_string();
            if let Ok(json) = map.to_json() {
                write_file(&map_path, &json);
                result.emitted_files.push(map_path);
            }
        }
    }
}

impl Program for EchoProgram {
    fn get_root_file_names(&self) -> Vec<String> {
        self.root_names.clone()
    }

    fn get_compiler_options(&self) -> &CompilerOptions {
        &self.options
    }

    fn get_source_file(&self, file_name: &str) -> Option<SourceFile> {
        self.files.get(&normalize_id(file_name)).cloned()
    }

    fn get_source_files(&self) -> Vec<SourceFile> {
        self.files.values().cloned().collect()
    }

    fn get_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.clone()
    }

    fn emit(&self, target: Option<&str>, write_file: &mut WriteFileCallback<'_>) -> EmitResult {
        let mut result = EmitResult::default();
        let target = target.map(normalize_id);
        let emittable = self.files.values().filter(|file| {
            file.kind.is_script()
                && !file.is_declaration_file()
                && target.as_ref().map_or(true, |t| *t == file.file_name)
        });
        let mut any = false;
        for file in emittable {
            any = true;
            self.emit_file(file, write_file, &mut result);
        }
        result.emit_skipped = !any;
        result
    }
}

/// Builds `EchoProgram`s and counts how many it built.
#[derive(Default)]
pub struct EchoProgramFactory {
    created: AtomicUsize,
    failure: Mutex<Option<String>>,
}

impl EchoProgramFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory whose every build fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        let factory = Self::default();
        factory.set_failure(Some(message.into()));
        factory
    }

    pub fn set_failure(&self, message: Option<String>) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = message;
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl ProgramFactory for EchoProgramFactory {
    fn create_program(
        &self,
        root_names: &[String],
        options: &CompilerOptions,
        host: Arc<dyn CompilerHost>,
    ) -> Result<Arc<dyn Program>, Diagnostic> {
        if let Some(message) = self.failure.lock().unwrap_or_else(|e| e.into_inner()).clone() {
            return Err(Diagnostic::error(message));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(EchoProgram::new(root_names, options, host.as_ref())))
    }
}
