// Isolated Declaration Program
//
// Program over a fixed set of root files. Each file's declaration is derived
// from that file alone.

use std::sync::Arc;

use indexmap::IndexMap;
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_isolated_declarations::{IsolatedDeclarations, IsolatedDeclarationsOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;
use ts::{
    CompilerHost, CompilerOptions, Diagnostic, EmitResult, Program, ProgramFactory, ScriptKind,
    SourceFile, WriteFileCallback,
};

use super::vue_script::extract_vue_script;
use crate::dts::file_system::{
    basename, common_ancestor_dir, dirname, join, normalize_id, relative, ts_to_dts,
};
use crate::dts::sourcemaps::RawSourceMap;

/// Diagnostic code for declaration emit failures (TS9005 family).
const DECLARATION_EMIT_CODE: i32 = 9005;
const FILE_NOT_FOUND_CODE: i32 = 6053;

pub struct IsolatedDeclarationProgram {
    root_names: Vec<String>,
    options: CompilerOptions,
    /// Keyed by file name; component scripts are keyed by their virtual id.
    files: IndexMap<String, SourceFile>,
    /// Component path -> virtual script id.
    components: IndexMap<String, String>,
    diagnostics: Vec<Diagnostic>,
    root_dir: String,
}

impl IsolatedDeclarationProgram {
    pub fn new(root_names: &[String], options: &CompilerOptions, host: &dyn CompilerHost) -> Self {
        let mut files = IndexMap::new();
        let mut components = IndexMap::new();
        let mut diagnostics = Vec::new();

        for name in root_names {
            let name = normalize_id(name);
            let Some(text) = host.read_file(&name) else {
                let mut diag = Diagnostic::error(format!("File '{}' not found.", name));
                diag.code = FILE_NOT_FOUND_CODE;
                diagnostics.push(diag);
                continue;
            };
            match ScriptKind::from_path(&name) {
                ScriptKind::Component => match extract_vue_script(&text) {
                    Some(script) => {
                        let virtual_id = script.virtual_id(&name);
                        files.insert(
                            virtual_id.clone(),
                            SourceFile::virtual_file(virtual_id.clone(), script.content),
                        );
                        components.insert(name, virtual_id);
                    }
                    None => {
                        // Template-only component.
                        let virtual_id = format!("{}.ts", name);
                        files.insert(
                            virtual_id.clone(),
                            SourceFile::virtual_file(
                                virtual_id.clone(),
                                "declare const _default: import('vue').DefineComponent<{}, {}, any>;\nexport default _default;\n",
                            ),
                        );
                        components.insert(name, virtual_id);
                    }
                },
                _ => {
                    files.insert(name.clone(), SourceFile::new(name, text));
                }
            }
        }

        let root_dir = match options.root_dir.as_deref() {
            Some(dir) => normalize_id(dir),
            None => common_ancestor_dir(
                files
                    .values()
                    .filter(|f| !f.is_declaration_file())
                    .map(|f| f.file_name.as_str()),
            )
            .unwrap_or_else(|| host.get_current_directory()),
        };

        Self {
            root_names: root_names.iter().map(|n| normalize_id(n)).collect(),
            options: options.clone(),
            files,
            components,
            diagnostics,
            root_dir,
        }
    }

    /// Virtual script id for a component path.
    pub fn component_script(&self, component: &str) -> Option<&str> {
        self.components.get(component).map(String::as_str)
    }

    fn output_path(&self, file_name: &str) -> String {
        let out_dir = self
            .options
            .declaration_out_dir()
            .map(str::to_string)
            .unwrap_or_else(|| self.root_dir.clone());
        ts_to_dts(&join(&out_dir, &[&relative(&self.root_dir, file_name)]))
    }

    fn emit_file(
        &self,
        file: &SourceFile,
        write_file: &mut WriteFileCallback<'_>,
        result: &mut EmitResult,
    ) {
        let allocator = Allocator::default();
        let source_type = SourceType::from_path(&file.file_name).unwrap_or_default();
        let parsed = Parser::new(&allocator, file.full_text(), source_type).parse();
        if parsed.panicked {
            for error in &parsed.errors {
                result.diagnostics.push(self.emit_diagnostic(file, error.to_string()));
            }
            result.emit_skipped = true;
            return;
        }
        for error in &parsed.errors {
            result.diagnostics.push(self.emit_diagnostic(file, error.to_string()));
        }

        let declarations = IsolatedDeclarations::new(
            &allocator,
            IsolatedDeclarationsOptions {
                strip_internal: self.options.strip_internal(),
            },
        )
        .build(&parsed.program);
        for error in &declarations.errors {
            result.diagnostics.push(self.emit_diagnostic(file, error.to_string()));
        }

        let dts_path = self.output_path(&file.file_name);
        let with_map = self.options.declaration_map();
        let codegen = Codegen::new()
            .with_options(CodegenOptions {
                source_map_path: with_map.then(|| std::path::PathBuf::from(&file.file_name)),
                ..CodegenOptions::default()
            })
            .build(&declarations.program);

        write_file(&dts_path, &codegen.code);
        result.emitted_files.push(dts_path.clone());

        if let Some(map) = codegen.map {
            let map_path = format!("{}.map", dts_path);
            match RawSourceMap::parse(&map.to_json_string()) {
                Ok(mut raw) => {
                    raw.file = Some(basename(&dts_path));
                    raw.sources = vec![relative(&dirname(&map_path), &file.file_name)];
                    raw.sources_content = None;
                    if let Ok(json) = raw.to_json() {
                        write_file(&map_path, &json);
                        result.emitted_files.push(map_path);
                    }
                }
                Err(e) => result
                    .diagnostics
                    .push(Diagnostic::warning(format!("Invalid declaration map: {}", e)).with_file(&file.file_name)),
            }
        }
    }

    fn emit_diagnostic(&self, file: &SourceFile, message: String) -> Diagnostic {
        let mut diag = Diagnostic::error(message).with_file(&file.file_name);
        diag.code = DECLARATION_EMIT_CODE;
        diag
    }

    fn emittable(file: &SourceFile) -> bool {
        file.kind.is_script() && !file.is_declaration_file()
    }
}

impl Program for IsolatedDeclarationProgram {
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
        match target {
            Some(target) => {
                let target = normalize_id(target);
                let key = self
                    .components
                    .get(&target)
                    .cloned()
                    .unwrap_or(target);
                match self.files.get(&key) {
                    Some(file) if Self::emittable(file) => {
                        self.emit_file(file, write_file, &mut result)
                    }
                    _ => result.emit_skipped = true,
                }
            }
            None => {
                for file in self.files.values().filter(|f| Self::emittable(f)) {
                    self.emit_file(file, write_file, &mut result);
                }
            }
        }
        result
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IsolatedDeclarationProgramFactory;

impl ProgramFactory for IsolatedDeclarationProgramFactory {
    fn create_program(
        &self,
        root_names: &[String],
        options: &CompilerOptions,
        host: Arc<dyn CompilerHost>,
    ) -> Result<Arc<dyn Program>, Diagnostic> {
        Ok(Arc::new(IsolatedDeclarationProgram::new(
            root_names,
            options,
            host.as_ref(),
        )))
    }
}
