// Declaration Runtime
//
// Builds the program from the project configuration and turns module ids
// into declaration outputs keyed by their source-space path.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};
use ts::{CompilerHost, CompilerOptions, Diagnostic, Program, ProgramFactory};

use super::alias_table::{aliases_from_paths, merge_aliases};
use super::capabilities::Capabilities;
use super::filter::GlobFilter;
use super::state::DeclarationState;
use crate::config::{read_tsconfig, EmitOptions, OneOrMany, ParsedTsConfig, PluginOptions};
use crate::dts::diagnostics::{DtsError, DtsResult};
use crate::dts::file_system::{
    common_ancestor_dir, ensure_absolute, is_dts_path, is_within, join, normalize_id, relative,
    resolve, ts_to_dts, AbsoluteFsPath, FileSystem, FileSystemCompilerHost, OsFileSystem,
};
use crate::dts::logging::SharedLogger;
use crate::dts::resolvers::{JsonResolver, Resolver, ResolverContext, ResolverRegistry, VueResolver};
use crate::dts::transform::{Alias, AliasFind};

const SCRIPT_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".mts", ".cts"];
const DEFAULT_OUT_DIR: &str = "dist";
const PATH_OPTIONS: &[&str] = &["baseUrl", "rootDir", "outDir", "declarationDir"];

pub struct Runtime {
    root: String,
    config: Option<ParsedTsConfig>,
    capabilities: Capabilities,
    emit_options: EmitOptions,

    factory: Arc<dyn ProgramFactory>,
    fs: Arc<dyn FileSystem>,
    host: Arc<dyn CompilerHost>,
    logger: SharedLogger,
    program: Arc<dyn Program>,
    registry: ResolverRegistry,

    compiler_options: CompilerOptions,
    raw_compiler_options: Map<String, Value>,
    filter: GlobFilter,
    aliases: Vec<Alias>,
    aliases_exclude: Vec<AliasFind>,
    out_dirs: Vec<String>,
    entries: IndexMap<String, String>,
    public_root: String,
    entry_root: String,
    discover_json: bool,

    root_names: Vec<String>,
    root_files: IndexSet<String>,
    transformed: HashSet<String>,
    outputs: IndexMap<String, String>,
    states: IndexMap<String, DeclarationState>,
    diagnostics: Vec<Diagnostic>,
}

impl Runtime {
    pub fn new(
        options: &PluginOptions,
        capabilities: Capabilities,
        factory: Arc<dyn ProgramFactory>,
        fs: Arc<dyn FileSystem>,
        logger: SharedLogger,
    ) -> DtsResult<Self> {
        let root = match &options.root {
            Some(root) => ensure_absolute(root, OsFileSystem::pwd().as_str()),
            None => OsFileSystem::pwd().into_string(),
        };

        let config = locate_tsconfig(fs.as_ref(), &root, options.tsconfig_path.as_deref())?
            .map(|path| read_tsconfig(fs.as_ref(), &path))
            .transpose()?;
        let config_dir = config.as_ref().map_or_else(|| root.clone(), |c| c.dir.clone());
        if let Some(config) = &config {
            logger.debug(&format!("Using {}", config.path));
        }

        let out_dirs: Vec<String> = options
            .out_dir
            .clone()
            .map(OneOrMany::into_vec)
            .filter(|dirs| !dirs.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_OUT_DIR.to_string()])
            .iter()
            .map(|dir| ensure_absolute(dir, &root))
            .collect();
        let primary_out_dir = out_dirs[0].clone();

        let mut raw_compiler_options = config
            .as_ref()
            .map(|c| c.compiler_options.clone())
            .unwrap_or_default();
        for (key, value) in &options.compiler_options {
            let value = match value {
                Value::String(path) if PATH_OPTIONS.contains(&key.as_str()) => {
                    Value::String(ensure_absolute(path, &root))
                }
                other => other.clone(),
            };
            raw_compiler_options.insert(key.clone(), value);
        }
        raw_compiler_options.insert("declaration".into(), Value::Bool(true));
        raw_compiler_options.insert("emitDeclarationOnly".into(), Value::Bool(true));
        raw_compiler_options.insert("noEmit".into(), Value::Bool(false));
        raw_compiler_options.insert("outDir".into(), Value::String(primary_out_dir.clone()));
        raw_compiler_options.remove("declarationDir");
        let mut compiler_options = parse_compiler_options(&raw_compiler_options, &config_dir)?;

        let include = match (&options.include, config.as_ref().and_then(|c| c.include.clone())) {
            (Some(include), _) => include.clone().into_vec(),
            (None, Some(include)) => include,
            (None, None) => vec!["**/*".to_string()],
        };
        let exclude = match (&options.exclude, config.as_ref().and_then(|c| c.exclude.clone())) {
            (Some(exclude), _) => exclude.clone().into_vec(),
            (None, Some(exclude)) => exclude,
            (None, None) => vec!["node_modules/**".to_string()],
        };
        let filter = GlobFilter::new(&config_dir, &include, &exclude)?;

        let inferred = match (&compiler_options.paths, options.path_alias) {
            (Some(paths), true) => {
                let base = compiler_options.base_url.clone().unwrap_or_else(|| config_dir.clone());
                aliases_from_paths(paths, &base)?
            }
            _ => Vec::new(),
        };
        let aliases = merge_aliases(options.aliases.to_aliases()?, inferred);
        let aliases_exclude = options
            .aliases_exclude
            .iter()
            .map(|exclude| exclude.to_find())
            .collect::<DtsResult<Vec<_>>>()?;

        let entries: IndexMap<String, String> = options
            .entries
            .iter()
            .map(|(name, source)| (name.clone(), ensure_absolute(source, &root)))
            .collect();

        let include_json = compiler_options.resolve_json_module.unwrap_or(false)
            && include.iter().any(|pattern| pattern.ends_with(".json"));
        let mut names: IndexSet<String> = IndexSet::new();
        names.extend(config.iter().flat_map(|c| c.files.clone().unwrap_or_default()));
        names.extend(entries.values().cloned());
        let discovery = Discovery {
            fs: fs.as_ref(),
            filter: &filter,
            out_dirs: &out_dirs,
            vue: capabilities.vue,
            json: include_json,
        };
        discovery.walk(&config_dir, &mut names);
        let root_names: Vec<String> = names.into_iter().collect();

        let public_root = match (&compiler_options.root_dir, compiler_options.composite, &config) {
            (Some(root_dir), _, _) => root_dir.clone(),
            (None, Some(true), Some(config)) => config.dir.clone(),
            _ => common_ancestor_dir(
                root_names
                    .iter()
                    .filter(|name| !is_dts_path(name))
                    .map(String::as_str),
            )
            .unwrap_or_else(|| root.clone()),
        };
        if compiler_options.root_dir.is_none() {
            compiler_options.root_dir = Some(public_root.clone());
            raw_compiler_options.insert("rootDir".into(), Value::String(public_root.clone()));
        }
        let entry_root = options
            .entry_root
            .as_deref()
            .map_or_else(|| public_root.clone(), |dir| ensure_absolute(dir, &root));

        let host: Arc<dyn CompilerHost> = Arc::new(FileSystemCompilerHost::new(fs.clone(), &root));
        let program = factory
            .create_program(&root_names, &compiler_options, host.clone())
            .map_err(|diagnostic| {
                let path = config.as_ref().map_or_else(|| root.clone(), |c| c.path.clone());
                DtsError::config(path, diagnostic.message_text.flatten())
            })?;
        let diagnostics = program.get_diagnostics();

        let mut registry = ResolverRegistry::new();
        registry.register([Arc::new(JsonResolver) as Arc<dyn Resolver>]);
        if capabilities.vue {
            registry.register([Arc::new(VueResolver) as Arc<dyn Resolver>]);
        }

        logger.debug(&format!(
            "{} root files, public root {}, output {}",
            root_names.len(),
            public_root,
            primary_out_dir
        ));

        Ok(Self {
            root,
            config,
            capabilities,
            emit_options: options.emit.clone(),
            factory,
            fs,
            host,
            logger,
            program,
            registry,
            compiler_options,
            raw_compiler_options,
            filter,
            aliases,
            aliases_exclude,
            out_dirs,
            entries,
            public_root,
            entry_root,
            discover_json: include_json,
            root_files: root_names.iter().cloned().collect(),
            root_names,
            transformed: HashSet::new(),
            outputs: IndexMap::new(),
            states: IndexMap::new(),
            diagnostics,
        })
    }

    /// Register resolvers after the built-in ones. Same-named resolvers
    /// replace the built-in in place.
    pub fn register_resolvers(&mut self, resolvers: impl IntoIterator<Item = Arc<dyn Resolver>>) {
        self.registry.register(resolvers);
    }

    pub fn filter(&self, id: &str) -> bool {
        self.filter.matches(id)
    }

    pub fn match_resolver(&self, id: &str) -> Option<Arc<dyn Resolver>> {
        self.registry.match_resolver(&normalize_id(id))
    }

    /// Produce declarations for one module. Ids outside the filter, ids
    /// nothing can handle and ids already seen this pass are ignored.
    pub fn transform(&mut self, id: &str, code: &str) -> DtsResult<()> {
        let id = normalize_id(id);
        if !self.filter.matches(&id) || self.transformed.contains(&id) {
            return Ok(());
        }
        let resolver = self.registry.match_resolver(&id);
        if resolver.is_none() && self.program.get_source_file(&id).is_none() {
            return Ok(());
        }

        self.root_files.shift_remove(&id);
        self.transformed.insert(id.clone());

        let result = match resolver {
            Some(resolver) => self.resolve(resolver.as_ref(), &id, code),
            None => {
                self.emit_module(&id);
                Ok(())
            }
        };
        self.pick_up_declaration(&id);
        result
    }

    /// Emit every module still in the root set. Resolver failures are
    /// collected instead of stopping the drain.
    pub fn drain_pending(&mut self) -> Vec<DtsError> {
        let pending: Vec<String> = self.root_files.drain(..).collect();
        let mut errors = Vec::new();
        for id in pending {
            if !self.transformed.insert(id.clone()) {
                continue;
            }
            if is_dts_path(&id) {
                if self.emit_options.copy_dts_files && !id.contains("/node_modules/") {
                    self.copy_declaration(&id);
                }
                continue;
            }
            match self.registry.match_resolver(&id) {
                Some(resolver) => {
                    let code = self.host.read_file(&id).unwrap_or_default();
                    if let Err(error) = self.resolve(resolver.as_ref(), &id, &code) {
                        errors.push(error);
                    }
                }
                None => self.emit_module(&id),
            }
        }
        errors
    }

    /// Rebuild the program over the current root names. A failed rebuild
    /// keeps the previous program.
    pub fn rebuild_program(&mut self) {
        match self
            .factory
            .create_program(&self.root_names, &self.compiler_options, self.host.clone())
        {
            Ok(program) => {
                self.diagnostics = program.get_diagnostics();
                self.program = program;
            }
            Err(diagnostic) => {
                self.logger.warn(&format!(
                    "Failed to rebuild program, keeping the previous one: {}",
                    diagnostic.message_text.flatten()
                ));
                self.diagnostics.push(diagnostic);
            }
        }
    }

    /// React to a changed, added or removed file: every root file is
    /// pending again and the program is rebuilt.
    pub fn invalidate(&mut self, id: &str) {
        let id = normalize_id(id);
        let exists = self.fs.exists(&AbsoluteFsPath::new(&id));
        let known = self.root_names.iter().position(|name| *name == id);
        match (exists, known) {
            (false, Some(index)) => {
                self.root_names.remove(index);
            }
            (true, None) if self.discovery().accepts(&id) => self.root_names.push(id.clone()),
            _ => {}
        }
        self.logger.debug(&format!("Invalidated by {}", id));

        self.root_files = self.root_names.iter().cloned().collect();
        self.transformed.clear();
        self.outputs.clear();
        self.states.clear();
        self.rebuild_program();
    }

    /// Advance the state of the output recorded at `path`.
    pub fn advance_state(&mut self, path: &str, next: DeclarationState) -> bool {
        self.states.get_mut(path).map_or(false, |state| state.advance(next))
    }

    fn resolve(&mut self, resolver: &dyn Resolver, id: &str, code: &str) -> DtsResult<()> {
        let out_dir = self.out_dirs[0].clone();
        let ctx = ResolverContext {
            id,
            code,
            root: &self.public_root,
            out_dir: &out_dir,
            host: self.host.as_ref(),
            program: self.program.as_ref(),
        };
        let output = resolver
            .transform(&ctx)
            .map_err(|source| DtsError::ResolverTransform {
                resolver: resolver.name().to_string(),
                id: id.to_string(),
                source,
            })?;
        if output.emit_skipped {
            self.logger.debug(&format!("Resolver '{}' skipped {}", resolver.name(), id));
        }
        self.diagnostics.extend(output.diagnostics);
        for declaration in output.outputs {
            self.record(&declaration.path, declaration.content, DeclarationState::Resolved);
        }
        Ok(())
    }

    fn emit_module(&mut self, id: &str) {
        let mut emitted: Vec<(String, String)> = Vec::new();
        let result = self.program.emit(Some(id), &mut |path: &str, content: &str| {
            emitted.push((path.to_string(), content.to_string()))
        });
        self.diagnostics.extend(result.diagnostics);
        for (path, content) in emitted {
            self.record(&path, content, DeclarationState::ProgramEmitted);
        }
    }

    /// Hand-written `<stem>.d.ts` next to a module, if the program holds one.
    fn pick_up_declaration(&mut self, id: &str) {
        if is_dts_path(id) {
            return;
        }
        let declaration = ts_to_dts(id);
        if declaration == id || !self.filter.matches(&declaration) {
            return;
        }
        if let Some(file) = self.program.get_source_file(&declaration) {
            self.insert_output(declaration, file.full_text().to_string(), DeclarationState::Resolved);
        }
    }

    fn copy_declaration(&mut self, id: &str) {
        let content = self
            .program
            .get_source_file(id)
            .map(|file| file.full_text().to_string())
            .or_else(|| self.host.read_file(id));
        if let Some(content) = content {
            self.insert_output(id.to_string(), content, DeclarationState::Resolved);
        }
    }

    /// Record an output emitted under the primary output directory at its
    /// source-space location.
    fn record(&mut self, path: &str, content: String, kind: DeclarationState) {
        let out_dir = &self.out_dirs[0];
        let emitted = ensure_absolute(path, out_dir);
        let key = resolve(&self.public_root, &relative(out_dir, &emitted));
        self.insert_output(key, content, kind);
    }

    fn insert_output(&mut self, key: String, content: String, kind: DeclarationState) {
        let mut state = DeclarationState::Pending;
        state.advance(kind);
        self.outputs.insert(key.clone(), content);
        self.states.insert(key, state);
    }

    fn discovery(&self) -> Discovery<'_> {
        Discovery {
            fs: self.fs.as_ref(),
            filter: &self.filter,
            out_dirs: &self.out_dirs,
            vue: self.capabilities.vue,
            json: self.discover_json,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn tsconfig(&self) -> Option<&ParsedTsConfig> {
        self.config.as_ref()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn emit_options(&self) -> &EmitOptions {
        &self.emit_options
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn host(&self) -> &Arc<dyn CompilerHost> {
        &self.host
    }

    pub fn logger(&self) -> &SharedLogger {
        &self.logger
    }

    pub fn program(&self) -> &Arc<dyn Program> {
        &self.program
    }

    pub fn registry(&self) -> &ResolverRegistry {
        &self.registry
    }

    pub fn compiler_options(&self) -> &CompilerOptions {
        &self.compiler_options
    }

    /// Merged `compilerOptions` as JSON, for collaborators such as bundlers.
    pub fn raw_compiler_options(&self) -> Value {
        Value::Object(self.raw_compiler_options.clone())
    }

    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    pub fn aliases_exclude(&self) -> &[AliasFind] {
        &self.aliases_exclude
    }

    pub fn out_dirs(&self) -> &[String] {
        &self.out_dirs
    }

    pub fn primary_out_dir(&self) -> &str {
        &self.out_dirs[0]
    }

    /// Entry name -> absolute source path.
    pub fn entries(&self) -> &IndexMap<String, String> {
        &self.entries
    }

    pub fn public_root(&self) -> &str {
        &self.public_root
    }

    pub fn entry_root(&self) -> &str {
        &self.entry_root
    }

    pub fn root_names(&self) -> &[String] {
        &self.root_names
    }

    /// Modules still waiting for emission in this pass.
    pub fn root_files(&self) -> &IndexSet<String> {
        &self.root_files
    }

    pub fn transformed(&self) -> &HashSet<String> {
        &self.transformed
    }

    /// Source-space path -> content.
    pub fn outputs(&self) -> &IndexMap<String, String> {
        &self.outputs
    }

    pub fn states(&self) -> &IndexMap<String, DeclarationState> {
        &self.states
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

fn locate_tsconfig(
    fs: &dyn FileSystem,
    root: &str,
    explicit: Option<&str>,
) -> DtsResult<Option<String>> {
    if let Some(path) = explicit {
        let path = ensure_absolute(path, root);
        if !fs.exists(&AbsoluteFsPath::new(&path)) {
            return Err(DtsError::config(path, "file not found"));
        }
        return Ok(Some(path));
    }
    let default = join(root, &["tsconfig.json"]);
    Ok(fs.exists(&AbsoluteFsPath::new(&default)).then_some(default))
}

fn parse_compiler_options(raw: &Map<String, Value>, config_dir: &str) -> DtsResult<CompilerOptions> {
    serde_json::from_value(Value::Object(raw.clone()))
        .map_err(|e| DtsError::config(join(config_dir, &["tsconfig.json"]), e.to_string()))
}

/// Finds root files on disk.
struct Discovery<'a> {
    fs: &'a dyn FileSystem,
    filter: &'a GlobFilter,
    out_dirs: &'a [String],
    vue: bool,
    json: bool,
}

impl Discovery<'_> {
    fn accepts(&self, path: &str) -> bool {
        let lower = path.to_ascii_lowercase();
        let supported = SCRIPT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
            || (self.vue && lower.ends_with(".vue"))
            || (self.json && lower.ends_with(".json"));
        supported
            && !self.out_dirs.iter().any(|dir| is_within(dir, path))
            && self.filter.matches(path)
    }

    fn walk(&self, dir: &str, found: &mut IndexSet<String>) {
        let Ok(mut entries) = self.fs.readdir(&AbsoluteFsPath::new(dir)) else {
            return;
        };
        entries.sort();
        for entry in entries {
            let path = join(dir, &[entry.as_str()]);
            if self.fs.is_directory(&AbsoluteFsPath::new(&path)) {
                if entry.as_str() != "node_modules" && !self.out_dirs.iter().any(|d| *d == path) {
                    self.walk(&path, found);
                }
            } else if self.accepts(&path) {
                found.insert(path);
            }
        }
    }
}
