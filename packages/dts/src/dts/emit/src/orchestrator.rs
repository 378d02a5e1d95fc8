// Emission Orchestrator
//
// One emission pass over a runtime. Phases run in order and each fans its
// per-file work out on the emit pool; results are folded back on the
// calling thread.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use super::parallel::run_parallel;
use super::writer::{write_contained, write_output};
use crate::config::{EmitHooks, EmitOptions};
use crate::dts::bundler::{BundleOutput, BundleRequest, DeclarationBundler};
use crate::dts::diagnostics::{error_count, format_diagnostics, DtsError, DtsResult};
use crate::dts::entry_point::{has_default_export, plan_entries, resolve_types_path, synthesize_entry};
use crate::dts::file_system::{
    basename, is_within, join, relative, resolve, strip_dts_extension, AbsoluteFsPath, FileSystem,
};
use crate::dts::logging::SharedLogger;
use crate::dts::runtime::{DeclarationState, Runtime};
use crate::dts::sourcemaps::relocate_map;
use crate::dts::transform::{transform_code, TransformOptions};

const VUE_DECLARATION: &str = ".vue.d.ts";

pub struct EmitContext<'a> {
    pub hooks: &'a EmitHooks,
    pub bundler: Option<&'a dyn DeclarationBundler>,
}

#[derive(Debug, Clone, Default)]
pub struct EmitReport {
    /// Final path -> content of every file written, mirrors included.
    pub files: IndexMap<String, String>,
    /// Lifecycle state per source-space output.
    pub states: IndexMap<String, DeclarationState>,
    /// Targets that were refused or failed recoverably.
    pub skipped: Vec<String>,
}

/// A declaration written in the write phase.
struct Written {
    path: String,
    line_shift: usize,
}

/// Read-only settings shared by every worker of a pass.
struct Pass<'a> {
    fs: Arc<dyn FileSystem>,
    logger: SharedLogger,
    hooks: &'a EmitHooks,
    options: EmitOptions,
    out_dir: String,
    entry_root: String,
    public_root: String,
}

impl Pass<'_> {
    fn final_path(&self, source_path: &str) -> String {
        resolve(&self.out_dir, &relative(&self.entry_root, source_path))
    }

    /// Where the program originally put an output recorded at `key`.
    fn emitted_path(&self, key: &str) -> String {
        resolve(&self.out_dir, &relative(&self.public_root, key))
    }

    fn write(&self, out_dir: &str, path: &str, content: &str) -> DtsResult<Option<(String, String)>> {
        write_output(
            self.fs.as_ref(),
            self.hooks,
            self.options.strict_output,
            out_dir,
            path,
            content,
        )
    }

    /// Copy an already finalized file; hooks are not consulted again.
    fn copy(&self, out_dir: &str, path: &str, content: String) -> DtsResult<(String, String)> {
        write_contained(
            self.fs.as_ref(),
            self.options.strict_output,
            out_dir,
            path.to_string(),
            content,
        )
    }

    /// Recoverable errors are logged and reported as `None`.
    fn settle<T>(&self, target: &str, result: DtsResult<T>, skipped: &mut Vec<String>) -> DtsResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.is_recoverable() => {
                self.logger.warn(&error.to_string());
                skipped.push(target.to_string());
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }
}

pub fn emit_declarations(runtime: &mut Runtime, ctx: &EmitContext<'_>) -> DtsResult<EmitReport> {
    let logger = runtime.logger().clone();

    // Drain
    for error in runtime.drain_pending() {
        logger.warn(&error.to_string());
    }
    report_diagnostics(runtime, ctx.hooks)?;

    let pass = Pass {
        fs: runtime.fs().clone(),
        logger: logger.clone(),
        hooks: ctx.hooks,
        options: runtime.emit_options().clone(),
        out_dir: runtime.primary_out_dir().to_string(),
        entry_root: runtime.entry_root().to_string(),
        public_root: runtime.public_root().to_string(),
    };
    let mut report = EmitReport::default();

    // Partition
    let outputs = runtime.outputs().clone();
    let (maps, declarations): (Vec<_>, Vec<_>) =
        outputs.iter().partition(|(path, _)| path.ends_with(".map"));
    let renames = clean_vue_names(&pass.options, &outputs);

    // Declarations
    let aliases = runtime.aliases().to_vec();
    let aliases_exclude = runtime.aliases_exclude().to_vec();
    let static_import = pass.options.static_import();
    let jobs: Vec<(String, String, String)> = declarations
        .iter()
        .map(|(key, content)| {
            let source_path = renames.get(*key).cloned().unwrap_or_else(|| (*key).clone());
            ((*key).clone(), source_path, (*content).clone())
        })
        .collect();
    let results = run_parallel(jobs, |(key, source_path, content)| {
        let transformed = transform_code(
            &content,
            &TransformOptions {
                file_path: &source_path,
                aliases: &aliases,
                aliases_exclude: &aliases_exclude,
                static_import,
                clear_pure_import: pass.options.clear_pure_import,
                clean_vue_file_name: pass.options.clean_vue_file_name,
            },
        );
        let target = pass.final_path(&source_path);
        let result = pass.write(&pass.out_dir, &target, &transformed.content);
        (key, target, result, transformed)
    });

    let mut written: HashMap<String, Written> = HashMap::new();
    let mut dropped: HashSet<String> = HashSet::new();
    let mut declare_modules: IndexSet<String> = IndexSet::new();
    for (key, target, result, transformed) in results {
        runtime.advance_state(&key, DeclarationState::Transformed);
        declare_modules.extend(transformed.declare_modules);
        match pass.settle(&target, result, &mut report.skipped)? {
            Some(Some((path, content))) => {
                runtime.advance_state(&key, DeclarationState::Written);
                report.files.insert(path.clone(), content);
                written.insert(
                    key,
                    Written {
                        path,
                        line_shift: transformed.diff_line_count,
                    },
                );
            }
            Some(None) => {
                logger.debug(&format!("Skipped {} by hook", target));
                dropped.insert(key);
            }
            None => {
                dropped.insert(key);
            }
        }
    }

    // Maps
    let jobs: Vec<(String, String)> = maps
        .iter()
        .filter(|(key, _)| {
            let kept = !dropped.contains(key.trim_end_matches(".map"));
            if !kept {
                logger.debug(&format!("Skipped {} with its declaration", key));
            }
            kept
        })
        .map(|(key, content)| ((*key).clone(), (*content).clone()))
        .collect();
    let results = run_parallel(jobs, |(key, content)| {
        let declaration_key = key.trim_end_matches(".map");
        let (target, line_shift) = match written.get(declaration_key) {
            Some(declaration) => (format!("{}.map", declaration.path), declaration.line_shift),
            None => {
                let source_path = renames
                    .get(declaration_key)
                    .map_or_else(|| key.clone(), |renamed| format!("{}.map", renamed));
                (pass.final_path(&source_path), 0)
            }
        };
        let content = match relocate_map(&content, &pass.emitted_path(&key), &target, line_shift) {
            Ok(relocated) => relocated,
            Err(error) => {
                pass.logger.warn(&error.to_string());
                content
            }
        };
        let result = pass.write(&pass.out_dir, &target, &content);
        (key, target, result)
    });
    for (key, target, result) in results {
        runtime.advance_state(&key, DeclarationState::Transformed);
        if let Some(Some((path, content))) = pass.settle(&target, result, &mut report.skipped)? {
            runtime.advance_state(&key, DeclarationState::Written);
            report.files.insert(path, content);
        }
    }

    // Entries
    let mut bundle_targets: Vec<(String, String)> = Vec::new();
    if pass.options.synthesizes_entries() {
        if runtime.entries().is_empty() {
            logger.debug("No entries configured, skipping entry declarations");
        }
        let types_path = resolve_types_path(
            pass.fs.as_ref(),
            runtime.root(),
            &pass.out_dir,
            pass.options.types_path.as_deref(),
            logger.as_ref(),
        );
        if runtime.entries().is_empty() && pass.options.rollup_types {
            let name = strip_dts_extension(&basename(&types_path));
            bundle_targets.push((name, types_path.clone()));
        }
        for entry in plan_entries(runtime.entries(), &pass.out_dir, &pass.entry_root, &types_path) {
            bundle_targets.push((entry.name.clone(), entry.target.clone()));
            let exists = report.files.contains_key(&entry.target)
                || pass.fs.exists(&AbsoluteFsPath::new(&entry.target));
            if exists {
                logger.debug(&format!("Entry {} already exists", entry.target));
                continue;
            }
            let has_default = report
                .files
                .get(&entry.declaration)
                .cloned()
                .or_else(|| pass.fs.read_file(&AbsoluteFsPath::new(&entry.declaration)).ok())
                .map_or(false, |code| has_default_export(&code));
            let content = synthesize_entry(&entry.import_path(), has_default);
            let result = pass.write(&pass.out_dir, &entry.target, &content);
            if let Some(Some((path, content))) = pass.settle(&entry.target, result, &mut report.skipped)? {
                report.files.insert(path, content);
            }
        }
    }

    // Rollup
    let finished = if pass.options.rollup_types {
        rollup(runtime, ctx, &pass, &bundle_targets, &declare_modules, &mut report)?;
        DeclarationState::RolledUp
    } else {
        DeclarationState::Finalized
    };
    let keys: Vec<String> = runtime.states().keys().cloned().collect();
    for key in keys {
        runtime.advance_state(&key, finished);
    }

    // Mirrors
    for mirror in runtime.out_dirs()[1..].to_vec() {
        let jobs: Vec<(String, String)> = report
            .files
            .iter()
            .filter(|(path, _)| is_within(&pass.out_dir, path))
            .map(|(path, content)| (path.clone(), content.clone()))
            .collect();
        let results = run_parallel(jobs, |(path, content)| {
            let target = resolve(&mirror, &relative(&pass.out_dir, &path));
            let content = if path.ends_with(".map") {
                relocate_map(&content, &path, &target, 0).unwrap_or(content)
            } else {
                content
            };
            let result = pass.copy(&mirror, &target, content);
            (target, result)
        });
        for (target, result) in results {
            if let Some((path, content)) = pass.settle(&target, result, &mut report.skipped)? {
                report.files.insert(path, content);
            }
        }
    }

    ctx.hooks.after_build(&report.files);
    report.states = runtime.states().clone();
    logger.info(&format!(
        "Declaration files built: {} file(s) in {}",
        report.files.len(),
        pass.out_dir
    ));
    Ok(report)
}

fn report_diagnostics(runtime: &Runtime, hooks: &EmitHooks) -> DtsResult<()> {
    let diagnostics = runtime.diagnostics();
    hooks.after_diagnostics(diagnostics);
    if diagnostics.is_empty() {
        return Ok(());
    }
    let formatted = format_diagnostics(diagnostics);
    let errors = error_count(diagnostics);
    if errors > 0 && runtime.emit_options().diagnostics_fatal {
        return Err(DtsError::Diagnostics {
            count: errors,
            formatted,
        });
    }
    runtime.logger().warn(formatted.trim_end());
    Ok(())
}

/// `X.vue.d.ts` -> `X.d.ts` where nothing else claims `X.d.ts`.
fn clean_vue_names(options: &EmitOptions, outputs: &IndexMap<String, String>) -> HashMap<String, String> {
    if !options.clean_vue_file_name {
        return HashMap::new();
    }
    outputs
        .keys()
        .filter_map(|key| {
            let stem = key.strip_suffix(VUE_DECLARATION)?;
            let cleaned = format!("{}.d.ts", stem);
            (!outputs.contains_key(&cleaned)).then(|| (key.clone(), cleaned))
        })
        .collect()
}

fn rollup(
    runtime: &Runtime,
    ctx: &EmitContext<'_>,
    pass: &Pass<'_>,
    targets: &[(String, String)],
    declare_modules: &IndexSet<String>,
    report: &mut EmitReport,
) -> DtsResult<()> {
    let bundler = ctx.bundler.ok_or_else(|| DtsError::BundlerInvocation {
        entry: targets.first().map_or_else(String::new, |(name, _)| name.clone()),
        source: anyhow::anyhow!("no declaration bundler configured"),
    })?;
    if targets.is_empty() {
        return Err(DtsError::BundlerInvocation {
            entry: String::new(),
            source: anyhow::anyhow!("no entry declaration to roll up"),
        });
    }
    // Nothing is removed until every entry is known to exist.
    for (name, target) in targets {
        if !report.files.contains_key(target) && !pass.fs.exists(&AbsoluteFsPath::new(target)) {
            return Err(DtsError::BundlerInvocation {
                entry: name.clone(),
                source: anyhow::anyhow!("entry declaration {} was not emitted", target),
            });
        }
    }

    let requests: Vec<(String, BundleRequest)> = targets
        .iter()
        .map(|(name, target)| {
            (
                name.clone(),
                BundleRequest {
                    root: runtime.root().to_string(),
                    compiler_options: runtime.raw_compiler_options(),
                    out_dir: pass.out_dir.clone(),
                    entry_path: target.clone(),
                    file_name: relative(&pass.out_dir, target),
                    bundle_config: pass.options.bundle_config.clone(),
                },
            )
        })
        .collect();
    let results = run_parallel(requests, |(name, request)| {
        let result = bundler.bundle(&request);
        (name, request.entry_path, result)
    });

    let mut bundles: Vec<(String, BundleOutput)> = Vec::with_capacity(results.len());
    for (name, target, result) in results {
        let output = result.map_err(|source| DtsError::BundlerInvocation {
            entry: name.clone(),
            source,
        })?;
        ctx.hooks.after_rollup(&name, &output);
        bundles.push((target, output));
    }

    for path in report.files.keys() {
        if bundles.iter().any(|(target, _)| target == path) {
            continue;
        }
        let path = AbsoluteFsPath::new(path);
        if pass.fs.exists(&path) {
            pass.fs
                .remove_file(&path)
                .map_err(|e| DtsError::io(path.as_str(), e))?;
        }
    }
    remove_empty_dirs(pass.fs.as_ref(), &pass.out_dir, true);
    report.files.clear();

    for (target, output) in bundles {
        let mut content = output.content;
        let missing: Vec<&String> = declare_modules
            .iter()
            .filter(|m| !content.contains(m.as_str()))
            .collect();
        for module in missing {
            if !content.ends_with('\n') {
                content.push('\n');
            }
            content.push('\n');
            content.push_str(module);
            content.push('\n');
        }
        let result = pass.write(&pass.out_dir, &target, &content);
        if let Some(Some((path, content))) = pass.settle(&target, result, &mut report.skipped)? {
            report.files.insert(path, content);
        }
    }
    Ok(())
}

/// Remove directories left empty below `dir`. Returns whether `dir` is
/// empty afterwards.
fn remove_empty_dirs(fs: &dyn FileSystem, dir: &str, keep: bool) -> bool {
    let path = AbsoluteFsPath::new(dir);
    let Ok(entries) = fs.readdir(&path) else {
        return false;
    };
    let mut empty = true;
    for entry in entries {
        let child = join(dir, &[entry.as_str()]);
        if fs.is_directory(&AbsoluteFsPath::new(&child)) {
            if !remove_empty_dirs(fs, &child, false) {
                empty = false;
            }
        } else {
            empty = false;
        }
    }
    if empty && !keep {
        return fs.remove_dir(&path).is_ok();
    }
    empty
}
