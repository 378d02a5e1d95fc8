//! Perform Watch
//!
//! Polling change detection for watch mode. Every detected change is fed to
//! `DtsPlugin::on_watch_change` and followed by one emission pass.

use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::dts::diagnostics::DtsResult;
use crate::dts::emit::EmitReport;
use crate::dts::file_system::normalize_separators;
use crate::plugin::DtsPlugin;

const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

/// Watch mode configuration.
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Directories scanned recursively.
    pub paths: Vec<String>,
    pub poll_interval: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            poll_interval: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChangeEvent {
    Created(String),
    Modified(String),
    Deleted(String),
}

impl FileChangeEvent {
    pub fn path(&self) -> &str {
        match self {
            FileChangeEvent::Created(path)
            | FileChangeEvent::Modified(path)
            | FileChangeEvent::Deleted(path) => path,
        }
    }
}

/// Result of one watch iteration that saw changes.
#[derive(Debug, Clone, Default)]
pub struct WatchResult {
    pub changed_files: Vec<String>,
    pub report: EmitReport,
}

pub struct WatchCompiler {
    options: WatchOptions,
    file_times: HashMap<String, SystemTime>,
}

impl WatchCompiler {
    pub fn new(options: WatchOptions) -> Self {
        Self {
            options,
            file_times: HashMap::new(),
        }
    }

    /// Record the current modification times without reporting anything.
    pub fn snapshot(&mut self) {
        self.file_times = self.scan();
    }

    pub fn check_for_changes(&mut self) -> Vec<FileChangeEvent> {
        let current = self.scan();
        let mut changes = Vec::new();

        for (file, modified) in &current {
            match self.file_times.get(file) {
                None => changes.push(FileChangeEvent::Created(file.clone())),
                Some(previous) if modified > previous => {
                    changes.push(FileChangeEvent::Modified(file.clone()))
                }
                Some(_) => {}
            }
        }
        for file in self.file_times.keys() {
            if !current.contains_key(file) {
                changes.push(FileChangeEvent::Deleted(file.clone()));
            }
        }

        changes.sort_by(|a, b| a.path().cmp(b.path()));
        self.file_times = current;
        changes
    }

    /// Invalidate the plugin for each change, then emit once.
    pub fn apply(&self, plugin: &DtsPlugin, changes: &[FileChangeEvent]) -> DtsResult<WatchResult> {
        for change in changes {
            plugin.on_watch_change(change.path())?;
        }
        let report = plugin.on_emit()?;
        Ok(WatchResult {
            changed_files: changes.iter().map(|c| c.path().to_string()).collect(),
            report,
        })
    }

    /// Poll until `should_stop` returns true. Failed passes are logged and
    /// watching continues.
    pub fn run(&mut self, plugin: &DtsPlugin, should_stop: impl Fn() -> bool) {
        self.snapshot();
        while !should_stop() {
            std::thread::sleep(self.options.poll_interval);
            let changes = self.check_for_changes();
            if changes.is_empty() {
                continue;
            }
            tracing::info!(target: "dts", "{} file(s) changed, rebuilding declarations", changes.len());
            if let Err(error) = self.apply(plugin, &changes) {
                tracing::error!(target: "dts", "{}", error);
            }
        }
    }

    fn scan(&self) -> HashMap<String, SystemTime> {
        let mut times = HashMap::new();
        for path in &self.options.paths {
            collect_times(Path::new(path), &mut times);
        }
        times
    }
}

fn collect_times(dir: &Path, times: &mut HashMap<String, SystemTime>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if metadata.is_dir() {
            let skipped = path
                .file_name()
                .map_or(false, |name| SKIPPED_DIRS.iter().any(|s| name == *s));
            if !skipped {
                collect_times(&path, times);
            }
        } else if let Ok(modified) = metadata.modified() {
            times.insert(normalize_separators(&path.to_string_lossy()), modified);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use std::sync::Arc;

    use serde_json::json;

    use crate::config::PluginOptions;
    use crate::dts::logging::NullLogger;
    use crate::dts::program_driver::testing::EchoProgramFactory;

    fn watcher(dir: &Path) -> WatchCompiler {
        WatchCompiler::new(WatchOptions {
            paths: vec![normalize_separators(&dir.to_string_lossy())],
            ..Default::default()
        })
    }

    fn key(path: &Path) -> String {
        normalize_separators(&path.to_string_lossy())
    }

    #[test]
    fn test_detects_created_and_deleted_files() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("kept.ts");
        let removed = dir.path().join("removed.ts");
        fs::write(&kept, "").unwrap();
        fs::write(&removed, "").unwrap();

        let mut watcher = watcher(dir.path());
        watcher.snapshot();
        assert!(watcher.check_for_changes().is_empty());

        let added = dir.path().join("nested/added.ts");
        fs::create_dir_all(added.parent().unwrap()).unwrap();
        fs::write(&added, "").unwrap();
        fs::remove_file(&removed).unwrap();

        assert_eq!(
            watcher.check_for_changes(),
            vec![
                FileChangeEvent::Created(key(&added)),
                FileChangeEvent::Deleted(key(&removed)),
            ]
        );
        assert!(watcher.check_for_changes().is_empty());
    }

    #[test]
    fn test_detects_modified_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.ts");
        fs::write(&file, "").unwrap();

        let mut watcher = watcher(dir.path());
        watcher.snapshot();

        let handle = fs::OpenOptions::new().write(true).open(&file).unwrap();
        handle
            .set_modified(SystemTime::now() + Duration::from_secs(60))
            .unwrap();

        assert_eq!(watcher.check_for_changes(), vec![FileChangeEvent::Modified(key(&file))]);
    }

    #[test]
    fn test_skips_dependency_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut watcher = watcher(dir.path());
        watcher.snapshot();

        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.d.ts"), "").unwrap();
        assert!(watcher.check_for_changes().is_empty());
    }

    #[test]
    fn test_apply_rebuilds_declarations() {
        let dir = tempfile::tempdir().unwrap();
        let root = key(dir.path());
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("tsconfig.json"), r#"{ "include": ["src"] }"#).unwrap();
        fs::write(dir.path().join("src/a.ts"), "export declare const a: 1;\n").unwrap();

        let plugin = DtsPlugin::new(PluginOptions::from_json(json!({ "root": root })).unwrap())
            .with_logger(Arc::new(NullLogger::new()))
            .with_program_factory(Arc::new(EchoProgramFactory::new()));
        plugin.configure().unwrap();
        plugin.on_emit().unwrap();

        let mut watcher = watcher(&dir.path().join("src"));
        watcher.snapshot();
        fs::write(dir.path().join("src/b.ts"), "export declare const b: 2;\n").unwrap();

        let changes = watcher.check_for_changes();
        let result = watcher.apply(&plugin, &changes).unwrap();
        assert_eq!(result.changed_files, vec![format!("{}/src/b.ts", root)]);
        assert_eq!(
            result.report.files.get(&format!("{}/dist/b.d.ts", root)).map(String::as_str),
            Some("export declare const b: 2;\n")
        );
        assert!(dir.path().join("dist/a.d.ts").exists());
    }
}
