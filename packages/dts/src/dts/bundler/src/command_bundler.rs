// Command Bundler
//
// Runs an external bundling command. The command receives the path of a
// generated JSON config as its last argument and must write the merged
// declaration to the config's `outFile`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{bail, Context};
use serde_json::json;

use super::api::{merge_json, BundleOutput, BundleRequest, DeclarationBundler};

static JOB_COUNTER: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone)]
pub struct CommandBundler {
    program: String,
    args: Vec<String>,
    work_dir: PathBuf,
}

impl CommandBundler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            work_dir: std::env::temp_dir(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Directory for generated configs and intermediate output.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    fn job_paths(&self) -> (PathBuf, PathBuf) {
        let job = JOB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let stem = format!("dts-bundle-{}-{}", std::process::id(), job);
        (
            self.work_dir.join(format!("{}.json", stem)),
            self.work_dir.join(format!("{}.d.ts", stem)),
        )
    }

    fn run(&self, request: &BundleRequest, config_path: &Path, out_file: &Path) -> anyhow::Result<BundleOutput> {
        let mut config = json!({
            "projectFolder": request.root,
            "mainEntryPointFilePath": request.entry_path,
            "compilerOptions": request.compiler_options,
            "outFile": out_file.to_string_lossy(),
            "fileName": request.file_name,
        });
        merge_json(&mut config, &request.bundle_config);
        fs::write(config_path, serde_json::to_string_pretty(&config)?)
            .with_context(|| format!("failed to write {}", config_path.display()))?;

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(config_path)
            .current_dir(&request.root)
            .output()
            .with_context(|| format!("failed to run '{}'", self.program))?;
        if !output.status.success() {
            bail!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let content = fs::read_to_string(out_file)
            .with_context(|| format!("'{}' did not produce {}", self.program, out_file.display()))?;
        let messages = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Ok(BundleOutput { content, messages })
    }
}

impl DeclarationBundler for CommandBundler {
    fn bundle(&self, request: &BundleRequest) -> anyhow::Result<BundleOutput> {
        let (config_path, out_file) = self.job_paths();
        let result = self.run(request, &config_path, &out_file);
        let _ = fs::remove_file(&config_path);
        let _ = fs::remove_file(&out_file);
        result
    }
}
