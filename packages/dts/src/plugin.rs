//! Lifecycle Plugin
//!
//! A build-tool-agnostic wrapper around one emitter: `configure` builds the
//! runtime, `on_transform` feeds modules through it, `on_watch_change`
//! invalidates it and `on_emit` runs an emission pass. Passes are serialized
//! behind a mutex.

use std::sync::{Arc, Mutex, MutexGuard};

use ts::ProgramFactory;

use crate::config::{EmitHooks, PluginOptions};
use crate::dts::bundler::DeclarationBundler;
use crate::dts::diagnostics::{DtsError, DtsResult};
use crate::dts::emit::{emit_declarations, EmitContext, EmitReport};
use crate::dts::file_system::{ensure_absolute, FileSystem, OsFileSystem};
use crate::dts::logging::{SharedLogger, TracingLogger};
use crate::dts::program_driver::IsolatedDeclarationProgramFactory;
use crate::dts::resolvers::Resolver;
use crate::dts::runtime::{CapabilityProbe, PackageJsonProbe, Runtime};

pub struct DtsPlugin {
    options: PluginOptions,
    hooks: EmitHooks,
    fs: Arc<dyn FileSystem>,
    logger: SharedLogger,
    factory: Arc<dyn ProgramFactory>,
    probe: Option<Arc<dyn CapabilityProbe>>,
    resolvers: Vec<Arc<dyn Resolver>>,
    bundler: Option<Arc<dyn DeclarationBundler>>,
    runtime: Mutex<Option<Runtime>>,
}

impl DtsPlugin {
    pub fn new(options: PluginOptions) -> Self {
        Self {
            options,
            hooks: EmitHooks::default(),
            fs: Arc::new(OsFileSystem::new()),
            logger: Arc::new(TracingLogger::default()),
            factory: Arc::new(IsolatedDeclarationProgramFactory),
            probe: None,
            resolvers: Vec::new(),
            bundler: None,
            runtime: Mutex::new(None),
        }
    }

    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_program_factory(mut self, factory: Arc<dyn ProgramFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Custom resolvers are registered after the built-in ones.
    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    pub fn with_hooks(mut self, hooks: EmitHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Required when `rollupTypes` is on.
    pub fn with_bundler(mut self, bundler: Arc<dyn DeclarationBundler>) -> Self {
        self.bundler = Some(bundler);
        self
    }

    /// Replaces the default `package.json` probe.
    pub fn with_probe(mut self, probe: Arc<dyn CapabilityProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    pub fn is_configured(&self) -> bool {
        self.lock().is_some()
    }

    /// Build (or rebuild) the runtime from the options.
    pub fn configure(&self) -> DtsResult<()> {
        let root = match &self.options.root {
            Some(root) => ensure_absolute(root, OsFileSystem::pwd().as_str()),
            None => OsFileSystem::pwd().into_string(),
        };
        let capabilities = match &self.probe {
            Some(probe) => probe.probe(&root),
            None => PackageJsonProbe::new(self.fs.clone()).probe(&root),
        };
        self.logger.debug(&format!("Capabilities for {}: {:?}", root, capabilities));

        let mut runtime = Runtime::new(
            &self.options,
            capabilities,
            self.factory.clone(),
            self.fs.clone(),
            self.logger.clone(),
        )?;
        runtime.register_resolvers(self.resolvers.iter().cloned());
        *self.lock() = Some(runtime);
        Ok(())
    }

    /// Resolver failures abandon the module and are logged.
    pub fn on_transform(&self, id: &str, code: &str) -> DtsResult<()> {
        let mut guard = self.lock();
        let runtime = guard.as_mut().ok_or(DtsError::NotConfigured)?;
        match runtime.transform(id, code) {
            Err(error @ DtsError::ResolverTransform { .. }) => {
                self.logger.warn(&error.to_string());
                Ok(())
            }
            other => other,
        }
    }

    pub fn on_watch_change(&self, id: &str) -> DtsResult<()> {
        let mut guard = self.lock();
        let runtime = guard.as_mut().ok_or(DtsError::NotConfigured)?;
        runtime.invalidate(id);
        Ok(())
    }

    pub fn on_emit(&self) -> DtsResult<EmitReport> {
        let mut guard = self.lock();
        let runtime = guard.as_mut().ok_or(DtsError::NotConfigured)?;
        let ctx = EmitContext {
            hooks: &self.hooks,
            bundler: self.bundler.as_deref(),
        };
        emit_declarations(runtime, &ctx)
    }

    /// Run `f` against the configured runtime.
    pub fn with_runtime<R>(&self, f: impl FnOnce(&Runtime) -> R) -> DtsResult<R> {
        let guard = self.lock();
        guard.as_ref().map(f).ok_or(DtsError::NotConfigured)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Runtime>> {
        self.runtime.lock().unwrap_or_else(|e| e.into_inner())
    }
}
