// Runtime Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use indexmap::IndexMap;

    use crate::config::{OneOrMany, PluginOptions};
    use crate::dts::diagnostics::DtsError;
    use crate::dts::file_system::*;
    use crate::dts::logging::{CapturingLogger, LogLevel, NullLogger, SharedLogger};
    use crate::dts::program_driver::testing::EchoProgramFactory;
    use crate::dts::resolvers::{Resolver, ResolverContext, ResolverOutput};
    use crate::dts::runtime::*;

    const TSCONFIG: &str = r#"{
        // project config
        "compilerOptions": {
            "baseUrl": ".",
            "paths": { "@/*": ["src/*"] },
        },
        "include": ["src"]
    }"#;

    fn project(extra: Vec<(&str, &str)>) -> MemoryFileSystem {
        let fs = MemoryFileSystem::new();
        let mut files = vec![
            ("/p/tsconfig.json", TSCONFIG),
            ("/p/src/index.ts", "export * from './utils/a';\n"),
            ("/p/src/utils/a.ts", "export declare const a: number;\n"),
            ("/p/src/types.d.ts", "declare const VERSION: string;\n"),
            ("/p/node_modules/x/index.ts", "export {};\n"),
            ("/p/dist/old.d.ts", "export {};\n"),
        ];
        files.extend(extra);
        fs.init_with_files(files);
        fs
    }

    fn options() -> PluginOptions {
        PluginOptions {
            root: Some("/p".into()),
            ..Default::default()
        }
    }

    fn build(
        options: &PluginOptions,
        fs: &MemoryFileSystem,
        factory: Arc<EchoProgramFactory>,
        capabilities: Capabilities,
    ) -> Result<Runtime, DtsError> {
        Runtime::new(
            options,
            capabilities,
            factory,
            Arc::new(fs.clone()),
            Arc::new(NullLogger::new()),
        )
    }

    fn runtime(fs: &MemoryFileSystem) -> Runtime {
        build(&options(), fs, Arc::new(EchoProgramFactory::new()), Capabilities::default()).unwrap()
    }

    struct Failing;

    impl Resolver for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn supports(&self, id: &str) -> bool {
            id.ends_with(".broken")
        }
        fn transform(&self, _ctx: &ResolverContext<'_>) -> anyhow::Result<ResolverOutput> {
            anyhow::bail!("cannot read component")
        }
    }

    struct Silent;

    impl Resolver for Silent {
        fn name(&self) -> &str {
            "silent"
        }
        fn supports(&self, id: &str) -> bool {
            id.ends_with(".js")
        }
        fn transform(&self, _ctx: &ResolverContext<'_>) -> anyhow::Result<ResolverOutput> {
            Ok(ResolverOutput::default())
        }
    }

    mod filter_tests {
        use super::*;

        #[test]
        fn should_include_everything_but_node_modules_by_default() {
            let filter = GlobFilter::with_defaults("/p").unwrap();
            assert!(filter.matches("/p/src/a.ts"));
            assert!(filter.matches("/p/a.ts?vue&type=script"));
            assert!(!filter.matches("/p/node_modules/x/a.ts"));
            assert!(!filter.matches("/elsewhere/a.ts"));
        }

        #[test]
        fn should_expand_directory_patterns() {
            let filter = GlobFilter::new("/p", &["src".into()], &["src/internal".into()]).unwrap();
            assert!(filter.matches("/p/src/deep/a.ts"));
            assert!(!filter.matches("/p/lib/a.ts"));
            assert!(!filter.matches("/p/src/internal/a.ts"));
        }

        #[test]
        fn should_not_cross_directories_with_single_star() {
            let filter = GlobFilter::new("/p", &["src/*.ts".into()], &[]).unwrap();
            assert!(filter.matches("/p/src/a.ts"));
            assert!(!filter.matches("/p/src/deep/a.ts"));
        }

        #[test]
        fn should_reject_invalid_pattern() {
            assert!(GlobFilter::new("/p", &["src/[".into()], &[]).is_err());
        }
    }

    mod alias_table_tests {
        use super::*;

        #[test]
        fn should_infer_aliases_from_paths() {
            let mut paths = IndexMap::new();
            paths.insert("@/*".to_string(), vec!["src/*".to_string(), "lib/*".to_string()]);
            paths.insert("~".to_string(), vec!["src/index.ts".to_string()]);

            let aliases = aliases_from_paths(&paths, "/p").unwrap();
            assert_eq!(aliases.len(), 2);
            assert_eq!(aliases[0].apply("@/utils/a"), "/p/src/utils/a");
            assert_eq!(aliases[1].apply("~"), "/p/src/index.ts");
        }

        #[test]
        fn should_skip_entries_without_replacement() {
            let mut paths = IndexMap::new();
            paths.insert("@/*".to_string(), Vec::new());
            assert!(aliases_from_paths(&paths, "/p").unwrap().is_empty());
        }
    }

    mod state_tests {
        use super::*;

        #[test]
        fn should_follow_lifecycle() {
            let mut state = DeclarationState::Pending;
            assert!(state.advance(DeclarationState::ProgramEmitted));
            assert!(state.advance(DeclarationState::Transformed));
            assert!(state.advance(DeclarationState::Written));
            assert!(state.advance(DeclarationState::Finalized));
            assert!(state.is_terminal());
        }

        #[test]
        fn should_refuse_skipping_steps() {
            let mut state = DeclarationState::Pending;
            assert!(!state.advance(DeclarationState::Written));
            assert_eq!(state, DeclarationState::Pending);
            assert!(!DeclarationState::Written.can_transition_to(DeclarationState::Transformed));
            assert!(DeclarationState::Written.can_transition_to(DeclarationState::RolledUp));
        }
    }

    mod capabilities_tests {
        use super::*;

        #[test]
        fn should_detect_vue_in_any_dependency_table() {
            let fs = MemoryFileSystem::new();
            fs.init_with_files(vec![(
                "/p/package.json",
                r#"{ "peerDependencies": { "vue": "^3.0.0" } }"#,
            )]);
            let probe = PackageJsonProbe::new(Arc::new(fs));
            assert!(probe.probe("/p").vue);
        }

        #[test]
        fn should_default_without_manifest() {
            let probe = PackageJsonProbe::new(Arc::new(MemoryFileSystem::new()));
            assert_eq!(probe.probe("/p"), Capabilities::default());
        }
    }

    mod construction_tests {
        use super::*;

        #[test]
        fn should_discover_root_files() {
            let runtime = runtime(&project(vec![]));
            assert_eq!(
                runtime.root_names(),
                &[
                    "/p/src/index.ts".to_string(),
                    "/p/src/types.d.ts".to_string(),
                    "/p/src/utils/a.ts".to_string(),
                ]
            );
            assert_eq!(runtime.root_files().len(), 3);
        }

        #[test]
        fn should_compute_roots_and_force_declaration_options() {
            let runtime = runtime(&project(vec![]));
            assert_eq!(runtime.public_root(), "/p/src");
            assert_eq!(runtime.entry_root(), "/p/src");
            assert_eq!(runtime.primary_out_dir(), "/p/dist");

            let options = runtime.compiler_options();
            assert_eq!(options.declaration, Some(true));
            assert_eq!(options.emit_declaration_only, Some(true));
            assert_eq!(options.no_emit, Some(false));
            assert_eq!(options.out_dir.as_deref(), Some("/p/dist"));
            assert_eq!(options.root_dir.as_deref(), Some("/p/src"));
            assert_eq!(runtime.raw_compiler_options()["rootDir"], "/p/src");
        }

        #[test]
        fn should_infer_aliases_after_explicit_ones() {
            let fs = project(vec![]);
            let options = PluginOptions::from_json(serde_json::json!({
                "root": "/p",
                "aliases": { "#": "/p/lib" }
            }))
            .unwrap();
            let runtime =
                build(&options, &fs, Arc::new(EchoProgramFactory::new()), Capabilities::default())
                    .unwrap();

            assert_eq!(runtime.aliases().len(), 2);
            assert_eq!(runtime.aliases()[0].apply("#/x"), "/p/lib/x");
            assert_eq!(runtime.aliases()[1].apply("@/utils/a"), "/p/src/utils/a");
        }

        #[test]
        fn should_skip_path_aliases_when_disabled() {
            let fs = project(vec![]);
            let options = PluginOptions {
                path_alias: false,
                ..options()
            };
            let runtime =
                build(&options, &fs, Arc::new(EchoProgramFactory::new()), Capabilities::default())
                    .unwrap();
            assert!(runtime.aliases().is_empty());
        }

        #[test]
        fn should_apply_overrides_relative_to_root() {
            let fs = project(vec![]);
            let mut options = options();
            options.out_dir = Some(OneOrMany::Many(vec!["types".into(), "mirror".into()]));
            options.entry_root = Some(".".into());
            options
                .compiler_options
                .insert("rootDir".into(), serde_json::json!("."));
            let runtime =
                build(&options, &fs, Arc::new(EchoProgramFactory::new()), Capabilities::default())
                    .unwrap();

            assert_eq!(runtime.out_dirs(), &["/p/types".to_string(), "/p/mirror".to_string()]);
            assert_eq!(runtime.public_root(), "/p");
            assert_eq!(runtime.entry_root(), "/p");
        }

        #[test]
        fn should_use_config_dir_when_composite() {
            let fs = MemoryFileSystem::new();
            fs.init_with_files(vec![
                ("/p/tsconfig.json", r#"{ "compilerOptions": { "composite": true } }"#),
                ("/p/src/a/index.ts", "export {};\n"),
            ]);
            let runtime = runtime(&fs);
            assert_eq!(runtime.public_root(), "/p");
        }

        #[test]
        fn should_include_components_only_with_vue() {
            let fs = project(vec![("/p/src/App.vue", "<template></template>\n")]);
            let without = runtime(&fs);
            assert!(!without.root_names().contains(&"/p/src/App.vue".to_string()));
            assert_eq!(without.registry().names(), vec!["json"]);

            let with = build(
                &options(),
                &fs,
                Arc::new(EchoProgramFactory::new()),
                Capabilities { vue: true },
            )
            .unwrap();
            assert!(with.root_names().contains(&"/p/src/App.vue".to_string()));
            assert_eq!(with.registry().names(), vec!["json", "vue"]);
        }

        #[test]
        fn should_fail_on_missing_explicit_tsconfig() {
            let fs = project(vec![]);
            let options = PluginOptions {
                tsconfig_path: Some("tsconfig.build.json".into()),
                ..options()
            };
            let result =
                build(&options, &fs, Arc::new(EchoProgramFactory::new()), Capabilities::default());
            assert!(matches!(result, Err(DtsError::ConfigResolution { .. })));
        }

        #[test]
        fn should_fail_when_program_cannot_be_built() {
            let fs = project(vec![]);
            let result = build(
                &options(),
                &fs,
                Arc::new(EchoProgramFactory::failing("bad options")),
                Capabilities::default(),
            );
            match result {
                Err(DtsError::ConfigResolution { message, .. }) => assert_eq!(message, "bad options"),
                _ => panic!("expected a configuration error"),
            }
        }
    }

    mod transform_tests {
        use super::*;

        #[test]
        fn should_emit_each_module_once() {
            let mut runtime = runtime(&project(vec![]));
            runtime.transform("/p/src/utils/a.ts", "").unwrap();
            runtime.transform("/p/src/utils/a.ts?t=1", "").unwrap();

            assert_eq!(runtime.outputs().len(), 1);
            assert_eq!(
                runtime.outputs()["/p/src/utils/a.d.ts"],
                "export declare const a: number;\n"
            );
            assert_eq!(
                runtime.states()["/p/src/utils/a.d.ts"],
                DeclarationState::ProgramEmitted
            );
            assert!(runtime.transformed().contains("/p/src/utils/a.ts"));
            assert!(!runtime.root_files().contains("/p/src/utils/a.ts"));
        }

        #[test]
        fn should_ignore_filtered_and_unknown_modules() {
            let fs = project(vec![("/p/other/x.ts", "export {};\n"), ("/p/src/style.css", "")]);
            let mut runtime = runtime(&fs);
            runtime.transform("/p/other/x.ts", "").unwrap();
            runtime.transform("/p/src/style.css", "").unwrap();

            assert!(runtime.outputs().is_empty());
            assert!(runtime.transformed().is_empty());
        }

        #[test]
        fn should_resolve_json_modules() {
            let fs = project(vec![("/p/src/data.json", "{\"a\":1}")]);
            let mut runtime = runtime(&fs);
            runtime.transform("/p/src/data.json", "{\"a\":1}").unwrap();

            assert_eq!(
                runtime.outputs()["/p/src/data.json.d.ts"],
                "declare const _default: {\"a\":1};\n\nexport default _default;\n"
            );
            assert_eq!(runtime.states()["/p/src/data.json.d.ts"], DeclarationState::Resolved);
        }

        #[test]
        fn should_pick_up_sibling_declaration() {
            let fs = project(vec![
                ("/p/src/legacy.js", "module.exports = 1;\n"),
                ("/p/src/legacy.d.ts", "declare const legacy: number;\nexport = legacy;\n"),
            ]);
            let mut runtime = runtime(&fs);
            runtime.register_resolvers([Arc::new(Silent) as Arc<dyn Resolver>]);
            runtime.transform("/p/src/legacy.js", "").unwrap();

            assert_eq!(
                runtime.outputs()["/p/src/legacy.d.ts"],
                "declare const legacy: number;\nexport = legacy;\n"
            );
        }

        #[test]
        fn should_wrap_resolver_failures() {
            let mut runtime = runtime(&project(vec![]));
            runtime.register_resolvers([Arc::new(Failing) as Arc<dyn Resolver>]);

            let error = runtime.transform("/p/src/a.broken", "").unwrap_err();
            match &error {
                DtsError::ResolverTransform { resolver, id, .. } => {
                    assert_eq!(resolver, "failing");
                    assert_eq!(id, "/p/src/a.broken");
                }
                other => panic!("unexpected error: {}", other),
            }
            assert!(error.is_recoverable());
            assert!(runtime.transformed().contains("/p/src/a.broken"));
        }
    }

    mod drain_tests {
        use super::*;

        #[test]
        fn should_emit_remaining_root_files() {
            let mut runtime = runtime(&project(vec![]));
            runtime.transform("/p/src/index.ts", "").unwrap();
            let errors = runtime.drain_pending();

            assert!(errors.is_empty());
            assert!(runtime.root_files().is_empty());
            let keys: Vec<&String> = runtime.outputs().keys().collect();
            assert_eq!(keys, vec!["/p/src/index.d.ts", "/p/src/utils/a.d.ts"]);
        }

        #[test]
        fn should_copy_declaration_files_when_asked() {
            let fs = project(vec![]);
            let mut options = options();
            options.emit.copy_dts_files = true;
            let mut runtime =
                build(&options, &fs, Arc::new(EchoProgramFactory::new()), Capabilities::default())
                    .unwrap();
            runtime.drain_pending();

            assert_eq!(
                runtime.outputs()["/p/src/types.d.ts"],
                "declare const VERSION: string;\n"
            );
        }
    }

    mod invalidation_tests {
        use super::*;

        #[test]
        fn should_rearm_root_files_and_rebuild() {
            let fs = project(vec![]);
            let factory = Arc::new(EchoProgramFactory::new());
            let mut runtime =
                build(&options(), &fs, factory.clone(), Capabilities::default()).unwrap();
            runtime.drain_pending();
            assert!(!runtime.outputs().is_empty());

            fs.init_with_files(vec![("/p/src/b.ts", "export declare const b: string;\n")]);
            runtime.invalidate("/p/src/b.ts");

            assert_eq!(factory.created(), 2);
            assert!(runtime.outputs().is_empty());
            assert!(runtime.transformed().is_empty());
            assert_eq!(runtime.root_files().len(), 4);
            assert!(runtime.root_names().contains(&"/p/src/b.ts".to_string()));

            runtime.transform("/p/src/b.ts", "").unwrap();
            assert!(runtime.outputs().contains_key("/p/src/b.d.ts"));
        }

        #[test]
        fn should_forget_removed_files() {
            let fs = project(vec![]);
            let mut runtime = runtime(&fs);
            fs.remove_file(&AbsoluteFsPath::new("/p/src/utils/a.ts")).unwrap();
            runtime.invalidate("/p/src/utils/a.ts");
            assert!(!runtime.root_names().contains(&"/p/src/utils/a.ts".to_string()));
        }

        #[test]
        fn should_keep_previous_program_when_rebuild_fails() {
            let fs = project(vec![]);
            let factory = Arc::new(EchoProgramFactory::new());
            let logger = Arc::new(CapturingLogger::new());
            let mut runtime = Runtime::new(
                &options(),
                Capabilities::default(),
                factory.clone(),
                Arc::new(fs.clone()),
                logger.clone() as SharedLogger,
            )
            .unwrap();

            factory.set_failure(Some("broken".into()));
            runtime.rebuild_program();

            assert_eq!(logger.at(LogLevel::Warn).len(), 1);
            assert!(runtime
                .diagnostics()
                .iter()
                .any(|d| d.message_text.flatten() == "broken"));
            runtime.transform("/p/src/utils/a.ts", "").unwrap();
            assert!(runtime.outputs().contains_key("/p/src/utils/a.d.ts"));
        }
    }
}
