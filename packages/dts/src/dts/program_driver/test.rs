// Program Driver Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::dts::file_system::*;
    use crate::dts::program_driver::*;
    use ts::{CompilerOptions, Program, ProgramFactory};

    fn host(files: Vec<(&str, &str)>) -> Arc<dyn ts::CompilerHost> {
        let fs = MemoryFileSystem::new();
        fs.init_with_files(files);
        Arc::new(FileSystemCompilerHost::new(Arc::new(fs), "/root"))
    }

    fn options(out_dir: &str) -> CompilerOptions {
        CompilerOptions {
            out_dir: Some(out_dir.to_string()),
            declaration: Some(true),
            emit_declaration_only: Some(true),
            ..Default::default()
        }
    }

    fn emit_all(program: &dyn Program, target: Option<&str>) -> Vec<(String, String)> {
        let mut written = Vec::new();
        program.emit(target, &mut |path: &str, content: &str| {
            written.push((path.to_string(), content.to_string()))
        });
        written
    }

    mod vue_script_tests {
        use super::*;

        #[test]
        fn should_extract_typed_script_with_line_offset() {
            let source = "<template>\n  <div />\n</template>\n<script lang=\"ts\">\nexport default {};\n</script>\n";
            let script = extract_vue_script(source).unwrap();

            assert_eq!(script.lang, "ts");
            assert_eq!(script.line_offset, 3);
            assert_eq!(script.content, "\nexport default {};\n");
            assert_eq!(script.virtual_id("/root/src/App.vue"), "/root/src/App.vue.ts");
        }

        #[test]
        fn should_synthesize_default_export_for_setup_scripts() {
            let source = "<script setup lang=\"ts\">\nconst count = 1;\n</script>";
            let script = extract_vue_script(source).unwrap();

            assert!(script.content.contains("const count = 1;"));
            assert!(script
                .content
                .ends_with("declare const _default: import('vue').DefineComponent<{}, {}, any>;\nexport default _default;\n"));
        }

        #[test]
        fn should_record_component_line_per_block() {
            let source = "<script setup lang=\"ts\">\nconst b = 2;\n</script>\n<template>\n  <div />\n</template>\n<script lang=\"ts\">\nexport const a = 1;\n</script>\n";
            let script = extract_vue_script(source).unwrap();

            // Plain script first, then setup.
            assert_eq!(script.content.lines().nth(1), Some("export const a = 1;"));
            assert_eq!(
                script.segments,
                vec![
                    ScriptSegment { virtual_line: 0, source_line: 6 },
                    ScriptSegment { virtual_line: 2, source_line: 0 },
                ]
            );
            assert_eq!(script.source_line(1), 7);
            assert_eq!(script.source_line(3), 1);
        }

        #[test]
        fn should_default_to_javascript() {
            let script = extract_vue_script("<script>\nexport default {}\n</script>").unwrap();
            assert_eq!(script.lang, "js");
        }

        #[test]
        fn should_return_none_without_script() {
            assert!(extract_vue_script("<template><div /></template>").is_none());
        }
    }

    mod isolated_program_tests {
        use super::*;

        #[test]
        fn should_emit_declaration_under_out_dir() {
            let program = IsolatedDeclarationProgramFactory
                .create_program(
                    &["/root/src/a.ts".to_string(), "/root/src/nested/b.ts".to_string()],
                    &options("/root/dist"),
                    host(vec![
                        ("/root/src/a.ts", "export const a: number = 1;\n"),
                        (
                            "/root/src/nested/b.ts",
                            "export function add(x: number, y: number): number { return x + y; }\n",
                        ),
                    ]),
                )
                .unwrap();

            let written = emit_all(program.as_ref(), Some("/root/src/nested/b.ts"));
            assert_eq!(written.len(), 1);
            assert_eq!(written[0].0, "/root/dist/nested/b.d.ts");
            assert!(written[0]
                .1
                .contains("export declare function add(x: number, y: number): number;"));
        }

        #[test]
        fn should_emit_every_root_without_target() {
            let program = IsolatedDeclarationProgram::new(
                &["/root/src/a.ts".to_string(), "/root/src/types.d.ts".to_string()],
                &options("/root/dist"),
                host(vec![
                    ("/root/src/a.ts", "export const a: number = 1;\n"),
                    ("/root/src/types.d.ts", "declare const g: string;\n"),
                ])
                .as_ref(),
            );

            let written = emit_all(&program, None);
            let paths: Vec<&str> = written.iter().map(|(p, _)| p.as_str()).collect();
            assert_eq!(paths, vec!["/root/dist/a.d.ts"]);
        }

        #[test]
        fn should_report_missing_roots() {
            let program = IsolatedDeclarationProgram::new(
                &["/root/src/missing.ts".to_string()],
                &options("/root/dist"),
                host(vec![]).as_ref(),
            );
            assert_eq!(program.get_diagnostics().len(), 1);
            assert!(program.get_diagnostics()[0].is_error());
        }

        #[test]
        fn should_expose_component_script_as_virtual_file() {
            let program = IsolatedDeclarationProgram::new(
                &["/root/src/App.vue".to_string(), "/root/src/a.ts".to_string()],
                &options("/root/dist"),
                host(vec![
                    (
                        "/root/src/App.vue",
                        "<script setup lang=\"ts\">\nconst n = 1;\n</script>\n",
                    ),
                    ("/root/src/a.ts", "export const a: number = 1;\n"),
                ])
                .as_ref(),
            );

            assert_eq!(program.component_script("/root/src/App.vue"), Some("/root/src/App.vue.ts"));
            let virtual_file = program.get_source_file("/root/src/App.vue.ts").unwrap();
            assert!(virtual_file.is_virtual);

            let written = emit_all(&program, Some("/root/src/App.vue.ts"));
            assert_eq!(written[0].0, "/root/dist/App.vue.d.ts");
            assert!(written[0].1.contains("export default _default;"));
        }

        #[test]
        fn should_skip_unknown_targets() {
            let program = IsolatedDeclarationProgram::new(
                &[],
                &options("/root/dist"),
                host(vec![]).as_ref(),
            );
            let result = program.emit(Some("/root/src/x.ts"), &mut |_: &str, _: &str| {});
            assert!(result.emit_skipped);
        }
    }
}
