// Transform Tests

#[cfg(test)]
mod tests {
    use crate::dts::transform::*;
    use regex::Regex;

    mod scanner_tests {
        use super::*;

        #[test]
        fn should_mask_comments_and_string_contents() {
            let code = "const a = 'x/*y*/'; // import('z')\n/* b */ let c;";
            let masked = mask_code(code);

            assert_eq!(masked.len(), code.len());
            let expected = format!(
                "const a = '{}'; {}\n{} let c;",
                " ".repeat(6),
                " ".repeat(14),
                " ".repeat(7)
            );
            assert_eq!(masked, expected);
        }

        #[test]
        fn should_keep_byte_offsets_for_multibyte_text() {
            let code = "type A = 'héllo'; import('m').B";
            let masked = mask_code(code);
            assert_eq!(masked.len(), code.len());
            assert!(masked.ends_with("import(' ').B"));
        }

        #[test]
        fn should_apply_insertions_before_removals_at_same_offset() {
            let out = apply_edits("abc", vec![(0, 1, String::new()), (0, 0, "X".into())]);
            assert_eq!(out, "Xbc");
        }
    }

    mod alias_tests {
        use super::*;

        fn aliases() -> Vec<Alias> {
            vec![
                Alias::prefix("@", "/root/src"),
                Alias::pattern(Regex::new(r"^~/(.+)$").unwrap(), "/root/lib/${1}"),
            ]
        }

        #[test]
        fn should_rewrite_to_relative_paths() {
            let code = "import { X } from '@/components/x';\nexport * from '@';\nexport type { Y } from '~/y';\n";
            let out = rewrite_aliases(code, "/root/src/views/a.d.ts", &aliases(), &[]);
            assert_eq!(
                out,
                "import { X } from '../components/x';\nexport * from '..';\nexport type { Y } from '../../lib/y';\n"
            );
        }

        #[test]
        fn should_respect_path_boundaries() {
            let code = "import { a } from '@vue/shared';\n";
            let out = rewrite_aliases(code, "/root/src/a.d.ts", &aliases(), &[]);
            assert_eq!(out, code);
        }

        #[test]
        fn should_be_idempotent() {
            let code = "import { X } from '@/components/x';\ntype T = import('@/types').T;\n";
            let once = rewrite_aliases(code, "/root/src/a.d.ts", &aliases(), &[]);
            let twice = rewrite_aliases(&once, "/root/src/a.d.ts", &aliases(), &[]);
            assert_eq!(once, twice);
            assert_eq!(once, "import { X } from './components/x';\ntype T = import('./types').T;\n");
        }

        #[test]
        fn should_skip_excluded_specifiers() {
            let code = "import '@/global';\nimport { a } from '@/a';\n";
            let exclude = vec![AliasFind::Prefix("@/global".into())];
            let out = rewrite_aliases(code, "/root/src/a.d.ts", &aliases(), &exclude);
            assert_eq!(out, "import '@/global';\nimport { a } from './a';\n");
        }

        #[test]
        fn should_keep_bare_replacements_verbatim() {
            let aliases = vec![Alias::prefix("lodash", "lodash-es")];
            let out = rewrite_aliases("import { map } from 'lodash';\n", "/root/src/a.d.ts", &aliases, &[]);
            assert_eq!(out, "import { map } from 'lodash-es';\n");
        }

        #[test]
        fn should_ignore_specifiers_in_comments() {
            let code = "// import { X } from '@/x';\nexport {};\n";
            assert_eq!(rewrite_aliases(code, "/root/src/a.d.ts", &aliases(), &[]), code);
        }
    }

    mod pure_import_tests {
        use super::*;

        #[test]
        fn should_strip_side_effect_imports_with_line_break() {
            let (out, removed) =
                strip_pure_imports("import \"./x.css\";\nimport type { A } from \"y\";");
            assert_eq!(out, "import type { A } from \"y\";");
            assert_eq!(removed, 1);
        }

        #[test]
        fn should_leave_other_imports() {
            let code = "import { a } from './a';\nexport * from './b';\n";
            assert_eq!(strip_pure_imports(code), (code.to_string(), 0));
        }
    }

    mod static_import_tests {
        use super::*;

        #[test]
        fn should_merge_into_one_header() {
            let code = "export declare const a: import(\"vue\").Foo;\nexport declare const b: import(\"vue\").Bar;\n";
            let result = normalize_dynamic_imports(code);

            assert_eq!(
                result.content,
                "import type { Foo, Bar } from 'vue';\nexport declare const a: Foo;\nexport declare const b: Bar;\n"
            );
            assert_eq!(result.content.matches("from 'vue'").count(), 1);
            assert_eq!(result.inserted_lines, 1);
        }

        #[test]
        fn should_fold_existing_type_imports() {
            let code = "import type { Ref } from 'vue';\nexport declare const a: import('vue').Foo<Ref>;\n";
            let result = normalize_dynamic_imports(code);

            assert_eq!(
                result.content,
                "import type { Ref, Foo } from 'vue';\nexport declare const a: Foo<Ref>;\n"
            );
            assert_eq!(result.removed_lines, 1);
        }

        #[test]
        fn should_reuse_existing_value_bindings() {
            let code = "import { ref, Ref } from 'vue';\nexport declare const a: import('vue').Ref<number>;\n";
            let result = normalize_dynamic_imports(code);
            assert_eq!(
                result.content,
                "import { ref, Ref } from 'vue';\nexport declare const a: Ref<number>;\n"
            );
            assert_eq!(result.inserted_lines, 0);
        }

        #[test]
        fn should_alias_colliding_names() {
            let code = "import { Foo } from './foo';\nexport declare const a: import('vue').Foo;\n";
            let result = normalize_dynamic_imports(code);
            assert_eq!(
                result.content,
                "import type { Foo as __DTS_1__ } from 'vue';\nimport { Foo } from './foo';\nexport declare const a: __DTS_1__;\n"
            );
        }

        #[test]
        fn should_alias_names_declared_locally() {
            let code = "interface Props {}\nexport declare const a: import('./props').Props;\n";
            let result = normalize_dynamic_imports(code);
            assert!(result
                .content
                .starts_with("import type { Props as __DTS_1__ } from './props';\n"));
            assert!(result.content.ends_with("export declare const a: __DTS_1__;\n"));
        }

        #[test]
        fn should_bind_default_members() {
            let code = "export declare const c: import('./comp').default;\n";
            let result = normalize_dynamic_imports(code);
            assert_eq!(
                result.content,
                "import type __DTS_DEFAULT_1__ from './comp';\nexport declare const c: __DTS_DEFAULT_1__;\n"
            );
        }

        #[test]
        fn should_combine_default_and_named_members() {
            let code = "declare const c: import('./comp').default;\ndeclare const p: import('./comp').Props;\n";
            let result = normalize_dynamic_imports(code);
            assert!(result
                .content
                .starts_with("import type { default as __DTS_DEFAULT_1__, Props } from './comp';\n"));
        }

        #[test]
        fn should_insert_after_reference_directives() {
            let code = "/// <reference types=\"vite/client\" />\nexport declare const a: import(\"vue\").Foo;\n";
            let result = normalize_dynamic_imports(code);
            assert_eq!(
                result.content,
                "/// <reference types=\"vite/client\" />\nimport type { Foo } from 'vue';\nexport declare const a: Foo;\n"
            );
        }

        #[test]
        fn should_ignore_imports_inside_comments_and_strings() {
            let code = "// import(\"vue\").Foo\nexport declare const s: \"import('vue').Foo\";\n";
            assert_eq!(normalize_dynamic_imports(code).content, code);
        }
    }

    mod ambient_tests {
        use super::*;

        #[test]
        fn should_collect_top_level_declare_modules() {
            let code = "declare module 'virtual:x' {\n    export const a: { b: number };\n}\nexport declare function f(): void;\ndeclare module \"y\" {}\n";
            let modules = collect_declare_modules(code);
            assert_eq!(
                modules,
                vec![
                    "declare module 'virtual:x' {\n    export const a: { b: number };\n}".to_string(),
                    "declare module \"y\" {}".to_string(),
                ]
            );
        }

        #[test]
        fn should_skip_nested_declarations() {
            let code = "declare namespace N {\n    declare module 'x' {}\n}\n";
            assert!(collect_declare_modules(code).is_empty());
        }
    }

    mod transformer_tests {
        use super::*;

        #[test]
        fn should_run_full_pipeline() {
            let code = "import './style.css';\nimport Comp from '@/Comp.vue';\nexport declare const a: import('vue').Foo;\n";
            let aliases = vec![Alias::prefix("@", "/root/src")];
            let result = transform_code(
                code,
                &TransformOptions {
                    file_path: "/root/src/index.d.ts",
                    aliases: &aliases,
                    static_import: true,
                    clear_pure_import: true,
                    clean_vue_file_name: true,
                    ..Default::default()
                },
            );

            assert_eq!(
                result.content,
                "import type { Foo } from 'vue';\nimport Comp from './Comp';\nexport declare const a: Foo;\n"
            );
            assert_eq!(result.diff_line_count, 0);
        }

        #[test]
        fn should_count_inserted_header_lines() {
            let code = "export declare const a: import('a').A;\nexport declare const b: import('b').B;\n";
            let result = transform_code(
                code,
                &TransformOptions {
                    file_path: "/root/src/index.d.ts",
                    static_import: true,
                    ..Default::default()
                },
            );
            assert_eq!(result.diff_line_count, 2);
        }

        #[test]
        fn should_report_declare_modules() {
            let result = transform_code(
                "declare module '*.svg' {\n  const src: string;\n}\n",
                &TransformOptions::default(),
            );
            assert_eq!(result.declare_modules.len(), 1);
        }
    }
}
