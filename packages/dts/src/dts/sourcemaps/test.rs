// Sourcemaps Tests
//
// Tests for the sourcemaps module.

#[cfg(test)]
mod tests {
    use crate::dts::sourcemaps::*;

    mod vlq_encoding_tests {
        use super::*;

        #[test]
        fn should_encode_zero() {
            assert_eq!(encode_vlq(0), "A");
        }

        #[test]
        fn should_encode_signed_numbers() {
            assert_eq!(encode_vlq(1), "C");
            assert_eq!(encode_vlq(-1), "D");
            assert_eq!(encode_vlq(16), "gB");
        }

        #[test]
        fn should_decode_segments() {
            assert_eq!(decode_vlq_segment("AAAA"), Some(vec![0, 0, 0, 0]));
            assert_eq!(decode_vlq_segment("gBCD"), Some(vec![16, 1, -1]));
            assert_eq!(decode_vlq_segment("g"), None);
            assert_eq!(decode_vlq_segment("A!"), None);
        }
    }

    mod raw_source_map_tests {
        use super::*;

        #[test]
        fn should_parse_declaration_map() {
            let map = RawSourceMap::parse(
                r#"{"version":3,"file":"a.d.ts","sourceRoot":"","sources":["../src/a.ts"],"names":[],"mappings":"AAAA"}"#,
            )
            .unwrap();
            assert_eq!(map.sources, vec!["../src/a.ts"]);
            assert_eq!(map.source_root.as_deref(), Some(""));
        }

        #[test]
        fn should_reject_invalid_json() {
            assert!(RawSourceMap::parse("not a map").is_err());
        }
    }

    mod rebase_tests {
        use super::*;

        #[test]
        fn should_rebase_sources_for_new_directory() {
            let mut map = RawSourceMap::new("a.d.ts");
            map.sources = vec!["../src/a.ts".into()];
            rebase_sources(&mut map, "/root/dist/a.d.ts.map", "/root/types/nested/a.d.ts.map");
            assert_eq!(map.sources, vec!["../../src/a.ts"]);
        }

        #[test]
        fn should_leave_urls_alone() {
            let mut map = RawSourceMap::new("a.d.ts");
            map.sources = vec!["https://example.com/a.ts".into()];
            rebase_sources(&mut map, "/root/dist/a.d.ts.map", "/root/types/a.d.ts.map");
            assert_eq!(map.sources, vec!["https://example.com/a.ts"]);
        }

        #[test]
        fn should_redirect_virtual_source() {
            let mut map = RawSourceMap::new("App.vue.d.ts");
            map.sources = vec!["../src/App.vue.ts".into()];
            redirect_source(
                &mut map,
                "/root/dist/App.vue.d.ts.map",
                "/root/src/App.vue.ts",
                "/root/src/App.vue",
            );
            assert_eq!(map.sources, vec!["../src/App.vue"]);
        }

        #[test]
        fn should_shift_generated_lines() {
            assert_eq!(shift_generated_lines("AAAA;AACA", 2), ";;AAAA;AACA");
            assert_eq!(shift_generated_lines("AAAA", 0), "AAAA");
        }

        #[test]
        fn should_remap_source_lines_uniformly() {
            // Line 0 -> line 3; later segments are relative and keep their deltas.
            assert_eq!(
                remap_source_lines(";AAAA,CAAC;AACA", |l| l + 3).as_deref(),
                Some(";AAGA,CAAC;AACA")
            );
            assert_eq!(remap_source_lines("AAAA", |l| l).as_deref(), Some("AAAA"));
        }

        #[test]
        fn should_remap_source_lines_per_region() {
            // Lines 0-1 stay, lines from 2 on move down by 4.
            assert_eq!(
                remap_source_lines("AACA;AAEA,CAAC", |l| if l < 2 { l } else { l + 4 }).as_deref(),
                Some("AACA;AAMA,CAAC")
            );
            assert!(remap_source_lines("A!", |l| l).is_none());
        }

        #[test]
        fn should_relocate_map() {
            let content = r#"{"version":3,"file":"a.d.ts","sources":["../src/a.ts"],"names":[],"mappings":"AAAA"}"#;
            let relocated =
                relocate_map(content, "/root/dist/a.d.ts.map", "/root/dist/lib/a.d.ts.map", 1)
                    .unwrap();
            let map = RawSourceMap::parse(&relocated).unwrap();
            assert_eq!(map.sources, vec!["../../src/a.ts"]);
            assert_eq!(map.mappings, ";AAAA");
            assert_eq!(map.file.as_deref(), Some("a.d.ts"));
        }

        #[test]
        fn should_report_unparsable_map() {
            let err = relocate_map("{", "/root/dist/a.d.ts.map", "/root/dist/a.d.ts.map", 0)
                .unwrap_err();
            assert!(err.is_recoverable());
        }

        #[test]
        fn should_compute_declaration_stem() {
            assert_eq!(map_declaration_stem("/root/dist/a.d.ts.map"), "/root/dist/a");
        }
    }
}
