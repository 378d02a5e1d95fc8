// Content Transformer
//
// The single entry point the orchestrator uses to rewrite a declaration
// before it is written.

use once_cell::sync::Lazy;
use regex::Regex;

use super::alias::{rewrite_aliases, Alias, AliasFind};
use super::ambient::collect_declare_modules;
use super::imports::specifier_spans;
use super::pure_import::strip_pure_imports;
use super::scanner::{apply_edits, mask_code};
use super::static_import::normalize_dynamic_imports;

static VUE_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.vue$").unwrap());

#[derive(Debug, Clone, Default)]
pub struct TransformOptions<'a> {
    /// Source-space path of the declaration being transformed.
    pub file_path: &'a str,
    pub aliases: &'a [Alias],
    pub aliases_exclude: &'a [AliasFind],
    pub static_import: bool,
    pub clear_pure_import: bool,
    pub clean_vue_file_name: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformResult {
    pub content: String,
    /// Lines added above the original content, net of removed lines.
    pub diff_line_count: usize,
    pub declare_modules: Vec<String>,
}

/// Drop a trailing `.vue` from every module specifier.
pub fn strip_vue_specifiers(code: &str) -> String {
    let masked = mask_code(code);
    let edits = specifier_spans(&masked)
        .into_iter()
        .filter(|(start, end)| VUE_SUFFIX.is_match(&code[*start..*end]))
        .map(|(start, end)| (start, end, VUE_SUFFIX.replace(&code[start..end], "").to_string()))
        .collect();
    apply_edits(code, edits)
}

pub fn transform_code(code: &str, options: &TransformOptions<'_>) -> TransformResult {
    let mut content = rewrite_aliases(code, options.file_path, options.aliases, options.aliases_exclude);
    let mut inserted = 0usize;
    let mut removed = 0usize;

    if options.clean_vue_file_name {
        content = strip_vue_specifiers(&content);
    }

    if options.clear_pure_import {
        let (stripped, lines) = strip_pure_imports(&content);
        content = stripped;
        removed += lines;
    }

    if options.static_import {
        let result = normalize_dynamic_imports(&content);
        content = result.content;
        inserted += result.inserted_lines;
        removed += result.removed_lines;
    }

    let declare_modules = collect_declare_modules(&content);

    TransformResult {
        content,
        diff_line_count: inserted.saturating_sub(removed),
        declare_modules,
    }
}
