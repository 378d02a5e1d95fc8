use once_cell::sync::Lazy;
use regex::Regex;

use super::imports::line_span;
use super::scanner::{apply_edits, mask_code};

static PURE_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bimport\s*["'][^"'\n]*["'][ \t]*;?"#).unwrap());

/// Remove side-effect-only imports (`import './style.css';`) with their line
/// break. Returns the new text and the number of removed lines.
pub fn strip_pure_imports(code: &str) -> (String, usize) {
    let masked = mask_code(code);
    let edits: Vec<(usize, usize, String)> = PURE_IMPORT
        .find_iter(&masked)
        .map(|m| {
            let (start, end) = line_span(code, m.start(), m.end());
            (start, end, String::new())
        })
        .collect();
    let removed = edits
        .iter()
        .map(|(start, end, _)| code[*start..*end].matches('\n').count())
        .sum();
    (apply_edits(code, edits), removed)
}
