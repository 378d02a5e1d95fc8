// Ambient Modules
//
// Top-level `declare module '…' { … }` blocks.

use once_cell::sync::Lazy;
use regex::Regex;

use super::scanner::mask_code;

static DECLARE_MODULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bdeclare\s+module\s*["'][^"'\n]*["']\s*\{"#).unwrap());

/// Byte spans of top-level ambient module blocks, closing brace included.
pub fn declare_module_spans(masked: &str) -> Vec<(usize, usize)> {
    let bytes = masked.as_bytes();
    let mut candidates = DECLARE_MODULE.find_iter(masked).peekable();
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        while candidates.peek().map_or(false, |m| m.start() < i) {
            candidates.next();
        }
        if depth == 0 {
            if let Some(m) = candidates.peek().filter(|m| m.start() == i) {
                let open = m.end() - 1;
                if let Some(close) = matching_brace(bytes, open) {
                    spans.push((i, close + 1));
                    i = close + 1;
                    continue;
                }
            }
        }
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
    spans
}

fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut level = 0usize;
    for (idx, b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'{' => level += 1,
            b'}' => {
                level -= 1;
                if level == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// The text of every top-level ambient module declaration.
pub fn collect_declare_modules(code: &str) -> Vec<String> {
    let masked = mask_code(code);
    declare_module_spans(&masked)
        .into_iter()
        .map(|(start, end)| code[start..end].to_string())
        .collect()
}
