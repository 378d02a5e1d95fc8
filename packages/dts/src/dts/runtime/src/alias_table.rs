use indexmap::IndexMap;
use regex::Regex;

use crate::dts::diagnostics::{DtsError, DtsResult};
use crate::dts::file_system::ensure_absolute;
use crate::dts::transform::Alias;

/// Aliases for `compilerOptions.paths`.
///
/// `"@/*": ["src/*"]` becomes `^@/(.+)$` -> `<base>/src/$1`. Only the first
/// replacement of each entry is used.
pub fn aliases_from_paths(paths: &IndexMap<String, Vec<String>>, base: &str) -> DtsResult<Vec<Alias>> {
    let mut aliases = Vec::with_capacity(paths.len());
    for (key, replacements) in paths {
        let Some(first) = replacements.first() else {
            continue;
        };
        let find = format!("^{}$", wildcard_pattern(key));
        let find = Regex::new(&find).map_err(|e| DtsError::config("compilerOptions.paths", e.to_string()))?;
        let replacement = ensure_absolute(&numbered_captures(first), base);
        aliases.push(Alias::pattern(find, replacement));
    }
    Ok(aliases)
}

/// Explicit aliases first; inferred ones only fill in.
pub fn merge_aliases(explicit: Vec<Alias>, inferred: Vec<Alias>) -> Vec<Alias> {
    let mut merged = explicit;
    merged.extend(inferred);
    merged
}

fn wildcard_pattern(key: &str) -> String {
    key.split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("(.+)")
}

fn numbered_captures(replacement: &str) -> String {
    let mut out = String::new();
    for (index, part) in replacement.split('*').enumerate() {
        if index > 0 {
            out.push_str(&format!("${{{}}}", index));
        }
        out.push_str(part);
    }
    out
}
