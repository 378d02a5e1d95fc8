// Alias Rewriting
//
// Rewrites aliased module specifiers to paths relative to the declaration
// that contains them.

use regex::Regex;

use super::imports::specifier_spans;
use super::scanner::{apply_edits, mask_code};
use crate::dts::file_system::{dirname, is_absolute, normalize_separators, relative, to_relative_import};

#[derive(Debug, Clone)]
pub enum AliasFind {
    /// Matches the specifier itself or a `/`-separated path below it.
    Prefix(String),
    Pattern(Regex),
}

impl AliasFind {
    pub fn matches(&self, specifier: &str) -> bool {
        match self {
            AliasFind::Pattern(re) => re.is_match(specifier),
            AliasFind::Prefix(find) => {
                if specifier == find {
                    return true;
                }
                specifier.starts_with(find.as_str())
                    && (find.ends_with('/') || specifier[find.len()..].starts_with('/'))
            }
        }
    }

    /// Exact match for literals, regex match for patterns.
    pub fn excludes(&self, specifier: &str) -> bool {
        match self {
            AliasFind::Pattern(re) => re.is_match(specifier),
            AliasFind::Prefix(literal) => literal == specifier,
        }
    }
}

impl PartialEq for AliasFind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AliasFind::Prefix(a), AliasFind::Prefix(b)) => a == b,
            (AliasFind::Pattern(a), AliasFind::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub find: AliasFind,
    pub replacement: String,
}

impl Alias {
    pub fn prefix(find: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            find: AliasFind::Prefix(find.into()),
            replacement: replacement.into(),
        }
    }

    pub fn pattern(find: Regex, replacement: impl Into<String>) -> Self {
        Self {
            find: AliasFind::Pattern(find),
            replacement: replacement.into(),
        }
    }

    /// Replace the matched portion of `specifier`.
    pub fn apply(&self, specifier: &str) -> String {
        match &self.find {
            AliasFind::Pattern(re) => re.replace(specifier, self.replacement.as_str()).to_string(),
            AliasFind::Prefix(find) => {
                format!("{}{}", self.replacement, &specifier[find.len()..])
            }
        }
    }
}

/// Resolve one specifier against the alias table for a declaration written
/// at `file_path`. `None` when nothing applies.
pub fn resolve_alias(
    specifier: &str,
    file_path: &str,
    aliases: &[Alias],
    exclude: &[AliasFind],
) -> Option<String> {
    let alias = aliases.iter().find(|a| a.find.matches(specifier))?;
    if exclude.iter().any(|e| e.excludes(specifier)) {
        return None;
    }
    let replaced = normalize_separators(&alias.apply(specifier));
    if is_absolute(&replaced) {
        Some(to_relative_import(&relative(&dirname(file_path), &replaced)))
    } else {
        Some(replaced)
    }
}

/// Rewrite every aliased specifier in `code`.
pub fn rewrite_aliases(
    code: &str,
    file_path: &str,
    aliases: &[Alias],
    exclude: &[AliasFind],
) -> String {
    if aliases.is_empty() {
        return code.to_string();
    }
    let masked = mask_code(code);
    let edits = specifier_spans(&masked)
        .into_iter()
        .filter_map(|(start, end)| {
            resolve_alias(&code[start..end], file_path, aliases, exclude)
                .map(|rewritten| (start, end, rewritten))
        })
        .collect();
    apply_edits(code, edits)
}
