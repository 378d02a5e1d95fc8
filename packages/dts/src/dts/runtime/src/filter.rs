use glob::{MatchOptions, Pattern};

use crate::dts::diagnostics::{DtsError, DtsResult};
use crate::dts::file_system::{basename, ensure_absolute, join, normalize_id};

const GLOB_CHARS: &[char] = &['*', '?', '['];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Include/exclude test over absolute module ids.
#[derive(Debug, Clone)]
pub struct GlobFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl GlobFilter {
    /// Patterns are anchored at `base`. A pattern naming a directory (no
    /// glob characters, no extension) matches everything below it.
    pub fn new(base: &str, include: &[String], exclude: &[String]) -> DtsResult<Self> {
        Ok(Self {
            include: compile_all(base, include)?,
            exclude: compile_all(base, exclude)?,
        })
    }

    pub fn with_defaults(base: &str) -> DtsResult<Self> {
        Self::new(base, &["**/*".to_string()], &["node_modules/**".to_string()])
    }

    pub fn matches(&self, id: &str) -> bool {
        let id = normalize_id(id);
        let hit = |patterns: &[Pattern]| patterns.iter().any(|p| p.matches_with(&id, MATCH_OPTIONS));
        hit(&self.include) && !hit(&self.exclude)
    }
}

fn compile_all(base: &str, patterns: &[String]) -> DtsResult<Vec<Pattern>> {
    patterns
        .iter()
        .map(|pattern| {
            let absolute = expand_directory(&ensure_absolute(pattern, base));
            Pattern::new(&absolute).map_err(|e| DtsError::config(pattern.as_str(), e.to_string()))
        })
        .collect()
}

fn expand_directory(pattern: &str) -> String {
    let last = basename(pattern);
    if pattern.contains(GLOB_CHARS) || last.contains('.') {
        pattern.to_string()
    } else {
        join(pattern, &["**/*"])
    }
}
