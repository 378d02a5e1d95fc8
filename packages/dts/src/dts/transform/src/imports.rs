// Import Statements
//
// Locating module specifiers and parsing import clauses in masked text.

use once_cell::sync::Lazy;
use regex::Regex;

static SPECIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:\bfrom\s*|\bimport\s*(?:\(\s*)?)["']([^"'\n]*)["']"#).unwrap()
});
static IMPORT_STATEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s+(type\s+)?([\w$*{}\s,]+?)\s*\bfrom\s*["']([^"'\n]*)["'][ \t]*;?"#)
        .unwrap()
});
static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][\w$]*$").unwrap());

/// Byte spans of every module specifier's text (between the quotes) found
/// in `from '…'`, `import '…'` and `import('…')` positions.
pub fn specifier_spans(masked: &str) -> Vec<(usize, usize)> {
    SPECIFIER
        .captures_iter(masked)
        .filter_map(|cap| cap.get(1).map(|m| (m.start(), m.end())))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// `default`, `*` or the exported name.
    pub imported: String,
    pub local: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub module: String,
    pub type_only: bool,
    pub bindings: Vec<ImportBinding>,
    /// Span covering the whole line(s) the statement occupies.
    pub start: usize,
    pub end: usize,
}

impl ImportStatement {
    pub fn binds(&self, local: &str) -> bool {
        self.bindings.iter().any(|b| b.local == local)
    }

    pub fn local_for(&self, imported: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.imported == imported)
            .map(|b| b.local.as_str())
    }
}

fn parse_clause(clause: &str) -> Vec<ImportBinding> {
    let mut bindings = Vec::new();
    let (outside, named) = match (clause.find('{'), clause.rfind('}')) {
        (Some(open), Some(close)) if open < close => (
            format!("{} {}", &clause[..open], &clause[close + 1..]),
            Some(&clause[open + 1..close]),
        ),
        _ => (clause.to_string(), None),
    };

    for part in outside.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some(ns) = part.strip_prefix('*') {
            let local = ns.trim().trim_start_matches("as").trim();
            if IDENT.is_match(local) {
                bindings.push(ImportBinding {
                    imported: "*".to_string(),
                    local: local.to_string(),
                });
            }
        } else if IDENT.is_match(part) {
            bindings.push(ImportBinding {
                imported: "default".to_string(),
                local: part.to_string(),
            });
        }
    }

    for element in named.into_iter().flat_map(|n| n.split(',')) {
        let words: Vec<&str> = element.split_whitespace().collect();
        let words = match words.as_slice() {
            ["type", rest @ ..] if !rest.is_empty() => rest,
            other => other,
        };
        match words {
            [name] => bindings.push(ImportBinding {
                imported: name.to_string(),
                local: name.to_string(),
            }),
            [name, "as", local] => bindings.push(ImportBinding {
                imported: name.to_string(),
                local: local.to_string(),
            }),
            _ => {}
        }
    }
    bindings
}

/// Extend `[start, end)` to whole lines when the statement sits alone on them.
pub fn line_span(code: &str, start: usize, end: usize) -> (usize, usize) {
    let line_start = code[..start].rfind('\n').map_or(0, |i| i + 1);
    let start = if code[line_start..start].trim().is_empty() {
        line_start
    } else {
        start
    };
    let rest = &code[end..];
    let trailing = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    let mut end = end + trailing;
    if code[end..].starts_with("\r\n") {
        end += 2;
    } else if code[end..].starts_with('\n') {
        end += 1;
    }
    (start, end)
}

/// Parse every `import … from '…'` statement.
pub fn parse_import_statements(code: &str, masked: &str) -> Vec<ImportStatement> {
    IMPORT_STATEMENT
        .captures_iter(masked)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let clause = cap.get(2)?.as_str();
            let spec = cap.get(3)?;
            let (start, end) = line_span(code, whole.start(), whole.end());
            Some(ImportStatement {
                module: code[spec.start()..spec.end()].to_string(),
                type_only: cap.get(1).is_some(),
                bindings: parse_clause(clause),
                start,
                end,
            })
        })
        .collect()
}
