// Static Import Normalization
//
// `import("m").Member` type references become plain identifiers backed by a
// hoisted `import type { … } from 'm';` header.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::imports::{parse_import_statements, ImportStatement};
use super::scanner::{apply_edits, mask_code};

static DYNAMIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s*\(\s*["']([^"'\n]*)["']\s*\)\s*\.\s*([A-Za-z_$][\w$]*)"#).unwrap()
});
static LOCAL_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:interface|type|class|enum|function|const|let|var|namespace)\s+([A-Za-z_$][\w$]*)")
        .unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticImportResult {
    pub content: String,
    pub inserted_lines: usize,
    pub removed_lines: usize,
}

#[derive(Default)]
struct ModuleImports {
    default_local: Option<String>,
    /// `(imported, local)` in first-seen order.
    named: Vec<(String, String)>,
}

impl ModuleImports {
    fn add_named(&mut self, imported: &str, local: &str) {
        if !self.named.iter().any(|(i, l)| i == imported && l == local) {
            self.named.push((imported.to_string(), local.to_string()));
        }
    }

    fn render(&self, module: &str) -> String {
        let named: Vec<String> = self
            .named
            .iter()
            .map(|(imported, local)| {
                if imported == local {
                    imported.clone()
                } else {
                    format!("{} as {}", imported, local)
                }
            })
            .collect();
        match (&self.default_local, named.is_empty()) {
            (Some(local), true) => format!("import type {} from '{}';", local, module),
            (Some(local), false) => format!(
                "import type {{ default as {}, {} }} from '{}';",
                local,
                named.join(", "),
                module
            ),
            (None, _) => format!("import type {{ {} }} from '{}';", named.join(", "), module),
        }
    }
}

struct Planner<'a> {
    statements: &'a [ImportStatement],
    declared: HashSet<String>,
    /// Local name -> module it is bound to, for existing and planned imports.
    bound: HashMap<String, String>,
    modules: IndexMap<String, ModuleImports>,
    placeholder: usize,
    default_placeholder: usize,
}

impl<'a> Planner<'a> {
    fn local_for(&mut self, module: &str, member: &str) -> String {
        if let Some(local) = self
            .statements
            .iter()
            .filter(|s| s.module == module)
            .find_map(|s| s.local_for(member))
        {
            return local.to_string();
        }

        let entry = self.modules.entry(module.to_string()).or_default();
        if member == "default" {
            if let Some(local) = &entry.default_local {
                return local.clone();
            }
            self.default_placeholder += 1;
            let local = format!("__DTS_DEFAULT_{}__", self.default_placeholder);
            entry.default_local = Some(local.clone());
            self.bound.insert(local.clone(), module.to_string());
            return local;
        }
        if let Some((_, local)) = entry.named.iter().find(|(imported, _)| imported == member) {
            return local.clone();
        }

        let taken = self.declared.contains(member)
            || self.bound.get(member).map_or(false, |m| m != module);
        let local = if taken {
            self.placeholder += 1;
            format!("__DTS_{}__", self.placeholder)
        } else {
            member.to_string()
        };
        entry.add_named(member, &local);
        self.bound.insert(local.clone(), module.to_string());
        local
    }
}

/// End of the leading `/// <reference … />` block.
fn header_position(code: &str) -> usize {
    let mut pos = 0;
    for line in code.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.starts_with("/// <reference") || (trimmed.is_empty() && pos > 0) {
            pos += line.len();
        } else {
            break;
        }
    }
    pos
}

pub fn normalize_dynamic_imports(code: &str) -> StaticImportResult {
    let masked = mask_code(code);
    let statements = parse_import_statements(code, &masked);
    let declared = LOCAL_DECLARATION
        .captures_iter(&masked)
        .map(|cap| cap[1].to_string())
        .collect();
    let bound = statements
        .iter()
        .flat_map(|s| s.bindings.iter().map(move |b| (b.local.clone(), s.module.clone())))
        .collect();
    let mut planner = Planner {
        statements: &statements,
        declared,
        bound,
        modules: IndexMap::new(),
        placeholder: 0,
        default_placeholder: 0,
    };

    let mut edits = Vec::new();
    for cap in DYNAMIC_IMPORT.captures_iter(&masked) {
        let (Some(whole), Some(spec), Some(member)) = (cap.get(0), cap.get(1), cap.get(2)) else {
            continue;
        };
        let module = &code[spec.start()..spec.end()];
        let local = planner.local_for(module, member.as_str());
        edits.push((whole.start(), whole.end(), local));
    }

    let modules: Vec<(String, ModuleImports)> = planner
        .modules
        .into_iter()
        .filter(|(_, imports)| imports.default_local.is_some() || !imports.named.is_empty())
        .collect();
    if modules.is_empty() {
        return StaticImportResult {
            content: apply_edits(code, edits),
            inserted_lines: 0,
            removed_lines: 0,
        };
    }

    let mut removed_lines = 0;
    let mut header = String::new();
    for (module, mut imports) in modules {
        // Fold existing `import type { … } from 'module'` statements in.
        let mut merged = ModuleImports::default();
        for statement in statements
            .iter()
            .filter(|s| s.type_only && s.module == module && !s.bindings.iter().any(|b| b.imported == "*"))
        {
            for binding in &statement.bindings {
                if binding.imported == "default" {
                    if merged.default_local.is_none() {
                        merged.default_local = Some(binding.local.clone());
                    } else {
                        continue;
                    }
                } else {
                    merged.add_named(&binding.imported, &binding.local);
                }
            }
            removed_lines += code[statement.start..statement.end].matches('\n').count();
            edits.push((statement.start, statement.end, String::new()));
        }
        if merged.default_local.is_some() && imports.default_local.is_some() {
            // Keep both bindings; the planned one becomes a named `default as`.
            if let Some(local) = imports.default_local.take() {
                imports.named.insert(0, ("default".to_string(), local));
            }
        }
        merged.default_local = merged.default_local.or(imports.default_local);
        for (imported, local) in &imports.named {
            merged.add_named(imported, local);
        }
        header.push_str(&merged.render(&module));
        header.push('\n');
    }

    let inserted_lines = header.matches('\n').count();
    let position = header_position(code);
    edits.push((position, position, header));

    StaticImportResult {
        content: apply_edits(code, edits),
        inserted_lines,
        removed_lines,
    }
}
