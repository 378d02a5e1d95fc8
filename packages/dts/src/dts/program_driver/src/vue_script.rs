// Vue Script Extraction
//
// Pulls the type-bearing script out of a single-file component.

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<script\b([^>]*)>(.*?)</script\s*>").unwrap());
static LANG_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\blang\s*=\s*["']?([A-Za-z]+)["']?"#).unwrap());
static SETUP_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\s)setup\b").unwrap());
static EXPORT_DEFAULT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*export\s+default\b").unwrap());

/// Suffixes a component's virtual script may carry, in lookup order.
pub const VUE_VIRTUAL_SUFFIXES: [&str; 4] = [".ts", ".tsx", ".js", ".jsx"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VueScript {
    /// Script text handed to the program.
    pub content: String,
    /// `ts`, `tsx`, `js` or `jsx`.
    pub lang: String,
    /// Lines of markup preceding the first script block's content.
    pub line_offset: usize,
    /// One entry per script block, in the order they appear in `content`.
    pub segments: Vec<ScriptSegment>,
}

/// Where a script block sits in the virtual script and in the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptSegment {
    pub virtual_line: usize,
    pub source_line: usize,
}

impl VueScript {
    /// `App.vue` -> `App.vue.ts` (or `.tsx`, `.js`, `.jsx`).
    pub fn virtual_id(&self, vue_path: &str) -> String {
        format!("{}.{}", vue_path, self.lang)
    }

    /// Component line of a zero-based virtual script line. Synthesized lines
    /// past the last block follow that block.
    pub fn source_line(&self, virtual_line: usize) -> usize {
        self.segments
            .iter()
            .rev()
            .find(|s| s.virtual_line <= virtual_line)
            .map_or(virtual_line + self.line_offset, |s| {
                virtual_line - s.virtual_line + s.source_line
            })
    }
}

struct Block<'a> {
    setup: bool,
    lang: Option<String>,
    content: &'a str,
    start: usize,
}

fn normalize_lang(lang: &str) -> &'static str {
    match lang.to_ascii_lowercase().as_str() {
        "ts" | "typescript" => "ts",
        "tsx" => "tsx",
        "jsx" => "jsx",
        _ => "js",
    }
}

/// Extract the script of a component. A plain `<script>` block and a
/// `<script setup>` block are concatenated; when neither carries an
/// `export default`, a component default export is synthesized.
pub fn extract_vue_script(source: &str) -> Option<VueScript> {
    let blocks: Vec<Block<'_>> = SCRIPT_BLOCK
        .captures_iter(source)
        .filter_map(|cap| {
            let attrs = cap.get(1)?.as_str();
            let body = cap.get(2)?;
            Some(Block {
                setup: SETUP_ATTR.is_match(attrs),
                lang: LANG_ATTR.captures(attrs).map(|l| l[1].to_string()),
                content: body.as_str(),
                start: body.start(),
            })
        })
        .collect();

    let first = blocks.iter().min_by_key(|b| b.start)?;
    let line_offset = source[..first.start].matches('\n').count();
    let lang = normalize_lang(
        blocks
            .iter()
            .find_map(|b| b.lang.as_deref())
            .unwrap_or("js"),
    );

    let mut content = String::new();
    let mut segments = Vec::with_capacity(blocks.len());
    let mut has_default = false;
    // Plain script first: setup code may reference what it declares.
    for block in blocks.iter().filter(|b| !b.setup).chain(blocks.iter().filter(|b| b.setup)) {
        if !block.setup && EXPORT_DEFAULT.is_match(block.content) {
            has_default = true;
        }
        segments.push(ScriptSegment {
            virtual_line: content.matches('\n').count(),
            source_line: source[..block.start].matches('\n').count(),
        });
        content.push_str(block.content);
        if !content.ends_with('\n') {
            content.push('\n');
        }
    }
    if !has_default {
        let typed = lang.starts_with('t');
        content.push_str(if typed {
            "declare const _default: import('vue').DefineComponent<{}, {}, any>;\nexport default _default;\n"
        } else {
            "export default {};\n"
        });
    }

    Some(VueScript {
        content,
        lang: lang.to_string(),
        line_offset,
        segments,
    })
}
