use std::sync::Arc;

/// The kind of script a source file holds, derived from its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptKind {
    Ts,
    Tsx,
    Js,
    Jsx,
    Json,
    /// A hand-written or previously emitted declaration file.
    Declaration,
    /// A template/markup file whose script is extracted into a virtual file.
    Component,
    Unknown,
}

impl ScriptKind {
    pub fn from_path(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        if is_declaration_path(&lower) {
            ScriptKind::Declaration
        } else if lower.ends_with(".tsx") {
            ScriptKind::Tsx
        } else if lower.ends_with(".ts") || lower.ends_with(".mts") || lower.ends_with(".cts") {
            ScriptKind::Ts
        } else if lower.ends_with(".jsx") {
            ScriptKind::Jsx
        } else if lower.ends_with(".js") || lower.ends_with(".mjs") || lower.ends_with(".cjs") {
            ScriptKind::Js
        } else if lower.ends_with(".json") {
            ScriptKind::Json
        } else if lower.ends_with(".vue") {
            ScriptKind::Component
        } else {
            ScriptKind::Unknown
        }
    }

    /// Whether a program can type-check this kind directly.
    pub fn is_script(&self) -> bool {
        matches!(
            self,
            ScriptKind::Ts | ScriptKind::Tsx | ScriptKind::Js | ScriptKind::Jsx
        )
    }
}

/// `.d.ts`, `.d.mts`, `.d.cts` and arbitrary-extension declarations like `.d.vue.ts`.
pub fn is_declaration_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    let file_name = lower.rsplit('/').next().unwrap_or(&lower);
    file_name.ends_with(".d.ts")
        || file_name.ends_with(".d.mts")
        || file_name.ends_with(".d.cts")
        || (file_name.contains(".d.") && file_name.ends_with(".ts"))
}

/// A file known to a program: its (normalized, absolute) name and full text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub file_name: String,
    pub text: Arc<str>,
    pub kind: ScriptKind,
    /// Set for files synthesized by the program, e.g. the script of a `.vue` file.
    pub is_virtual: bool,
}

impl SourceFile {
    pub fn new(file_name: impl Into<String>, text: impl Into<Arc<str>>) -> Self {
        let file_name = file_name.into();
        let kind = ScriptKind::from_path(&file_name);
        Self {
            file_name,
            text: text.into(),
            kind,
            is_virtual: false,
        }
    }

    pub fn virtual_file(file_name: impl Into<String>, text: impl Into<Arc<str>>) -> Self {
        Self {
            is_virtual: true,
            ..Self::new(file_name, text)
        }
    }

    pub fn is_declaration_file(&self) -> bool {
        self.kind == ScriptKind::Declaration
    }

    pub fn full_text(&self) -> &str {
        &self.text
    }
}
