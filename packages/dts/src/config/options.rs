use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dts::diagnostics::DtsError;
use crate::dts::transform::{Alias, AliasFind};

/// One value or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasOption {
    pub find: String,
    pub replacement: String,
    /// Treat `find` as a regular expression.
    #[serde(default)]
    pub regex: bool,
}

/// `{ "@": "/src" }` or `[{ "find": "@", "replacement": "/src" }]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AliasesOption {
    Map(IndexMap<String, String>),
    List(Vec<AliasOption>),
}

impl Default for AliasesOption {
    fn default() -> Self {
        AliasesOption::List(Vec::new())
    }
}

impl AliasesOption {
    pub fn to_aliases(&self) -> Result<Vec<Alias>, DtsError> {
        match self {
            AliasesOption::Map(map) => Ok(map
                .iter()
                .map(|(find, replacement)| Alias::prefix(find.clone(), replacement.clone()))
                .collect()),
            AliasesOption::List(list) => list
                .iter()
                .map(|option| {
                    if option.regex {
                        Ok(Alias::pattern(compile(&option.find)?, option.replacement.clone()))
                    } else {
                        Ok(Alias::prefix(option.find.clone(), option.replacement.clone()))
                    }
                })
                .collect(),
        }
    }
}

/// A literal specifier, or `{ "regex": "…" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AliasExcludeOption {
    Literal(String),
    Pattern { regex: String },
}

impl AliasExcludeOption {
    pub fn to_find(&self) -> Result<AliasFind, DtsError> {
        match self {
            AliasExcludeOption::Literal(literal) => Ok(AliasFind::Prefix(literal.clone())),
            AliasExcludeOption::Pattern { regex } => Ok(AliasFind::Pattern(compile(regex)?)),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, DtsError> {
    Regex::new(pattern).map_err(|e| DtsError::config("aliases", e.to_string()))
}

/// Behavior toggles for an emission pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmitOptions {
    /// Refuse writes outside the output directory.
    pub strict_output: bool,
    /// Copy hand-written `.d.ts` sources to the output.
    pub copy_dts_files: bool,
    /// `X.vue.d.ts` -> `X.d.ts`, and `.vue` dropped from specifiers.
    pub clean_vue_file_name: bool,
    /// Hoist `import("m").T` references into `import type` statements.
    pub static_import: bool,
    /// Drop side-effect-only imports.
    pub clear_pure_import: bool,
    pub insert_types_entry: bool,
    pub rollup_types: bool,
    /// Extra configuration merged into the bundler's generated config.
    pub bundle_config: serde_json::Value,
    pub types_path: Option<String>,
    /// Fail the pass when the program reports errors.
    pub diagnostics_fatal: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            strict_output: true,
            copy_dts_files: false,
            clean_vue_file_name: false,
            static_import: false,
            clear_pure_import: true,
            insert_types_entry: false,
            rollup_types: false,
            bundle_config: serde_json::Value::Null,
            types_path: None,
            diagnostics_fatal: false,
        }
    }
}

impl EmitOptions {
    pub fn static_import(&self) -> bool {
        self.static_import || self.rollup_types
    }

    pub fn synthesizes_entries(&self) -> bool {
        self.insert_types_entry || self.rollup_types
    }
}

/// Engine options, as a host would pass them (camelCase JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginOptions {
    /// Project root; defaults to the current directory.
    pub root: Option<String>,
    /// Output directories; the first is primary. Defaults to `<root>/dist`.
    pub out_dir: Option<OneOrMany>,
    /// Root of the output tree; defaults to the public root.
    pub entry_root: Option<String>,
    pub tsconfig_path: Option<String>,
    /// Overrides merged over the tsconfig `compilerOptions`.
    pub compiler_options: serde_json::Map<String, serde_json::Value>,
    pub include: Option<OneOrMany>,
    pub exclude: Option<OneOrMany>,
    pub aliases: AliasesOption,
    pub aliases_exclude: Vec<AliasExcludeOption>,
    /// Derive aliases from `compilerOptions.paths`.
    pub path_alias: bool,
    /// Entry name -> source path.
    pub entries: IndexMap<String, String>,
    #[serde(flatten)]
    pub emit: EmitOptions,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            root: None,
            out_dir: None,
            entry_root: None,
            tsconfig_path: None,
            compiler_options: serde_json::Map::new(),
            include: None,
            exclude: None,
            aliases: AliasesOption::default(),
            aliases_exclude: Vec::new(),
            path_alias: true,
            entries: IndexMap::new(),
            emit: EmitOptions::default(),
        }
    }
}

impl PluginOptions {
    pub fn from_json(value: serde_json::Value) -> Result<Self, DtsError> {
        serde_json::from_value(value).map_err(|e| DtsError::config("options", e.to_string()))
    }
}
