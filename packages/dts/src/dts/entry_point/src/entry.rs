use indexmap::IndexMap;

use crate::dts::file_system::{
    dirname, join, relative, resolve, strip_dts_extension, to_relative_import, ts_to_dts,
};

/// Where one entry declaration goes and what it re-exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTarget {
    pub name: String,
    /// Final path of the module's emitted declaration.
    pub declaration: String,
    /// Final path of the entry file.
    pub target: String,
}

impl EntryTarget {
    /// Specifier for the declaration as seen from the entry file.
    pub fn import_path(&self) -> String {
        to_relative_import(&relative(
            &dirname(&self.target),
            &strip_dts_extension(&self.declaration),
        ))
    }
}

/// One target per entry. A single entry lands at `types_path`; several
/// land at `<out_dir>/<name>.d.ts`.
pub fn plan_entries(
    entries: &IndexMap<String, String>,
    out_dir: &str,
    entry_root: &str,
    types_path: &str,
) -> Vec<EntryTarget> {
    let single = entries.len() == 1;
    entries
        .iter()
        .map(|(name, source)| EntryTarget {
            name: name.clone(),
            declaration: resolve(out_dir, &relative(entry_root, &ts_to_dts(source))),
            target: if single {
                types_path.to_string()
            } else {
                join(out_dir, &[&format!("{}.d.ts", name)])
            },
        })
        .collect()
}

/// Entry content re-exporting `import_path`.
pub fn synthesize_entry(import_path: &str, has_default: bool) -> String {
    let mut content = format!("export * from '{}';\n", import_path);
    if has_default {
        content.push_str(&format!("export {{ default }} from '{}';\n", import_path));
    }
    content
}
