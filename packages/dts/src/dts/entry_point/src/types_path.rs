use serde_json::Value;

use crate::dts::file_system::{
    ensure_absolute, is_dts_path, join, ts_to_dts, AbsoluteFsPath, ReadonlyFileSystem,
};
use crate::dts::logging::Logger;

/// The package's declared types entry.
///
/// Looks at `explicit`, then `package.json` (`publishConfig.types`, `types`,
/// `typings`), then falls back to `<out_dir>/index.d.ts`. A path that is not
/// a declaration file is corrected with a warning.
pub fn resolve_types_path<F: ReadonlyFileSystem + ?Sized>(
    fs: &F,
    root: &str,
    out_dir: &str,
    explicit: Option<&str>,
    logger: &dyn Logger,
) -> String {
    let declared = explicit
        .map(str::to_string)
        .or_else(|| manifest_types(fs, root))
        .map(|path| ensure_absolute(&path, root));

    match declared {
        Some(path) if is_dts_path(&path) => path,
        Some(path) => {
            let corrected = ts_to_dts(&path);
            logger.warn(&format!(
                "The types path {} is not a declaration file, using {} instead",
                path, corrected
            ));
            corrected
        }
        None => join(out_dir, &["index.d.ts"]),
    }
}

fn manifest_types<F: ReadonlyFileSystem + ?Sized>(fs: &F, root: &str) -> Option<String> {
    let text = fs
        .read_file(&AbsoluteFsPath::new(join(root, &["package.json"])))
        .ok()?;
    let manifest: Value = serde_json::from_str(&text).ok()?;
    let field = |value: &Value, key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
    manifest
        .get("publishConfig")
        .and_then(|config| field(config, "types"))
        .or_else(|| field(&manifest, "types"))
        .or_else(|| field(&manifest, "typings"))
}
