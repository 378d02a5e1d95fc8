use crate::config::{EmitHooks, WriteDecision};
use crate::dts::diagnostics::{DtsError, DtsResult};
use crate::dts::file_system::{dirname, ensure_absolute, is_within, AbsoluteFsPath, FileSystem};

/// Write one file below `out_dir`.
///
/// `before_write_file` may skip the file (`Ok(None)`) or rewrite its path
/// and content. With `strict`, a target outside `out_dir` is refused with
/// `PathContainment`. Returns the path and content actually written.
pub fn write_output(
    fs: &dyn FileSystem,
    hooks: &EmitHooks,
    strict: bool,
    out_dir: &str,
    path: &str,
    content: &str,
) -> DtsResult<Option<(String, String)>> {
    let (path, content) = match hooks.before_write_file(path, content) {
        WriteDecision::Skip => return Ok(None),
        WriteDecision::Keep => (path.to_string(), content.to_string()),
        WriteDecision::Rewrite {
            path: new_path,
            content: new_content,
        } => (
            new_path.map_or_else(|| path.to_string(), |p| ensure_absolute(&p, out_dir)),
            new_content.unwrap_or_else(|| content.to_string()),
        ),
    };
    write_contained(fs, strict, out_dir, path, content).map(Some)
}

/// Write a file that already went through `before_write_file`. Only the
/// containment check applies.
pub fn write_contained(
    fs: &dyn FileSystem,
    strict: bool,
    out_dir: &str,
    path: String,
    content: String,
) -> DtsResult<(String, String)> {
    let dir = dirname(&path);
    if strict && !is_within(out_dir, &dir) {
        return Err(DtsError::PathContainment {
            path,
            out_dir: out_dir.to_string(),
        });
    }

    fs.ensure_dir(&AbsoluteFsPath::new(&dir))
        .map_err(|e| DtsError::io(&dir, e))?;
    fs.write_file(&AbsoluteFsPath::new(&path), content.as_bytes())
        .map_err(|e| DtsError::io(&path, e))?;
    Ok((path, content))
}
