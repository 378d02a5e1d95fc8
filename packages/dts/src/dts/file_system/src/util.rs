use once_cell::sync::Lazy;
use regex::Regex;

static TS_JS_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(?:[mc]?tsx?|[mc]?jsx?)$").unwrap());
static DTS_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.d\.[mc]?tsx?$").unwrap());
static FULL_RELATIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\.{1,2}(?:/|$)").unwrap());

/// Convert Windows-style separators to POSIX separators.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Normalize separators and drop a `?query` suffix, the way module ids arrive from build tools.
pub fn normalize_id(id: &str) -> String {
    let normalized = normalize_separators(id);
    match normalized.split_once('?') {
        Some((path, _)) => path.to_string(),
        None => normalized,
    }
}

fn drive_prefix(path: &str) -> Option<&str> {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        Some(&path[0..2])
    } else {
        None
    }
}

pub fn is_absolute(path: &str) -> bool {
    let normalized = normalize_separators(path);
    normalized.starts_with('/') || drive_prefix(&normalized).is_some()
}

pub fn clean_path(path: &str) -> String {
    let normalized = normalize_separators(path);

    let drive = drive_prefix(&normalized).map(str::to_string);
    let is_unix_absolute = normalized.starts_with('/');
    let path_part = match &drive {
        Some(prefix) => &normalized[prefix.len()..],
        None => &normalized[..],
    };
    let is_absolute = drive.is_some() || is_unix_absolute;

    let mut segments: Vec<&str> = Vec::new();
    for segment in path_part.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                if segments.last().map_or(false, |last| *last != "..") {
                    segments.pop();
                } else if !is_absolute {
                    segments.push("..");
                }
            }
            _ => segments.push(segment),
        }
    }

    let joined = segments.join("/");
    match drive {
        Some(prefix) => format!("{}/{}", prefix, joined),
        None if is_unix_absolute => format!("/{}", joined),
        None => joined,
    }
}

pub fn join(base_path: &str, paths: &[&str]) -> String {
    let mut joined = normalize_separators(base_path);
    for p in paths {
        if !joined.is_empty() && !joined.ends_with('/') {
            joined.push('/');
        }
        joined.push_str(&normalize_separators(p));
    }
    clean_path(&joined)
}

/// `path.resolve(base, path)`: absolute `path` wins, otherwise it is joined onto `base`.
pub fn resolve(base: &str, path: &str) -> String {
    if is_absolute(path) {
        clean_path(path)
    } else {
        join(base, &[path])
    }
}

pub fn ensure_absolute(path: &str, root: &str) -> String {
    resolve(root, path)
}

pub fn dirname(file: &str) -> String {
    let cleaned = clean_path(file);
    match cleaned.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => {
            let parent = &cleaned[..idx];
            if drive_prefix(parent).map_or(false, |d| d.len() == parent.len()) {
                format!("{}/", parent)
            } else {
                parent.to_string()
            }
        }
        None => ".".to_string(),
    }
}

pub fn basename(file: &str) -> String {
    let cleaned = clean_path(file);
    cleaned.rsplit('/').next().unwrap_or_default().to_string()
}

/// Relative path from directory `from` to `to`; both are cleaned first.
pub fn relative(from: &str, to: &str) -> String {
    let from = clean_path(from);
    let to = clean_path(to);
    if drive_prefix(&from).map(|d| d.to_ascii_lowercase())
        != drive_prefix(&to).map(|d| d.to_ascii_lowercase())
    {
        return to;
    }

    let from_segments: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_segments: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();
    let common = from_segments
        .iter()
        .zip(to_segments.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from_segments.len() - common];
    parts.extend_from_slice(&to_segments[common..]);
    parts.join("/")
}

/// Whether `path` is `dir` itself or somewhere below it.
pub fn is_within(dir: &str, path: &str) -> bool {
    let dir = clean_path(dir);
    let path = clean_path(path);
    if path == dir {
        return true;
    }
    let prefix = if dir.ends_with('/') {
        dir
    } else {
        format!("{}/", dir)
    };
    path.starts_with(&prefix)
}

/// Deepest directory containing every file in `paths`.
pub fn common_ancestor_dir<'a>(paths: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut common: Option<Vec<String>> = None;
    for path in paths {
        let dir = dirname(path);
        let segments: Vec<String> = dir.split('/').map(str::to_string).collect();
        common = Some(match common {
            None => segments,
            Some(current) => current
                .into_iter()
                .zip(segments)
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| a)
                .collect(),
        });
    }
    common.map(|segments| {
        let joined = segments.join("/");
        if joined.is_empty() {
            "/".to_string()
        } else {
            clean_path(&joined)
        }
    })
}

pub fn is_local_relative_path(relative_path: &str) -> bool {
    !is_absolute(relative_path) && !relative_path.starts_with("..")
}

/// Prefix `./` unless the path already starts with `./` or `../`.
pub fn to_relative_import(relative_path: &str) -> String {
    if FULL_RELATIVE.is_match(relative_path) {
        relative_path.to_string()
    } else {
        format!("./{}", relative_path)
    }
}

pub fn is_dts_path(path: &str) -> bool {
    DTS_EXTENSION.is_match(path)
}

/// `src/index.ts` -> `src/index.d.ts`, `a.mts` -> `a.d.mts`, `a.d.ts` unchanged.
pub fn ts_to_dts(path: &str) -> String {
    if is_dts_path(path) {
        return path.to_string();
    }
    let lower = path.to_ascii_lowercase();
    let ext = if lower.ends_with(".mts") || lower.ends_with(".mjs") {
        "mts"
    } else if lower.ends_with(".cts") || lower.ends_with(".cjs") {
        "cts"
    } else {
        "ts"
    };
    let stem = TS_JS_EXTENSION.replace(path, "");
    format!("{}.d.{}", stem, ext)
}

/// Strip a trailing `.d.ts` (or `.d.mts`/`.d.cts`) from a path.
pub fn strip_dts_extension(path: &str) -> String {
    DTS_EXTENSION.replace(path, "").to_string()
}
