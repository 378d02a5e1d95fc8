// Project Configuration
//
// Reads a `tsconfig.json`, following `extends` chains. Comments and
// trailing commas are tolerated the way `tsc` tolerates them.

use serde_json::{Map, Value};

use crate::dts::diagnostics::{DtsError, DtsResult};
use crate::dts::file_system::{dirname, ensure_absolute, join, AbsoluteFsPath, ReadonlyFileSystem};

/// Compiler options whose values are paths relative to the defining config.
const PATH_OPTIONS: &[&str] = &["baseUrl", "rootDir", "outDir", "declarationDir"];

const MAX_EXTENDS_DEPTH: usize = 16;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTsConfig {
    pub path: String,
    pub dir: String,
    /// Raw `compilerOptions` with path options made absolute.
    pub compiler_options: Map<String, Value>,
    /// Absolute glob patterns.
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    /// Absolute file names.
    pub files: Option<Vec<String>>,
}

pub fn read_tsconfig<F: ReadonlyFileSystem + ?Sized>(fs: &F, path: &str) -> DtsResult<ParsedTsConfig> {
    read_tsconfig_at_depth(fs, &AbsoluteFsPath::new(path), 0)
}

fn read_tsconfig_at_depth<F: ReadonlyFileSystem + ?Sized>(
    fs: &F,
    path: &AbsoluteFsPath,
    depth: usize,
) -> DtsResult<ParsedTsConfig> {
    if depth > MAX_EXTENDS_DEPTH {
        return Err(DtsError::config(path.as_str(), "circular or too deep `extends` chain"));
    }
    let text = fs
        .read_file(path)
        .map_err(|e| DtsError::config(path.as_str(), e.to_string()))?;
    let json: Value = serde_json::from_str(&strip_json_comments(&text))
        .map_err(|e| DtsError::config(path.as_str(), e.to_string()))?;
    let Value::Object(json) = json else {
        return Err(DtsError::config(path.as_str(), "expected a JSON object"));
    };

    let dir = dirname(path.as_str());
    let mut config = match json.get("extends") {
        Some(Value::String(base)) => {
            let base_path = resolve_extends(fs, &dir, base)
                .ok_or_else(|| DtsError::config(path.as_str(), format!("cannot find base config '{}'", base)))?;
            read_tsconfig_at_depth(fs, &base_path, depth + 1)?
        }
        Some(_) => return Err(DtsError::config(path.as_str(), "`extends` must be a string")),
        None => ParsedTsConfig::default(),
    };
    config.path = path.as_str().to_string();
    config.dir = dir.clone();

    if let Some(Value::Object(options)) = json.get("compilerOptions") {
        for (key, value) in options {
            let value = match value {
                Value::String(s) if PATH_OPTIONS.contains(&key.as_str()) => {
                    Value::String(ensure_absolute(s, &dir))
                }
                other => other.clone(),
            };
            config.compiler_options.insert(key.clone(), value);
        }
    }
    if let Some(include) = string_list(&json, "include") {
        config.include = Some(absolutize(include, &dir));
    }
    if let Some(exclude) = string_list(&json, "exclude") {
        config.exclude = Some(absolutize(exclude, &dir));
    }
    if let Some(files) = string_list(&json, "files") {
        config.files = Some(absolutize(files, &dir));
    }
    Ok(config)
}

fn resolve_extends<F: ReadonlyFileSystem + ?Sized>(fs: &F, dir: &str, base: &str) -> Option<AbsoluteFsPath> {
    let candidates: Vec<String> = if base.starts_with('.') || base.starts_with('/') {
        let path = ensure_absolute(base, dir);
        vec![path.clone(), format!("{}.json", path)]
    } else {
        // Package configs: walk up looking in node_modules.
        let mut found = Vec::new();
        let mut current = dir.to_string();
        loop {
            let path = join(&current, &["node_modules", base]);
            found.push(path.clone());
            found.push(format!("{}.json", path));
            found.push(join(&path, &["tsconfig.json"]));
            let parent = dirname(&current);
            if parent == current {
                break;
            }
            current = parent;
        }
        found
    };
    candidates
        .into_iter()
        .map(AbsoluteFsPath::new)
        .find(|candidate| fs.exists(candidate) && !fs.is_directory(candidate))
}

fn string_list(json: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    json.get(key)?.as_array().map(|items| {
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect()
    })
}

fn absolutize(paths: Vec<String>, dir: &str) -> Vec<String> {
    paths.iter().map(|p| ensure_absolute(p, dir)).collect()
}

/// Remove `//` and `/* */` comments and trailing commas outside strings.
pub fn strip_json_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    let mut in_string = false;
    let mut segment_start = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            match b {
                b'\\' => i += 1,
                b'"' => in_string = false,
                _ => {}
            }
            i += 1;
            continue;
        }
        match b {
            b'"' => {
                in_string = true;
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                out.push_str(&text[segment_start..i]);
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                segment_start = i;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                out.push_str(&text[segment_start..i]);
                i += 2;
                while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
                segment_start = i;
            }
            _ => i += 1,
        }
    }
    out.push_str(&text[segment_start.min(text.len())..]);
    strip_trailing_commas(&out)
}

fn strip_trailing_commas(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut i = 0;
    let mut segment_start = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            match b {
                b'\\' => i += 1,
                b'"' => in_string = false,
                _ => {}
            }
        } else if b == b'"' {
            in_string = true;
        } else if b == b',' {
            let next = text[i + 1..].trim_start().as_bytes().first().copied();
            if matches!(next, Some(b'}') | Some(b']')) {
                out.push_str(&text[segment_start..i]);
                segment_start = i + 1;
            }
        }
        i += 1;
    }
    out.push_str(&text[segment_start.min(text.len())..]);
    out
}
