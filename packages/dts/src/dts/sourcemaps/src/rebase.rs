use super::raw_source_map::RawSourceMap;
use super::vlq::{decode_vlq_segment, encode_vlq_segment};
use crate::dts::diagnostics::DtsError;
use crate::dts::file_system::{basename, dirname, relative, resolve, strip_dts_extension};

fn is_url(source: &str) -> bool {
    source.contains("://") || source.starts_with("data:")
}

/// Re-express relative `sources` of a map written at `from_map_path` so they
/// stay valid when the map is written at `to_map_path` instead.
pub fn rebase_sources(map: &mut RawSourceMap, from_map_path: &str, to_map_path: &str) {
    let from_dir = dirname(from_map_path);
    let to_dir = dirname(to_map_path);
    if from_dir == to_dir {
        return;
    }
    for source in map.sources.iter_mut() {
        if is_url(source) {
            continue;
        }
        let absolute = resolve(&from_dir, source);
        *source = relative(&to_dir, &absolute);
    }
}

/// Point `sources` entries that resolve to `from_source` at `to_source`.
pub fn redirect_source(map: &mut RawSourceMap, map_path: &str, from_source: &str, to_source: &str) {
    let map_dir = dirname(map_path);
    for source in map.sources.iter_mut() {
        if is_url(source) {
            continue;
        }
        if resolve(&map_dir, source) == resolve(&map_dir, from_source) {
            *source = relative(&map_dir, &resolve(&map_dir, to_source));
        }
    }
}

/// Prepend `lines` empty generated lines, matching a header inserted above
/// the mapped content.
pub fn shift_generated_lines(mappings: &str, lines: usize) -> String {
    format!("{}{}", ";".repeat(lines), mappings)
}

/// Map every original line through `line`. Original lines are delta
/// encoded across the whole mapping, so every source segment is re-encoded.
pub fn remap_source_lines(mappings: &str, line: impl Fn(i64) -> i64) -> Option<String> {
    let mut out = String::with_capacity(mappings.len() + 8);
    let mut original = 0i64;
    let mut previous = 0i64;
    for (line_idx, generated) in mappings.split(';').enumerate() {
        if line_idx > 0 {
            out.push(';');
        }
        for (seg_idx, segment) in generated.split(',').enumerate() {
            if seg_idx > 0 {
                out.push(',');
            }
            if segment.is_empty() {
                continue;
            }
            let mut values = decode_vlq_segment(segment)?;
            if values.len() >= 4 {
                original += values[2];
                let mapped = line(original);
                values[2] = mapped - previous;
                previous = mapped;
                out.push_str(&encode_vlq_segment(&values));
            } else {
                out.push_str(segment);
            }
        }
    }
    Some(out)
}

/// Rewrite a declaration map for its final location.
///
/// `line_shift` is the number of lines inserted above the declaration's
/// original content.
pub fn relocate_map(
    content: &str,
    from_map_path: &str,
    to_map_path: &str,
    line_shift: usize,
) -> Result<String, DtsError> {
    let failure = |message: String| DtsError::SourceMapProcessing {
        path: from_map_path.to_string(),
        message,
    };
    let mut map = RawSourceMap::parse(content).map_err(|e| failure(e.to_string()))?;

    rebase_sources(&mut map, from_map_path, to_map_path);
    if map.file.is_some() {
        let declaration = to_map_path.strip_suffix(".map").unwrap_or(to_map_path);
        map.file = Some(basename(declaration));
    }
    if line_shift > 0 {
        map.mappings = shift_generated_lines(&map.mappings, line_shift);
    }

    map.to_json().map_err(|e| failure(e.to_string()))
}

/// The declaration a `.d.ts.map` path belongs to, without extension.
pub fn map_declaration_stem(map_path: &str) -> String {
    strip_dts_extension(map_path.strip_suffix(".map").unwrap_or(map_path))
}
