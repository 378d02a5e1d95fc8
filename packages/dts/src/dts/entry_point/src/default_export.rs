use once_cell::sync::Lazy;
use regex::Regex;

use crate::dts::transform::{declare_module_spans, mask_code};

static EXPORT_DEFAULT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bexport\s+default\b").unwrap());
static EXPORT_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bexport\s+(?:type\s+)?\{([^}]*)\}").unwrap());
static AS_DEFAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:type\s+)?[\w$]+\s+as\s+default$").unwrap());

/// Whether a declaration exports a default binding at the top level.
///
/// Comments, string contents and ambient `declare module` blocks are
/// ignored.
pub fn has_default_export(code: &str) -> bool {
    let masked = mask_code(code);
    let spans = declare_module_spans(&masked);
    let mut bytes = masked.into_bytes();
    for (start, end) in spans {
        for byte in &mut bytes[start..end] {
            if *byte != b'\n' {
                *byte = b' ';
            }
        }
    }
    let masked = String::from_utf8_lossy(&bytes);

    if EXPORT_DEFAULT.is_match(&masked) {
        return true;
    }
    EXPORT_LIST.captures_iter(&masked).any(|caps| {
        caps[1]
            .split(',')
            .map(str::trim)
            .any(|element| element == "default" || AS_DEFAULT.is_match(element))
    })
}
