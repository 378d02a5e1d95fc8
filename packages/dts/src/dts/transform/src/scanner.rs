// Scanner
//
// Byte-preserving masking of comments and string contents.

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    LineComment,
    BlockComment,
    Str(u8),
}

fn blank(out: &mut Vec<u8>, byte: u8) {
    out.push(if byte == b'\n' || byte == b'\r' { byte } else { b' ' });
}

/// Blank out comments entirely and the contents of string and template
/// literals, keeping the quotes. The result has the same byte length as the
/// input, so offsets found in the mask index the original text.
pub fn mask_code(code: &str) -> String {
    let bytes = code.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut mode = Mode::Code;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        match mode {
            Mode::Code => match (b, next) {
                (b'/', Some(b'/')) => {
                    mode = Mode::LineComment;
                    out.extend_from_slice(b"  ");
                    i += 2;
                    continue;
                }
                (b'/', Some(b'*')) => {
                    mode = Mode::BlockComment;
                    out.extend_from_slice(b"  ");
                    i += 2;
                    continue;
                }
                (b'\'' | b'"' | b'`', _) => {
                    mode = Mode::Str(b);
                    out.push(b);
                }
                _ => out.push(b),
            },
            Mode::LineComment => {
                if b == b'\n' {
                    mode = Mode::Code;
                }
                blank(&mut out, b);
            }
            Mode::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    mode = Mode::Code;
                    out.extend_from_slice(b"  ");
                    i += 2;
                    continue;
                }
                blank(&mut out, b);
            }
            Mode::Str(quote) => {
                if b == b'\\' && next.is_some() {
                    blank(&mut out, b);
                    if let Some(n) = next {
                        blank(&mut out, n);
                    }
                    i += 2;
                    continue;
                }
                if b == quote {
                    mode = Mode::Code;
                    out.push(b);
                } else if b == b'\n' && quote != b'`' {
                    // Unterminated literal.
                    mode = Mode::Code;
                    out.push(b);
                } else {
                    blank(&mut out, b);
                }
            }
        }
        i += 1;
    }
    // Only ASCII bytes were replaced, and always by ASCII.
    String::from_utf8(out).unwrap_or_else(|_| " ".repeat(code.len()))
}

/// Apply `(start, end, replacement)` edits to `code`. Edits must not overlap.
pub fn apply_edits(code: &str, mut edits: Vec<(usize, usize, String)>) -> String {
    edits.sort_by_key(|(start, end, _)| (*start, *end));
    let mut out = String::with_capacity(code.len());
    let mut cursor = 0;
    for (start, end, replacement) in edits {
        if start < cursor {
            continue;
        }
        out.push_str(&code[cursor..start]);
        out.push_str(&replacement);
        cursor = end;
    }
    out.push_str(&code[cursor..]);
    out
}
