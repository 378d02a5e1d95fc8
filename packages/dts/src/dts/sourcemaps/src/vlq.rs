// Base64 VLQ
//
// Encoding used by the `mappings` field.

const BASE64_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

pub fn encode_vlq(mut value: i64) -> String {
    let mut result = String::new();
    let negative = value < 0;

    if negative {
        value = -value;
    }

    // Sign lives in the lowest bit of the first digit.
    let mut first_digit = (value & 0xF) << 1;
    if negative {
        first_digit |= 1;
    }
    value >>= 4;

    if value > 0 {
        first_digit |= 0x20;
    }
    result.push(BASE64_CHARS[first_digit as usize] as char);

    while value > 0 {
        let mut digit = value & 0x1F;
        value >>= 5;
        if value > 0 {
            digit |= 0x20;
        }
        result.push(BASE64_CHARS[digit as usize] as char);
    }

    result
}

fn base64_value(c: u8) -> Option<i64> {
    BASE64_CHARS.iter().position(|b| *b == c).map(|p| p as i64)
}

/// Decode every VLQ value in one segment (e.g. `AAAA` -> `[0, 0, 0, 0]`).
pub fn decode_vlq_segment(segment: &str) -> Option<Vec<i64>> {
    let mut values = Vec::new();
    let mut value = 0i64;
    let mut shift = 0u32;
    for c in segment.bytes() {
        let digit = base64_value(c)?;
        value += (digit & 0x1F) << shift;
        if digit & 0x20 != 0 {
            shift += 5;
            continue;
        }
        let negative = value & 1 == 1;
        let magnitude = value >> 1;
        values.push(if negative { -magnitude } else { magnitude });
        value = 0;
        shift = 0;
    }
    if shift != 0 {
        return None;
    }
    Some(values)
}

pub fn encode_vlq_segment(values: &[i64]) -> String {
    values.iter().map(|v| encode_vlq(*v)).collect()
}
