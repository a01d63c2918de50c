//! Text cleanup applied to every shaped cell so the envelope always encodes.

use crate::domain::entities::value::Value;

fn is_stripped_char(ch: char) -> bool {
    match ch {
        '\t' | '\n' | '\r' => false,
        '\u{0}'..='\u{1f}' | '\u{7f}' | '\u{fffd}' => true,
        _ => false,
    }
}

/// Removes control characters outside whitespace and replacement characters.
pub fn strip_control_chars(text: &str) -> String {
    text.chars().filter(|ch| !is_stripped_char(*ch)).collect()
}

/// Decodes `bytes`, dropping every malformed UTF-8 sequence.
///
/// Over-long encodings, encoded surrogates, lone continuation bytes and
/// truncated sequences are all rejected by the decoder and discarded here
/// rather than replaced.
pub fn sanitize_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;
    while !rest.is_empty() {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(&strip_control_chars(valid));
                break;
            }
            Err(err) => {
                let (valid, tail) = rest.split_at(err.valid_up_to());
                if let Ok(valid) = std::str::from_utf8(valid) {
                    out.push_str(&strip_control_chars(valid));
                }
                let skip = err.error_len().unwrap_or(tail.len());
                rest = &tail[skip..];
            }
        }
    }
    out
}

pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Text(text) if text.is_empty() => Value::Null,
        Value::Bytes(bytes) if bytes.is_empty() => Value::Null,
        Value::Text(text) => Value::Text(strip_control_chars(&text)),
        Value::Bytes(bytes) => Value::Text(sanitize_bytes(&bytes)),
        other => other,
    }
}
