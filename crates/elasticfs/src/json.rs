//! JSON text rendering for file content.
//!
//! Field definitions render on one line with `", "` / `": "` separators,
//! documents render with a four space indent. Both escape every non-ASCII
//! character as `\uXXXX`, so file content is always plain ASCII and one byte
//! per character.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter, Serializer};

const INDENT: &[u8] = b"    ";

/// Compact output with a space after each separator
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Single line rendering, e.g. `{"type": "text"}`
pub fn to_inline_string<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut ser = Serializer::with_formatter(Vec::new(), SpacedFormatter);
    value.serialize(&mut ser)?;
    Ok(escape_non_ascii(&ser.into_inner()))
}

/// Multi-line rendering with a four space indent
pub fn to_pretty_string<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut ser = Serializer::with_formatter(Vec::new(), PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut ser)?;
    Ok(escape_non_ascii(&ser.into_inner()))
}

// Structural JSON tokens are ASCII, so anything else sits inside a string
// literal where a \u escape is equivalent.
fn escape_non_ascii(json: &[u8]) -> String {
    let text = String::from_utf8_lossy(json);
    let mut out = String::with_capacity(text.len());
    let mut units = [0u16; 2];

    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inline_separators() {
        assert_eq!(
            to_inline_string(&json!({"type": "text"})).unwrap(),
            r#"{"type": "text"}"#
        );
        assert_eq!(
            to_inline_string(&json!({"type": "keyword", "fields": [1, 2]})).unwrap(),
            r#"{"type": "keyword", "fields": [1, 2]}"#
        );
        assert_eq!(to_inline_string(&json!({})).unwrap(), "{}");
    }

    #[test]
    fn test_pretty_indent() {
        let text = to_pretty_string(&json!({"title": "Heat", "tags": ["crime"], "meta": {}}))
            .unwrap();
        assert_eq!(
            text,
            "{\n    \"title\": \"Heat\",\n    \"tags\": [\n        \"crime\"\n    ],\n    \"meta\": {}\n}"
        );
    }

    #[test]
    fn test_key_order_is_preserved() {
        let value: serde_json::Value = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        assert_eq!(to_inline_string(&value).unwrap(), r#"{"z": 1, "a": 2, "m": 3}"#);
    }

    #[test]
    fn test_non_ascii_is_escaped() {
        let text = to_inline_string(&json!({"title": "Amélie 🎬"})).unwrap();
        assert_eq!(text, r#"{"title": "Am\u00e9lie \ud83c\udfac"}"#);
        assert!(text.is_ascii());

        // Escapes decode back to the original string
        let back: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, json!({"title": "Amélie 🎬"}));
    }
}
