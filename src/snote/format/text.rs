//! Recognized handwriting text attached to a page.
//!
//! The `RECOGNTEXT` block holds base64 text. Once decoded it is a JSON document
//! whose `elements` array mixes text lines with other recognized objects:
//!
//! ```text
//! {"elements":[{"type":"Text","label":"first line"},{"type":"Shape",...}]}
//! ```
//!
//! The device exports the JSON as UTF-8 but the text is read back one byte per
//! character, so every label has to be turned back into bytes and decoded as
//! UTF-8 a second time.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use log::trace;
use serde::Deserialize;
use serde_json::Value;

use super::super::types::error::{Result, SnoteError};

const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Only `Text` elements have a known shape.
#[derive(Debug, Deserialize)]
struct Recognition {
    #[serde(default)]
    elements: Option<Vec<Value>>,
}

/// Decodes the payload of a `RECOGNTEXT` block into newline-joined text lines.
pub fn parse_recognized_text(block: &[u8]) -> Result<String> {
    let encoded: Vec<u8> = block
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let raw = BASE64.decode(&encoded).map_err(|e| {
        SnoteError::MalformedRecord(format!("Recognized text is not valid base64: {}", e))
    })?;

    let json = latin1_to_string(&raw);
    let recognition: Recognition = serde_json::from_str(&json).map_err(|e| {
        SnoteError::MalformedRecord(format!("Recognized text is not valid JSON: {}", e))
    })?;

    let lines = recognition
        .elements
        .unwrap_or_default()
        .iter()
        .filter(|element| element.get("type").and_then(Value::as_str) == Some("Text"))
        .map(|element| {
            let label = element.get("label").and_then(Value::as_str).ok_or_else(|| {
                SnoteError::MalformedRecord("Text element without a string label".to_string())
            })?;
            redecode_label(label)
        })
        .collect::<Result<Vec<_>>>()?;

    trace!("Recognized text: {} lines", lines.len());
    Ok(lines.join("\n"))
}

/// Maps every byte to the character with the same code point.
fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Reads each UTF-16 code unit of `label` as one byte, then decodes the bytes
/// as UTF-8.
fn redecode_label(label: &str) -> Result<String> {
    let bytes = label
        .encode_utf16()
        .map(|unit| {
            u8::try_from(unit).map_err(|_| {
                SnoteError::MalformedRecord(format!(
                    "Label code unit {:#06x} does not fit in a byte",
                    unit
                ))
            })
        })
        .collect::<Result<Vec<u8>>>()?;
    String::from_utf8(bytes).map_err(|e| {
        SnoteError::MalformedRecord(format!("Label is not valid UTF-8 after re-decoding: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(json: &str) -> Vec<u8> {
        base64::engine::general_purpose::STANDARD
            .encode(json.as_bytes())
            .into_bytes()
    }

    #[test]
    fn joins_text_elements() {
        let block = encode(
            r#"{"elements":[{"type":"Text","label":"hello"},{"type":"Shape","label":"x"},{"type":"Text","label":"world"}]}"#,
        );
        assert_eq!(parse_recognized_text(&block).unwrap(), "hello\nworld");
    }

    #[test]
    fn restores_multibyte_labels() {
        let block = encode(r#"{"elements":[{"type":"Text","label":"café 中文"}]}"#);
        assert_eq!(parse_recognized_text(&block).unwrap(), "café 中文");
    }

    #[test]
    fn escaped_code_points_above_a_byte_are_malformed() {
        let block = encode(r#"{"elements":[{"type":"Text","label":"\u4e2d"}]}"#);
        assert!(matches!(
            parse_recognized_text(&block),
            Err(SnoteError::MalformedRecord(_))
        ));
    }

    #[test]
    fn missing_elements_is_empty_text() {
        assert_eq!(parse_recognized_text(&encode("{}")).unwrap(), "");
    }

    #[test]
    fn null_elements_is_empty_text() {
        assert_eq!(parse_recognized_text(&encode(r#"{"elements":null}"#)).unwrap(), "");
    }

    #[test]
    fn only_text_elements_are_checked() {
        let block = encode(
            r#"{"elements":[{"type":"Text","label":"hi"},{"type":"Node","label":42},null,7,{"type":3}]}"#,
        );
        assert_eq!(parse_recognized_text(&block).unwrap(), "hi");
    }

    #[test]
    fn text_element_needs_a_string_label() {
        let block = encode(r#"{"elements":[{"type":"Text","label":42}]}"#);
        assert!(matches!(
            parse_recognized_text(&block),
            Err(SnoteError::MalformedRecord(_))
        ));
    }

    #[test]
    fn tolerates_whitespace_and_missing_padding() {
        let mut block = encode(r#"{"elements":[{"type":"Text","label":"ab"}]}"#);
        while block.last() == Some(&b'=') {
            block.pop();
        }
        block.insert(4, b'\n');
        assert_eq!(parse_recognized_text(&block).unwrap(), "ab");
    }

    #[test]
    fn invalid_base64_is_malformed() {
        assert!(matches!(
            parse_recognized_text(b"!!!"),
            Err(SnoteError::MalformedRecord(_))
        ));
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(
            parse_recognized_text(&encode("not json")),
            Err(SnoteError::MalformedRecord(_))
        ));
    }
}
