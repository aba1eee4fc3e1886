//! JSON extraction.
//!
//! The input must be a single JSON array whose elements are all objects:
//! `[{"a": 1, "b": "x"}, {"a": null}]`. Each key/value pair becomes one [`Record`]; keys are used
//! as-is and values keep their JSON type (integers, strings, `null`). Any other value kind is
//! passed through as [`Value::Unsupported`] and rejected by the crawler.

use std::fs;
use std::path::Path;

use serde_json::Value as JsonValue;

use crate::error::{ExtractionError, ExtractionResult};
use crate::types::{Record, UnsupportedKind, Value};

use super::{Records, RecordExtractor, display_path};

/// Extractor for `.json` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonExtractor;

impl RecordExtractor for JsonExtractor {
    fn extract(&self, path: &Path) -> ExtractionResult<Records> {
        extract_json_from_path(path)
    }
}

/// Extract records from a JSON file.
pub fn extract_json_from_path(path: impl AsRef<Path>) -> ExtractionResult<Records> {
    let path = path.as_ref();
    let source = display_path(path);
    let bytes = fs::read(path).map_err(|err| {
        tracing::debug!(path = %source, error = %err, "could not read json file");
        ExtractionError::Open {
            path: source.clone(),
        }
    })?;
    extract_json_from_slice(&bytes, source)
}

/// Extract records from in-memory JSON.
///
/// `source` names the input in error messages.
pub fn extract_json_from_slice(input: &[u8], source: impl Into<String>) -> ExtractionResult<Records> {
    let source = source.into();
    let document: JsonValue = serde_json::from_slice(input).map_err(|err| {
        tracing::debug!(path = %source, error = %err, "json parse failed");
        if err.is_syntax() || err.is_eof() {
            ExtractionError::MalformedJson { path: source.clone() }
        } else {
            ExtractionError::Unexpected {
                kind: "JSON",
                path: source.clone(),
            }
        }
    })?;

    let JsonValue::Array(items) = document else {
        return Err(ExtractionError::InvalidJsonStructure);
    };

    let mut failed = false;
    let records = items
        .into_iter()
        .map_while(move |item| {
            if failed {
                return None;
            }
            match item {
                JsonValue::Object(map) => Some(Ok(map)),
                _ => {
                    failed = true;
                    Some(Err(ExtractionError::InvalidJsonStructure))
                }
            }
        })
        .flat_map(|object| -> Box<dyn Iterator<Item = ExtractionResult<Record>> + Send> {
            match object {
                Ok(map) => Box::new(
                    map.into_iter()
                        .map(|(key, value)| Ok(Record::new(key, convert_value(value)))),
                ),
                Err(err) => Box::new(std::iter::once(Err(err))),
            }
        });

    Ok(Box::new(records))
}

fn convert_value(value: JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::String(s) => Value::String(s),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => {
                let text = n.to_string();
                if is_integer_literal(&text) {
                    Value::BigInteger(text)
                } else {
                    Value::Unsupported(UnsupportedKind::Float)
                }
            }
        },
        JsonValue::Bool(_) => Value::Unsupported(UnsupportedKind::Boolean),
        JsonValue::Array(_) => Value::Unsupported(UnsupportedKind::Array),
        JsonValue::Object(_) => Value::Unsupported(UnsupportedKind::Object),
    }
}

/// `-?[0-9]+`: no fraction, no exponent.
fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
