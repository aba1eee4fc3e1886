use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use metadata_gather::ExtractionError;
use metadata_gather::extraction::json::{extract_json_from_path, extract_json_from_slice};
use metadata_gather::types::{Record, UnsupportedKind, Value};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

fn tmp_file(contents: &[u8]) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!("metadata-gather-json-{nanos}-{n}.json"));
    fs::write(&path, contents).unwrap();
    path
}

fn extract(input: &str) -> Result<Vec<Record>, ExtractionError> {
    extract_json_from_slice(input.as_bytes(), "input.json")?.collect()
}

#[test]
fn single_int_field() {
    assert_eq!(
        extract(r#"[{"field": 50}]"#).unwrap(),
        vec![Record::new("field", Value::Integer(50))]
    );
}

#[test]
fn values_keep_their_json_type_and_key_order() {
    let records = extract(r#"[{"field_one": "abc", "field_two": 50, "field_three": null}]"#).unwrap();
    assert_eq!(
        records,
        vec![
            Record::new("field_one", Value::String("abc".into())),
            Record::new("field_two", Value::Integer(50)),
            Record::new("field_three", Value::Null),
        ]
    );
}

#[test]
fn many_objects_yield_records_in_order() {
    let items: Vec<String> = (0..100).map(|i| format!(r#"{{"field": "{i}"}}"#)).collect();
    let records = extract(&format!("[{}]", items.join(","))).unwrap();
    assert_eq!(
        records,
        (0..100)
            .map(|i| Record::new("field", Value::String(i.to_string())))
            .collect::<Vec<_>>()
    );
}

#[test]
fn keys_are_not_sanitized() {
    let records = extract(r#"[{" spaced ": 1, "短消息": "短消息"}]"#).unwrap();
    assert_eq!(records[0].name, " spaced ");
    assert_eq!(records[1], Record::new("短消息", Value::String("短消息".into())));
}

#[test]
fn nested_and_non_integer_values_are_passed_through_as_unsupported() {
    let records = extract(r#"[{"a": [1, 2], "b": {"c": 1}, "d": 1.5, "e": true}]"#).unwrap();
    let values: Vec<_> = records.into_iter().map(|r| r.value).collect();
    assert_eq!(
        values,
        vec![
            Value::Unsupported(UnsupportedKind::Array),
            Value::Unsupported(UnsupportedKind::Object),
            Value::Unsupported(UnsupportedKind::Float),
            Value::Unsupported(UnsupportedKind::Boolean),
        ]
    );
}

#[test]
fn empty_array_yields_nothing() {
    assert!(extract("[]").unwrap().is_empty());
}

#[test]
fn top_level_object_is_invalid_structure() {
    let err = extract(r#"{"field": "value"}"#).unwrap_err();
    assert_eq!(err.to_string(), "Invalid JSON structure. It must contain a list of objects");
}

#[test]
fn non_object_element_is_invalid_structure() {
    let records: Vec<_> = extract_json_from_slice(br#"[{"a": 1}, 2, {"a": 3}]"#, "input.json")
        .unwrap()
        .collect();
    assert_eq!(
        records,
        vec![
            Ok(Record::new("a", Value::Integer(1))),
            Err(ExtractionError::InvalidJsonStructure),
        ]
    );
}

#[test]
fn non_json_content_is_malformed() {
    let path = tmp_file(b"This is a not JSON content");
    let err = extract_json_from_path(&path).err().unwrap();
    assert_eq!(
        err.to_string(),
        format!("The file '{}' is not a valid JSON file", path.display())
    );
    let _ = fs::remove_file(path);
}

#[test]
fn extract_from_path_reads_file() {
    let path = tmp_file(br#"[{"a": 10, "b": "x"}, {"a": null, "b": null}]"#);
    let records: Vec<_> = extract_json_from_path(&path)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[2], Record::new("a", Value::Null));
    let _ = fs::remove_file(path);
}

#[test]
fn missing_file_cannot_be_opened() {
    let err = extract_json_from_path("missing.json").err().unwrap();
    assert_eq!(err.to_string(), "Could not open file 'missing.json'");
}

#[test]
fn integers_wider_than_64_bits_stay_integers() {
    let records = extract(r#"[{"a": 18446744073709551615, "b": -99999999999999999999, "c": 1.0}]"#)
        .unwrap();
    assert_eq!(
        records,
        vec![
            Record::new("a", Value::BigInteger("18446744073709551615".into())),
            Record::new("b", Value::BigInteger("-99999999999999999999".into())),
            Record::new("c", Value::Unsupported(UnsupportedKind::Float)),
        ]
    );
}
