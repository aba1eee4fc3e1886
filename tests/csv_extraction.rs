use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use metadata_gather::ExtractionError;
use metadata_gather::extraction::csv::{extract_csv_from_path, extract_csv_from_reader};
use metadata_gather::types::{Record, Value};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

fn tmp_file(contents: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!("metadata-gather-csv-{nanos}-{n}.csv"));
    fs::write(&path, contents).unwrap();
    path
}

fn extract(input: &str) -> Result<Vec<Record>, ExtractionError> {
    extract_csv_from_reader(Cursor::new(input.as_bytes().to_vec()), "input.csv")?
        .collect()
}

fn int(name: &str, v: i64) -> Record {
    Record::new(name, Value::Integer(v))
}

fn string(name: &str, v: &str) -> Record {
    Record::new(name, Value::String(v.to_string()))
}

#[test]
fn single_int_field() {
    assert_eq!(extract("field\r\n50\r\n").unwrap(), vec![int("field", 50)]);
}

#[test]
fn many_rows_yield_one_record_per_cell() {
    let mut input = String::from("field\n");
    for i in 0..100 {
        input.push_str(&format!("{i}\n"));
    }
    let records = extract(&input).unwrap();
    assert_eq!(records, (0..100).map(|i| int("field", i)).collect::<Vec<_>>());
}

#[test]
fn quoted_values_are_strings_and_null_is_null() {
    let input = "field_one,field_two,field_three\n\"abc\",50,null\n";
    assert_eq!(
        extract(input).unwrap(),
        vec![
            string("field_one", "abc"),
            int("field_two", 50),
            Record::new("field_three", Value::Null),
        ]
    );
}

#[test]
fn headers_and_cells_are_trimmed() {
    let input = " \"id\" , name \n 7 ,  \"Ada\" \n";
    assert_eq!(extract(input).unwrap(), vec![int("id", 7), string("name", "Ada")]);
}

#[test]
fn unicode_names_and_values_survive() {
    assert_eq!(extract("短消息\n50\n").unwrap(), vec![int("短消息", 50)]);
    assert_eq!(
        extract("field\n\"短消息\"\n").unwrap(),
        vec![string("field", "短消息")]
    );
}

#[test]
fn header_only_file_yields_nothing() {
    assert!(extract("a,b,c\n").unwrap().is_empty());
}

#[test]
fn empty_cell_is_missing_value() {
    let err = extract("field_one,field_two\n\"abc\",\n").unwrap_err();
    assert_eq!(err.to_string(), "Missing value for column 'field_two' at line 2");
}

#[test]
fn short_row_is_missing_value() {
    let err = extract("a,b\n1,2\n3\n").unwrap_err();
    assert_eq!(
        err,
        ExtractionError::MissingValue {
            column: "b".to_string(),
            line: 3
        }
    );
}

#[test]
fn extra_cell_is_missing_column_name() {
    let err = extract("field_one,field_two\n\"abc\",50,100\n").unwrap_err();
    assert_eq!(err.to_string(), "Missing column name for value ['100'] at line 2");
}

#[test]
fn unquoted_text_is_unknown_value() {
    let err = extract("field_one\nabc\n").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown type for value 'abc' (column 'field_one') at line 2"
    );
}

#[test]
fn stream_stops_after_first_error() {
    let records: Vec<_> = extract_csv_from_reader(&b"a\n1\nx\n2\n"[..], "input.csv")
        .unwrap()
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], Ok(int("a", 1)));
    assert!(records[1].is_err());
}

#[test]
fn extract_from_path_reads_file() {
    let path = tmp_file("a,b\n1,\"x\"\nnull,null\n");
    let records: Vec<_> = extract_csv_from_path(&path)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        records,
        vec![
            int("a", 1),
            string("b", "x"),
            Record::new("a", Value::Null),
            Record::new("b", Value::Null),
        ]
    );
    let _ = fs::remove_file(path);
}

#[test]
fn missing_file_cannot_be_opened() {
    let err = extract_csv_from_path("missing.csv").err().unwrap();
    assert_eq!(err.to_string(), "Could not open file 'missing.csv'");
}

#[test]
fn invalid_utf8_is_unexpected() {
    let path = tmp_file("");
    fs::write(&path, b"name\n\"\xff\xfe\"\n").unwrap();
    let result: Result<Vec<_>, _> = match extract_csv_from_path(&path) {
        Ok(records) => records.collect(),
        Err(e) => Err(e),
    };
    assert_eq!(
        result.unwrap_err().to_string(),
        format!("Unexpected error while processing CSV file '{}'", path.display())
    );
    let _ = fs::remove_file(path);
}

#[test]
fn integers_wider_than_64_bits_stay_integers() {
    assert_eq!(
        extract("a\n99999999999999999999\n").unwrap(),
        vec![Record::new("a", Value::BigInteger("99999999999999999999".into()))]
    );
}

#[test]
fn tab_around_an_integer_is_ignored() {
    assert_eq!(extract("a,b\n\t5,6\t\n").unwrap(), vec![int("a", 5), int("b", 6)]);
}
