//! CSV extraction.
//!
//! The file must start with a header row. Every cell of every row becomes one [`Record`] named
//! after its (sanitized) column. Cells are typed as follows, after trimming spaces:
//!
//! - a leading `"` makes a string (one surrounding pair of quotes is removed)
//! - `null` in any case is a null
//! - anything else must parse as an integer of any width (surrounding ASCII whitespace is allowed)
//!
//! Quote characters carry no CSV meaning here: commas inside quotes still split cells.

use std::fs;
use std::io::{Cursor, Read};
use std::num::IntErrorKind;
use std::path::Path;

use crate::error::{ExtractionError, ExtractionResult};
use crate::types::{Record, Value};

use super::{Records, RecordExtractor, display_path};

/// Extractor for `.csv` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvExtractor;

impl RecordExtractor for CsvExtractor {
    fn extract(&self, path: &Path) -> ExtractionResult<Records> {
        extract_csv_from_path(path)
    }
}

/// Extract records from a CSV file.
///
/// The whole file is read up front; records are then produced row by row.
pub fn extract_csv_from_path(path: impl AsRef<Path>) -> ExtractionResult<Records> {
    let path = path.as_ref();
    let source = display_path(path);
    let bytes = fs::read(path).map_err(|err| {
        tracing::debug!(path = %source, error = %err, "could not read csv file");
        ExtractionError::Open {
            path: source.clone(),
        }
    })?;
    extract_csv_from_reader(Cursor::new(bytes), source)
}

/// Extract records from CSV data in `reader`.
///
/// `source` names the input in error messages.
pub fn extract_csv_from_reader<R>(reader: R, source: impl Into<String>) -> ExtractionResult<Records>
where
    R: Read + Send + 'static,
{
    let source = source.into();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .quoting(false)
        .flexible(true)
        .from_reader(reader);

    let columns = rdr
        .headers()
        .map_err(|err| csv_failure(&source, err))?
        .iter()
        .map(sanitize_column)
        .collect();

    Ok(Box::new(CsvRecords {
        source,
        columns,
        rows: rdr.into_records(),
        pending: Vec::new().into_iter(),
        done: false,
    }))
}

struct CsvRecords<R> {
    source: String,
    columns: Vec<String>,
    rows: csv::StringRecordsIntoIter<R>,
    pending: std::vec::IntoIter<Record>,
    done: bool,
}

impl<R: Read> Iterator for CsvRecords<R> {
    type Item = ExtractionResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.next() {
                return Some(Ok(record));
            }
            if self.done {
                return None;
            }

            let row = match self.rows.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(csv_failure(&self.source, err)));
                }
                Some(Ok(row)) => row,
            };

            match records_for_row(&self.columns, &row) {
                Ok(records) => self.pending = records.into_iter(),
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

fn records_for_row(columns: &[String], row: &csv::StringRecord) -> ExtractionResult<Vec<Record>> {
    // 1-based and counting the header, as reported by the reader.
    let line = row.position().map(|p| p.line()).unwrap_or(0);

    let mut records = Vec::with_capacity(columns.len());
    for (idx, column) in columns.iter().enumerate() {
        let raw = row.get(idx).unwrap_or("");
        if raw.trim_matches(' ').is_empty() {
            return Err(ExtractionError::MissingValue {
                column: column.clone(),
                line,
            });
        }
        let value = sanitize_value(raw).ok_or_else(|| ExtractionError::UnknownValue {
            value: raw.to_string(),
            column: column.clone(),
            line,
        })?;
        records.push(Record::new(column.clone(), value));
    }

    if row.len() > columns.len() {
        return Err(ExtractionError::MissingColumnName {
            values: row.iter().skip(columns.len()).map(str::to_string).collect(),
            line,
        });
    }

    Ok(records)
}

fn sanitize_column(name: &str) -> String {
    name.trim_matches(|c| c == ' ' || c == '"').to_string()
}

fn sanitize_value(raw: &str) -> Option<Value> {
    let value = raw.trim_matches(' ');
    if let Some(inner) = value.strip_prefix('"') {
        let inner = inner.strip_suffix('"').unwrap_or(inner);
        return Some(Value::String(inner.to_string()));
    }
    if value.eq_ignore_ascii_case("null") {
        return Some(Value::Null);
    }
    let digits = value.trim_ascii();
    match digits.parse::<i64>() {
        Ok(n) => Some(Value::Integer(n)),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                Some(Value::BigInteger(digits.to_string()))
            }
            _ => None,
        },
    }
}

fn csv_failure(source: &str, err: csv::Error) -> ExtractionError {
    tracing::debug!(path = %source, error = %err, "csv reader failed");
    match err.kind() {
        csv::ErrorKind::Io(_) => ExtractionError::Open {
            path: source.to_string(),
        },
        csv::ErrorKind::Utf8 { .. } => ExtractionError::Unexpected {
            kind: "CSV",
            path: source.to_string(),
        },
        _ => ExtractionError::MalformedCsv {
            path: source.to_string(),
        },
    }
}
