//! Core data model shared by extraction, crawling and storage.
//!
//! Extractors produce a stream of [`Record`]s, the crawler reduces it into one [`Metadata`] per
//! field, and the store persists those [`Metadata`] rows keyed by source path.

use std::fmt;

/// A single value observed for a field.
///
/// The variant is decided by the extractor when the record is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Explicit null (`null` in CSV, JSON `null`).
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// Integer outside the `i64` range, as its decimal digits. Typed like [`Value::Integer`].
    BigInteger(String),
    /// UTF-8 string.
    String(String),
    /// A value the metadata model cannot type. The crawler rejects these.
    Unsupported(UnsupportedKind),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Kinds of source values that have no [`FieldType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedKind {
    /// Non-integral number.
    Float,
    /// `true` / `false`.
    Boolean,
    /// Nested list.
    Array,
    /// Nested object.
    Object,
}

/// One `(field name, value)` observation extracted from a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Field/column name.
    pub name: String,
    /// Observed value.
    pub value: Value,
}

impl Record {
    /// Create a new record.
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Inferred type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldType {
    /// Every non-null value was an integer.
    Integer,
    /// Every non-null value was a string.
    String,
    /// Only nulls were observed, so no type could be determined.
    Null,
}

impl FieldType {
    /// Storage marker: `I`, `S`, or `None` for [`FieldType::Null`].
    pub fn code(self) -> Option<&'static str> {
        match self {
            FieldType::Integer => Some("I"),
            FieldType::String => Some("S"),
            FieldType::Null => None,
        }
    }

    /// Inverse of [`FieldType::code`]. Returns `None` for an unknown marker.
    pub fn from_code(code: Option<&str>) -> Option<Self> {
        match code {
            Some("I") => Some(FieldType::Integer),
            Some("S") => Some(FieldType::String),
            None => Some(FieldType::Null),
            Some(_) => None,
        }
    }

    /// Human-readable name used in reports.
    pub fn display_name(self) -> &'static str {
        match self {
            FieldType::Integer => "Integer",
            FieldType::String => "String",
            FieldType::Null => "null",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Aggregated per-field summary produced by one crawl.
///
/// Well-formed metadata satisfies `total_occurrences > 0` and
/// `total_occurrences >= null_occurrences`. The store enforces this; the type itself does not,
/// so that invalid rows can still be represented and rejected at the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Metadata {
    /// Field name.
    pub field: String,
    /// Inferred field type.
    pub field_type: FieldType,
    /// Number of records seen for the field, nulls included.
    pub total_occurrences: u64,
    /// Number of null records seen for the field.
    pub null_occurrences: u64,
}

impl Metadata {
    /// Create a metadata entry.
    pub fn new(
        field: impl Into<String>,
        field_type: FieldType,
        total_occurrences: u64,
        null_occurrences: u64,
    ) -> Self {
        Self {
            field: field.into(),
            field_type,
            total_occurrences,
            null_occurrences,
        }
    }

    /// Occurrences that carried a value (`total - null`).
    pub fn non_null_occurrences(&self) -> u64 {
        self.total_occurrences.saturating_sub(self.null_occurrences)
    }
}
