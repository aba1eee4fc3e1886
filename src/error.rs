use thiserror::Error;

/// Convenience result type for extraction.
pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Convenience result type for crawling.
pub type CrawlResult<T> = Result<T, CrawlingError>;

/// Convenience result type for store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Convenience result type for the crawl/describe pipeline.
pub type GatherResult<T> = Result<T, GatherError>;

/// Error returned while turning a source file into records.
///
/// Shared by every extractor; messages are meant to be shown to users as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// The path has no `.` to take an extension from.
    #[error("The file '{path}' does not have an extension")]
    MissingExtension { path: String },

    /// No extractor is registered for the extension.
    #[error("Unsupported extension '{extension}'. Allowed extensions are: {}", .supported.join(", "))]
    UnsupportedExtension {
        extension: String,
        supported: Vec<String>,
    },

    /// The source file could not be opened or read.
    #[error("Could not open file '{path}'")]
    Open { path: String },

    /// CSV syntax error.
    #[error("The file '{path}' is not a valid CSV")]
    MalformedCsv { path: String },

    /// JSON syntax error.
    #[error("The file '{path}' is not a valid JSON file")]
    MalformedJson { path: String },

    /// A row carries more cells than the header has columns.
    #[error("Missing column name for value [{}] at line {line}", quoted_list(.values))]
    MissingColumnName { values: Vec<String>, line: u64 },

    /// A row has no (or an empty) cell for a known column.
    #[error("Missing value for column '{column}' at line {line}")]
    MissingValue { column: String, line: u64 },

    /// A CSV cell is neither quoted, `null`, nor an integer.
    #[error("Unknown type for value '{value}' (column '{column}') at line {line}")]
    UnknownValue {
        value: String,
        column: String,
        line: u64,
    },

    /// The JSON document is not an array of objects.
    #[error("Invalid JSON structure. It must contain a list of objects")]
    InvalidJsonStructure,

    /// Any other failure while processing the file (e.g. invalid UTF-8).
    #[error("Unexpected error while processing {kind} file '{path}'")]
    Unexpected { kind: &'static str, path: String },
}

fn quoted_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error returned when a record stream cannot be reduced into metadata.
///
/// Either variant aborts the whole crawl.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrawlingError {
    /// Two non-null values of the field have different types.
    #[error("The type of field '{field}' is not consistent")]
    InconsistentType { field: String },

    /// A value of the field has no supported type.
    #[error("The type of field '{field}' is unknown")]
    UnknownType { field: String },
}

/// Uniform error for every metadata store failure.
///
/// The engine error is logged where it is caught and never carried here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The database file could not be created or initialized.
    #[error("Could not create db schema. Is it a writable path?")]
    CreateSchema,

    /// An existing database file could not be opened or is not a database.
    #[error("Could not open the metadata database. Is it a readable path?")]
    Connect,

    /// A write was rejected (constraint violation or corruption); nothing was stored.
    #[error("Could not store metadata into the DB. Is it corrupted?")]
    Write,

    /// Stored rows could not be read back.
    #[error("Could not retrieve metadata from DB. Is it corrupted?")]
    Read,
}

/// Error returned by the crawl/describe pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatherError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Crawling(#[from] CrawlingError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Metadata already exists for the path; nothing was done.
    #[error("File '{path}' already crawled")]
    AlreadyCrawled { path: String },

    /// No metadata is stored for the path.
    #[error("Could not find metadata for the entered path")]
    NotFound { path: String },
}
