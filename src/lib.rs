//! `metadata-gather` crawls structured data files into per-field metadata and keeps it in a
//! SQLite store keyed by the source path.
//!
//! The pipeline is extractor → crawler → store:
//!
//! - [`extraction`] turns a file into a stream of [`types::Record`]s, picking the format from the
//!   file extension (`.csv`, `.json`)
//! - [`crawler`] reduces the stream into one [`types::Metadata`] per field: inferred type
//!   ([`types::FieldType`]), total occurrences and null occurrences
//! - [`store`] persists and retrieves metadata, with the count and type invariants enforced by
//!   the database schema
//!
//! [`gather`] wires the three together ([`gather::crawl_file`], [`gather::describe_file`]) and
//! reports outcomes to an optional [`observability::GatherObserver`].
//!
//! ## Example
//!
//! ```rust
//! use metadata_gather::crawler::crawl;
//! use metadata_gather::store::MetadataStore;
//! use metadata_gather::types::{FieldType, Metadata, Record, Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let records = vec![
//!     Record::new("a", Value::Integer(10)),
//!     Record::new("a", Value::Null),
//!     Record::new("b", Value::String("x".into())),
//! ];
//! let metadata = crawl(records)?;
//!
//! let mut store = MetadataStore::open_in_memory()?;
//! store.store("/data/sample.csv", &metadata)?;
//! assert_eq!(store.retrieve("/data/sample.csv")?.len(), 2);
//! assert_eq!(metadata[0], Metadata::new("a", FieldType::Integer, 2, 1));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: records, values, field types and metadata
//! - [`error`]: error types for each stage
//! - [`report`]: describe output rendering
//! - [`logging`]: tracing setup for the binary

pub mod crawler;
pub mod error;
pub mod extraction;
pub mod gather;
pub mod logging;
pub mod observability;
pub mod report;
pub mod store;
pub mod types;

pub use error::{
    CrawlResult, CrawlingError, ExtractionError, ExtractionResult, GatherError, GatherResult,
    StorageError, StorageResult,
};
