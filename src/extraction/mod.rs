//! Extraction of normalized [`Record`] streams from source files.
//!
//! Most callers should go through an [`ExtractorRegistry`] (usually
//! [`ExtractorRegistry::default`]), which picks an extractor from the file extension:
//!
//! - **CSV**: `.csv` (header row, quoted cells are strings, `null` is null, everything else must
//!   be an integer)
//! - **JSON**: `.json` (a single array of flat objects)
//!
//! Format-specific extractors are also available under [`csv`] and [`json`].
//!
//! ```no_run
//! use metadata_gather::extraction::ExtractorRegistry;
//!
//! # fn main() -> Result<(), metadata_gather::ExtractionError> {
//! let registry = ExtractorRegistry::default();
//! for record in registry.dispatch("people.csv")? {
//!     let record = record?;
//!     println!("{} = {:?}", record.name, record.value);
//! }
//! # Ok(())
//! # }
//! ```

pub mod csv;
pub mod json;
pub mod registry;

use std::path::Path;

use crate::error::ExtractionResult;
use crate::types::Record;

pub use registry::{ExtractorRegistry, SourceFormat};

/// Lazy, finite, non-restartable stream of records.
///
/// An extractor stops after yielding its first error.
pub type Records = Box<dyn Iterator<Item = ExtractionResult<Record>> + Send>;

/// A format-specific extractor.
///
/// Failures to open or parse the file as a whole are returned eagerly; per-row failures are
/// yielded in-stream.
pub trait RecordExtractor: Send + Sync {
    /// Start extracting records from `path`.
    fn extract(&self, path: &Path) -> ExtractionResult<Records>;
}

impl<F> RecordExtractor for F
where
    F: Fn(&Path) -> ExtractionResult<Records> + Send + Sync,
{
    fn extract(&self, path: &Path) -> ExtractionResult<Records> {
        self(path)
    }
}

pub(crate) fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
