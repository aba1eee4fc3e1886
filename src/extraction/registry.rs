//! Extension-based extractor dispatch.
//!
//! An [`ExtractorRegistry`] is built once at startup and then only read. Lookup is a
//! case-sensitive match on the text after the last `.` of the path.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{ExtractionError, ExtractionResult};

use super::{Records, RecordExtractor, csv, display_path, json};

/// Built-in source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// A JSON array of flat objects.
    Json,
}

impl SourceFormat {
    /// All built-in formats, in registration order.
    pub const ALL: [SourceFormat; 2] = [SourceFormat::Csv, SourceFormat::Json];

    /// File extension this format is registered under.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Parse a format from a file extension (case-sensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }

    /// The extractor implementing this format.
    pub fn extractor(self) -> Arc<dyn RecordExtractor> {
        match self {
            Self::Csv => Arc::new(csv::CsvExtractor),
            Self::Json => Arc::new(json::JsonExtractor),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Maps file extensions to extractors.
#[derive(Clone)]
pub struct ExtractorRegistry {
    extractors: BTreeMap<String, Arc<dyn RecordExtractor>>,
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("extensions", &self.extensions())
            .finish()
    }
}

impl Default for ExtractorRegistry {
    /// Registry with every [`SourceFormat`] registered.
    fn default() -> Self {
        let mut registry = Self::empty();
        for format in SourceFormat::ALL {
            registry.register(format.extension(), format.extractor());
        }
        registry
    }
}

impl ExtractorRegistry {
    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            extractors: BTreeMap::new(),
        }
    }

    /// Register `extractor` for `extension`.
    ///
    /// # Panics
    ///
    /// Panics if `extension` is already registered. Registration happens once at startup, so a
    /// duplicate is a programming error.
    pub fn register(
        &mut self,
        extension: impl Into<String>,
        extractor: Arc<dyn RecordExtractor>,
    ) -> &mut Self {
        let extension = extension.into();
        assert!(
            !self.extractors.contains_key(&extension),
            "extension {extension} already registered"
        );
        self.extractors.insert(extension, extractor);
        self
    }

    /// Registered extensions, sorted.
    pub fn extensions(&self) -> Vec<String> {
        self.extractors.keys().cloned().collect()
    }

    /// Extractor registered for `extension`, if any.
    pub fn get(&self, extension: &str) -> Option<&Arc<dyn RecordExtractor>> {
        self.extractors.get(extension)
    }

    /// Extract records from `path` with the extractor matching its extension.
    pub fn dispatch(&self, path: impl AsRef<Path>) -> ExtractionResult<Records> {
        let path = path.as_ref();
        let extension = extension_of(path)?;
        self.dispatch_as(path, &extension)
    }

    /// Extract records from `path` with the extractor registered for `extension`, ignoring the
    /// file name.
    pub fn dispatch_as(&self, path: impl AsRef<Path>, extension: &str) -> ExtractionResult<Records> {
        let extractor = self
            .get(extension)
            .ok_or_else(|| ExtractionError::UnsupportedExtension {
                extension: extension.to_string(),
                supported: self.extensions(),
            })?;
        extractor.extract(path.as_ref())
    }
}

/// Text after the last `.` of `path`.
pub fn extension_of(path: &Path) -> ExtractionResult<String> {
    let text = display_path(path);
    match text.rsplit_once('.') {
        Some((_, ext)) => Ok(ext.to_string()),
        None => Err(ExtractionError::MissingExtension { path: text }),
    }
}
