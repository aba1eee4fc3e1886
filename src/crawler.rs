//! Reduction of a record stream into per-field [`Metadata`].
//!
//! One accumulator is kept per distinct field name. Each record bumps the field's occurrence
//! count, nulls also bump its null count, and every non-null value must agree with the first
//! non-null type seen for that field. Output follows first-seen field order, but callers should
//! treat it as unordered.
//!
//! ```rust
//! use metadata_gather::crawler::crawl;
//! use metadata_gather::types::{FieldType, Metadata, Record, Value};
//!
//! let records = vec![
//!     Record::new("id", Value::Integer(1)),
//!     Record::new("id", Value::Null),
//!     Record::new("name", Value::String("Ada".into())),
//! ];
//! let metadata = crawl(records).unwrap();
//! assert_eq!(
//!     metadata,
//!     vec![
//!         Metadata::new("id", FieldType::Integer, 2, 1),
//!         Metadata::new("name", FieldType::String, 1, 0),
//!     ]
//! );
//! ```

use std::collections::HashMap;

use crate::error::{CrawlResult, CrawlingError};
use crate::types::{FieldType, Metadata, Record, Value};

#[derive(Debug)]
struct FieldAggregate {
    name: String,
    field_type: Option<FieldType>,
    occurrences: u64,
    nulls: u64,
}

impl FieldAggregate {
    fn new(name: String) -> Self {
        Self {
            name,
            field_type: None,
            occurrences: 0,
            nulls: 0,
        }
    }

    fn observe(&mut self, value: &Value) -> CrawlResult<()> {
        self.occurrences += 1;

        let observed = match value {
            Value::Null => {
                self.nulls += 1;
                return Ok(());
            }
            Value::Integer(_) | Value::BigInteger(_) => FieldType::Integer,
            Value::String(_) => FieldType::String,
            Value::Unsupported(_) => {
                return Err(CrawlingError::UnknownType {
                    field: self.name.clone(),
                });
            }
        };

        match self.field_type {
            None => self.field_type = Some(observed),
            Some(established) if established == observed => {}
            Some(_) => {
                return Err(CrawlingError::InconsistentType {
                    field: self.name.clone(),
                });
            }
        }
        Ok(())
    }

    fn into_metadata(self) -> Metadata {
        Metadata::new(
            self.name,
            self.field_type.unwrap_or(FieldType::Null),
            self.occurrences,
            self.nulls,
        )
    }
}

/// Incremental crawler state for one source.
///
/// Feed records with [`Crawler::observe`] and collect the result with [`Crawler::finish`].
#[derive(Debug, Default)]
pub struct Crawler {
    index: HashMap<String, usize>,
    fields: Vec<FieldAggregate>,
}

impl Crawler {
    /// Create an empty crawler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one record.
    pub fn observe(&mut self, record: Record) -> CrawlResult<()> {
        let Record { name, value } = record;
        let slot = match self.index.get(&name) {
            Some(&slot) => slot,
            None => {
                let slot = self.fields.len();
                self.index.insert(name.clone(), slot);
                self.fields.push(FieldAggregate::new(name));
                slot
            }
        };
        self.fields[slot].observe(&value)
    }

    /// Number of distinct fields seen so far.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// One [`Metadata`] per field, in first-seen order.
    pub fn finish(self) -> Vec<Metadata> {
        self.fields
            .into_iter()
            .map(FieldAggregate::into_metadata)
            .collect()
    }
}

/// Reduce `records` into one [`Metadata`] per distinct field name.
///
/// An empty input yields an empty output. Any type error aborts the crawl and no metadata is
/// returned.
pub fn crawl<I>(records: I) -> CrawlResult<Vec<Metadata>>
where
    I: IntoIterator<Item = Record>,
{
    let mut crawler = Crawler::new();
    for record in records {
        crawler.observe(record)?;
    }
    Ok(crawler.finish())
}

/// Like [`crawl`], for streams that can fail while being produced (such as extractor output).
///
/// The first stream error or crawling error is returned.
pub fn try_crawl<I, E>(records: I) -> Result<Vec<Metadata>, E>
where
    I: IntoIterator<Item = Result<Record, E>>,
    E: From<CrawlingError>,
{
    let mut crawler = Crawler::new();
    for record in records {
        crawler.observe(record?)?;
    }
    Ok(crawler.finish())
}
