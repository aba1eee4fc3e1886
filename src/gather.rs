//! Crawl and describe entrypoints.
//!
//! [`crawl_file`] runs the whole pipeline for one source file: refuse if the store already holds
//! metadata for the path, otherwise extract → crawl → store. [`describe_file`] reads stored
//! metadata back without touching the source.
//!
//! Paths are store keys as-is: the same file reached through two different path strings is two
//! different sources. Callers usually make paths absolute first.
//!
//! ```no_run
//! use metadata_gather::extraction::ExtractorRegistry;
//! use metadata_gather::gather::{crawl_file, describe_file, GatherOptions};
//! use metadata_gather::store::MetadataStore;
//!
//! # fn main() -> Result<(), metadata_gather::GatherError> {
//! let registry = ExtractorRegistry::default();
//! let mut store = MetadataStore::open(MetadataStore::DEFAULT_FILE_NAME)?;
//! let options = GatherOptions::default();
//!
//! crawl_file(&registry, &mut store, "/data/people.csv", &options)?;
//! let description = describe_file(&store, "/data/people.csv", &options)?;
//! print!("{description}");
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::crawler::try_crawl;
use crate::error::{ExtractionError, GatherError, GatherResult};
use crate::extraction::{ExtractorRegistry, SourceFormat, display_path};
use crate::observability::{
    GatherContext, GatherObserver, GatherOperation, GatherSeverity, GatherStats,
};
use crate::store::MetadataStore;
use crate::types::Metadata;

/// Options controlling a crawl or describe run.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct GatherOptions {
    /// If `None`, pick the extractor from the file extension.
    pub format: Option<SourceFormat>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn GatherObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: GatherSeverity,
}

impl fmt::Debug for GatherOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatherOptions")
            .field("format", &self.format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for GatherOptions {
    fn default() -> Self {
        Self {
            format: None,
            observer: None,
            alert_at_or_above: GatherSeverity::Critical,
        }
    }
}

/// Result of a successful crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Store key the metadata was written under.
    pub path: String,
    /// Number of records extracted.
    pub records: u64,
    /// Metadata written, one entry per field.
    pub metadata: Vec<Metadata>,
}

/// Stored metadata for one source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    /// Store key.
    pub path: String,
    /// One entry per field, in no particular order.
    pub fields: Vec<Metadata>,
}

impl Description {
    /// Number of distinct fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Crawl `path` and store its metadata.
///
/// Fails with [`GatherError::AlreadyCrawled`] without reading the file if the store already
/// holds metadata for `path`. Extraction and crawling errors abort the run before anything is
/// stored.
pub fn crawl_file(
    registry: &ExtractorRegistry,
    store: &mut MetadataStore,
    path: impl AsRef<Path>,
    options: &GatherOptions,
) -> GatherResult<CrawlSummary> {
    let path = path.as_ref();
    let ctx = GatherContext {
        path: display_path(path),
        operation: GatherOperation::Crawl,
    };

    let result = run_crawl(registry, store, path, &ctx.path, options);
    report(
        options,
        &ctx,
        result.as_ref().map(|summary| GatherStats {
            records: summary.records,
            fields: summary.metadata.len(),
        }),
    );
    result
}

fn run_crawl(
    registry: &ExtractorRegistry,
    store: &mut MetadataStore,
    path: &Path,
    key: &str,
    options: &GatherOptions,
) -> GatherResult<CrawlSummary> {
    if store.has_metadata(key)? {
        return Err(GatherError::AlreadyCrawled {
            path: key.to_string(),
        });
    }

    let records = match options.format {
        Some(format) => registry.dispatch_as(path, format.extension())?,
        None => registry.dispatch(path)?,
    };
    let metadata = try_crawl(records.map(|r| r.map_err(GatherError::from)))?;
    store.store(key, &metadata)?;

    let records: u64 = metadata.iter().map(|m| m.total_occurrences).sum();
    tracing::info!(path = key, records, fields = metadata.len(), "crawled");
    Ok(CrawlSummary {
        path: key.to_string(),
        records,
        metadata,
    })
}

/// Read back the metadata stored for `path`.
///
/// Fails with [`GatherError::NotFound`] if nothing is stored for it.
pub fn describe_file(
    store: &MetadataStore,
    path: impl AsRef<Path>,
    options: &GatherOptions,
) -> GatherResult<Description> {
    let ctx = GatherContext {
        path: display_path(path.as_ref()),
        operation: GatherOperation::Describe,
    };

    let result = run_describe(store, &ctx.path);
    report(
        options,
        &ctx,
        result.as_ref().map(|description| GatherStats {
            records: description.fields.iter().map(|m| m.total_occurrences).sum(),
            fields: description.field_count(),
        }),
    );
    result
}

fn run_describe(store: &MetadataStore, key: &str) -> GatherResult<Description> {
    let fields = store.retrieve(key)?;
    if fields.is_empty() {
        return Err(GatherError::NotFound {
            path: key.to_string(),
        });
    }
    Ok(Description {
        path: key.to_string(),
        fields,
    })
}

fn report(options: &GatherOptions, ctx: &GatherContext, outcome: Result<GatherStats, &GatherError>) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match outcome {
        Ok(stats) => obs.on_success(ctx, stats),
        Err(e) => {
            let sev = severity_for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

/// Severity an observer sees for `e`.
pub fn severity_for_error(e: &GatherError) -> GatherSeverity {
    match e {
        GatherError::Extraction(ExtractionError::Open { .. }) => GatherSeverity::Critical,
        GatherError::Extraction(_) => GatherSeverity::Error,
        GatherError::Crawling(_) => GatherSeverity::Error,
        GatherError::Storage(_) => GatherSeverity::Critical,
        GatherError::AlreadyCrawled { .. } | GatherError::NotFound { .. } => {
            GatherSeverity::Warning
        }
    }
}
