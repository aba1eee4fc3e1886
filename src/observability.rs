//! Outcome reporting for crawl and describe runs.
//!
//! [`crate::gather`] calls a [`GatherObserver`] once per run: `on_success` with stats, or
//! `on_failure` with a severity (plus `on_alert` when the severity reaches the configured
//! threshold).

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::GatherError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GatherSeverity {
    /// Informational event.
    Info,
    /// Refusal based on a precondition (already crawled, not found).
    Warning,
    /// The run failed because of the input.
    Error,
    /// Infrastructure failure (unreadable source, storage).
    Critical,
}

/// Which pipeline operation ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatherOperation {
    Crawl,
    Describe,
}

impl fmt::Display for GatherOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crawl => f.write_str("crawl"),
            Self::Describe => f.write_str("describe"),
        }
    }
}

/// Context about one run.
#[derive(Debug, Clone)]
pub struct GatherContext {
    /// Source path the run was keyed on.
    pub path: String,
    /// Operation performed.
    pub operation: GatherOperation,
}

/// Stats reported on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatherStats {
    /// Records consumed (crawl) or occurrences stored (describe).
    pub records: u64,
    /// Distinct fields.
    pub fields: usize,
}

/// Observer interface for run outcomes.
pub trait GatherObserver: Send + Sync {
    /// Called when a run succeeds.
    fn on_success(&self, _ctx: &GatherContext, _stats: GatherStats) {}

    /// Called when a run fails.
    fn on_failure(&self, _ctx: &GatherContext, _severity: GatherSeverity, _error: &GatherError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &GatherContext, severity: GatherSeverity, error: &GatherError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Fans callbacks out to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn GatherObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn GatherObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl GatherObserver for CompositeObserver {
    fn on_success(&self, ctx: &GatherContext, stats: GatherStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &GatherContext, severity: GatherSeverity, error: &GatherError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &GatherContext, severity: GatherSeverity, error: &GatherError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl GatherObserver for TracingObserver {
    fn on_success(&self, ctx: &GatherContext, stats: GatherStats) {
        tracing::info!(
            operation = %ctx.operation,
            path = %ctx.path,
            records = stats.records,
            fields = stats.fields,
            "gather succeeded"
        );
    }

    fn on_failure(&self, ctx: &GatherContext, severity: GatherSeverity, error: &GatherError) {
        match severity {
            GatherSeverity::Info => {
                tracing::info!(operation = %ctx.operation, path = %ctx.path, %error, "gather failed")
            }
            GatherSeverity::Warning => {
                tracing::warn!(operation = %ctx.operation, path = %ctx.path, %error, "gather refused")
            }
            GatherSeverity::Error | GatherSeverity::Critical => tracing::error!(
                operation = %ctx.operation,
                path = %ctx.path,
                ?severity,
                %error,
                "gather failed"
            ),
        }
    }

    fn on_alert(&self, ctx: &GatherContext, severity: GatherSeverity, error: &GatherError) {
        tracing::error!(
            alert = true,
            operation = %ctx.operation,
            path = %ctx.path,
            ?severity,
            %error,
            "gather failed"
        );
    }
}

/// Appends events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl GatherObserver for FileObserver {
    fn on_success(&self, ctx: &GatherContext, stats: GatherStats) {
        self.append_line(&format!(
            "{} ok operation={} path={} records={} fields={}",
            unix_ts(),
            ctx.operation,
            ctx.path,
            stats.records,
            stats.fields
        ));
    }

    fn on_failure(&self, ctx: &GatherContext, severity: GatherSeverity, error: &GatherError) {
        self.append_line(&format!(
            "{} fail severity={:?} operation={} path={} err={}",
            unix_ts(),
            severity,
            ctx.operation,
            ctx.path,
            error
        ));
    }

    fn on_alert(&self, ctx: &GatherContext, severity: GatherSeverity, error: &GatherError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} operation={} path={} err={}",
            unix_ts(),
            severity,
            ctx.operation,
            ctx.path,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
