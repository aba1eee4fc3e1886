//! metadata-gather CLI - crawl data files into field metadata and describe it
//!
//! Usage:
//!   metadata-gather --crawl <FILE_PATH> [--database-path <PATH>]
//!   metadata-gather --describe <FILE_PATH> [--database-path <PATH>] [--output json]
//!
//! Examples:
//!   metadata-gather -c data/people.csv
//!   metadata-gather -d data/people.csv --output json

use std::fmt::Display;
use std::panic;
use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgGroup, Parser, ValueEnum};
use metadata_gather::extraction::{ExtractorRegistry, SourceFormat};
use metadata_gather::gather::{GatherOptions, crawl_file, describe_file};
use metadata_gather::logging;
use metadata_gather::observability::{
    CompositeObserver, FileObserver, GatherObserver, TracingObserver,
};
use metadata_gather::report::{ReportFormat, render};
use metadata_gather::store::MetadataStore;

#[derive(Parser)]
#[command(name = "metadata-gather")]
#[command(about = "Metadata gather - per-field type and occurrence metadata for CSV/JSON files")]
#[command(version)]
#[command(group(ArgGroup::new("action").required(true).args(["crawl", "describe"])))]
struct Cli {
    /// Source file to crawl
    #[arg(short, long, value_name = "FILE_PATH", value_parser = readable_file)]
    crawl: Option<PathBuf>,

    /// Source file to describe
    #[arg(short, long, value_name = "FILE_PATH", value_parser = absolute_path)]
    describe: Option<PathBuf>,

    /// Metadata database path
    #[arg(
        long,
        value_name = "PATH",
        default_value = MetadataStore::DEFAULT_FILE_NAME,
        value_parser = absolute_path
    )]
    database_path: PathBuf,

    /// Force the source format instead of using the file extension
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Describe output format
    #[arg(short, long, value_enum, default_value_t = OutputArg::Text)]
    output: OutputArg,

    /// Append run outcomes to this file
    #[arg(long, value_name = "PATH")]
    event_log: Option<PathBuf>,

    /// Log debug details and run outcomes to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for SourceFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => SourceFormat::Csv,
            FormatArg::Json => SourceFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputArg {
    Text,
    Json,
}

impl From<OutputArg> for ReportFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Text => ReportFormat::Text,
            OutputArg::Json => ReportFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _ = logging::init(cli.verbose);

    // Keep panics off the terminal; they are reported as a generic failure below.
    panic::set_hook(Box::new(|info| tracing::debug!(%info, "panic")));

    match panic::catch_unwind(move || run(cli)) {
        Ok(code) => code,
        Err(_) => {
            eprintln!("Unexpected error occurred.");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> ExitCode {
    let options = GatherOptions {
        format: cli.format.map(SourceFormat::from),
        observer: observer(cli.verbose, cli.event_log.as_deref()),
        ..Default::default()
    };

    match (cli.crawl, cli.describe) {
        (Some(file), _) => cmd_crawl(&file, &cli.database_path, &options),
        (None, Some(file)) => cmd_describe(&file, &cli.database_path, cli.output.into(), &options),
        (None, None) => fail("either --crawl or --describe is required"),
    }
}

fn observer(verbose: bool, event_log: Option<&Path>) -> Option<Arc<dyn GatherObserver>> {
    let mut observers: Vec<Arc<dyn GatherObserver>> = Vec::new();
    if verbose {
        observers.push(Arc::new(TracingObserver));
    }
    if let Some(path) = event_log {
        observers.push(Arc::new(FileObserver::new(path)));
    }
    match observers.len() {
        0 => None,
        1 => observers.pop(),
        _ => Some(Arc::new(CompositeObserver::new(observers))),
    }
}

fn cmd_crawl(file: &Path, database: &Path, options: &GatherOptions) -> ExitCode {
    let mut store = match MetadataStore::open(database) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let registry = ExtractorRegistry::default();

    match crawl_file(&registry, &mut store, file, options) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

fn cmd_describe(
    file: &Path,
    database: &Path,
    output: ReportFormat,
    options: &GatherOptions,
) -> ExitCode {
    let store = match MetadataStore::open(database) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let description = match describe_file(&store, file, options) {
        Ok(d) => d,
        Err(e) => return fail(e),
    };

    match render(&description, output) {
        Ok(text) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = %e, "could not render report");
            fail("Unexpected error occurred.")
        }
    }
}

fn fail(message: impl Display) -> ExitCode {
    eprintln!("{message}");
    ExitCode::FAILURE
}

fn absolute_path(raw: &str) -> Result<PathBuf, String> {
    let expanded = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(raw),
        },
        _ => PathBuf::from(raw),
    };
    std::path::absolute(&expanded)
        .map(|path| normalize(&path))
        .map_err(|e| format!("invalid path '{raw}': {e}"))
}

/// Drop `.` and resolve `..` lexically, without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn readable_file(raw: &str) -> Result<PathBuf, String> {
    let path = absolute_path(raw)?;
    match std::fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(_) => Err(format!("The entered path '{raw}' is not readable")),
    }
}
