//! Unified ingestion entrypoint.
//!
//! Most callers should use [`process_file`] (or [`ingest_from_path`] for files on disk), which
//! routes a file to the right adapter and expands its rows into [`crate::types::Record`]s.
//!
//! - If [`IngestionOptions::format`] is `None`, the format is chosen from the file name: names
//!   ending in [`SPREADSHEET_EXTENSION`] are spreadsheets, everything else is delimited text.
//! - If an [`super::observability::IngestionObserver`] is provided, success/failure/alerts are
//!   reported to it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::error::IngestionResult;
use crate::types::Record;

use super::delimited::{self, DelimitedOptions};
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::source::{FileSource, PathFile};

/// File name suffix routed to the spreadsheet adapter (case-sensitive).
pub const SPREADSHEET_EXTENSION: &str = ".xlsx";

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Delimited text (CSV, TSV, ...).
    Delimited,
    /// Spreadsheet workbook (feature-gated behind `excel`).
    Spreadsheet,
}

impl IngestionFormat {
    /// Choose a format from a file name.
    ///
    /// Only an exact [`SPREADSHEET_EXTENSION`] suffix selects [`Self::Spreadsheet`]; any other
    /// name (including `.XLSX`) is treated as delimited text.
    pub fn from_name(name: &str) -> Self {
        if name.ends_with(SPREADSHEET_EXTENSION) {
            Self::Spreadsheet
        } else {
            Self::Delimited
        }
    }
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, detect the format from the file name.
    pub format: Option<IngestionFormat>,
    /// Tokenizer options for delimited text. Ignored for spreadsheets.
    pub delimited: DelimitedOptions,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("delimited", &self.delimited)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            delimited: DelimitedOptions::default(),
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Route `file` to the matching adapter and expand its rows into records.
///
/// Returns `Ok(None)` when no file is given; this is not an error and observers are not called.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with the record count
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```rust
/// use rust_nested_records::ingestion::{process_file, FileSource, InMemoryFile, IngestionOptions};
/// use rust_nested_records::types::Cell;
///
/// # fn main() -> Result<(), rust_nested_records::IngestionError> {
/// let upload = InMemoryFile::new("people.csv", "id,user.name\n1,Ada\n");
/// let file: &dyn FileSource = &upload;
///
/// let records = process_file(Some(file), &IngestionOptions::default())?.unwrap_or_default();
/// assert_eq!(records[0].cell_at("user.name"), Some(&Cell::from("Ada")));
///
/// // No file: nothing to do.
/// assert!(process_file(None, &IngestionOptions::default())?.is_none());
/// # Ok(())
/// # }
/// ```
///
/// ## Semicolon-separated text
///
/// ```no_run
/// use rust_nested_records::ingestion::{ingest_from_path, DelimitedOptions, IngestionOptions};
///
/// # fn main() -> Result<(), rust_nested_records::IngestionError> {
/// let opts = IngestionOptions {
///     delimited: DelimitedOptions {
///         delimiter: ';',
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// let records = ingest_from_path("export.csv", &opts)?;
/// println!("records={}", records.len());
/// # Ok(())
/// # }
/// ```
pub fn process_file(
    file: Option<&dyn FileSource>,
    options: &IngestionOptions,
) -> IngestionResult<Option<Vec<Record>>> {
    let Some(file) = file else {
        debug!("no file given, nothing to ingest");
        return Ok(None);
    };

    let fmt = options
        .format
        .unwrap_or_else(|| IngestionFormat::from_name(file.name()));
    let ctx = IngestionContext {
        name: file.name().to_string(),
        format: fmt,
    };
    debug!(file = %ctx.name, format = ?fmt, "routing file");

    let result = match fmt {
        IngestionFormat::Delimited => delimited::ingest_delimited(file, &options.delimited),
        IngestionFormat::Spreadsheet => ingest_spreadsheet_dispatch(file),
    };

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(records) => obs.on_success(
                &ctx,
                IngestionStats {
                    records: records.len(),
                },
            ),
            Err(e) => {
                let sev = IngestionSeverity::for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result.map(Some)
}

/// Ingest `file` as delimited text regardless of its name.
///
/// Returns `Ok(None)` when no file is given.
pub fn process_csv_file(
    file: Option<&dyn FileSource>,
    options: &DelimitedOptions,
) -> IngestionResult<Option<Vec<Record>>> {
    match file {
        Some(file) => delimited::ingest_delimited(file, options).map(Some),
        None => Ok(None),
    }
}

/// Ingest a file on disk, routing by its file name.
pub fn ingest_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<Vec<Record>> {
    let file = PathFile::new(path);
    let file: &dyn FileSource = &file;
    process_file(Some(file), options).map(Option::unwrap_or_default)
}

fn ingest_spreadsheet_dispatch(file: &dyn FileSource) -> IngestionResult<Vec<Record>> {
    #[cfg(feature = "excel")]
    {
        super::spreadsheet::process_spreadsheet(file)
    }

    #[cfg(not(feature = "excel"))]
    {
        let _ = file;
        Err(crate::error::IngestionError::FormatUnavailable {
            message: "spreadsheet ingestion not enabled (enable cargo feature 'excel')".to_string(),
        })
    }
}

/// Convenience helper for callers that want an owned request object.
///
/// This can be useful if you want to enqueue ingestion work in a job system.
#[derive(Clone)]
pub struct IngestionRequest {
    /// Path to the input file.
    pub path: PathBuf,
    /// Options controlling ingestion.
    pub options: IngestionOptions,
}

impl fmt::Debug for IngestionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionRequest")
            .field("path", &self.path)
            .field("options", &self.options)
            .finish()
    }
}

impl IngestionRequest {
    /// Execute the request by calling [`ingest_from_path`].
    pub fn run(&self) -> IngestionResult<Vec<Record>> {
        ingest_from_path(&self.path, &self.options)
    }
}
