//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`process_file`] (from [`unified`]) which:
//!
//! - picks the adapter from the file name (or you can override via [`IngestionOptions`])
//! - expands every row into a nested [`crate::types::Record`]
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific functions are also available under:
//! - [`delimited`]
//! - `spreadsheet` (Cargo feature `excel`)

pub mod delimited;
pub mod observability;
pub mod source;
#[cfg(feature = "excel")]
pub mod spreadsheet;
pub mod unified;

pub use delimited::DelimitedOptions;
pub use observability::{
    CompositeObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats, TracingObserver,
};
pub use source::{FileSource, InMemoryFile, PathFile};
pub use unified::{
    ingest_from_path, process_csv_file, process_file, IngestionFormat, IngestionOptions, IngestionRequest,
    SPREADSHEET_EXTENSION,
};
