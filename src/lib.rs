//! `rust-nested-records` ingests delimited-text and spreadsheet files and turns every row into a
//! nested [`types::Record`].
//!
//! Column headers are read as dot-separated paths: a `user.name` column ends up as
//! `{ "user": { "name": ... } }` in the record.
//!
//! The primary entrypoint is [`ingestion::process_file`], which picks the adapter from the file
//! name (or you can force a format via [`ingestion::IngestionOptions`]).
//!
//! ## What you can ingest
//!
//! - **Delimited text**: any file not ending in `.xlsx`. Delimiter, quoting, comments and
//!   empty-line handling are configured through [`ingestion::DelimitedOptions`].
//! - **Spreadsheets** (requires the Cargo feature `excel`, enabled by default): `.xlsx`. Only
//!   the first sheet is read.
//!
//! Cells are never coerced: delimited text always yields [`types::Cell::Text`], spreadsheets
//! yield the type the workbook stores. Blank spreadsheet cells and cells missing from short rows
//! become [`types::NULL_MARKER`].
//!
//! ## Quick example
//!
//! ```rust
//! use rust_nested_records::expansion::records_to_json;
//! use rust_nested_records::ingestion::{process_file, FileSource, InMemoryFile, IngestionOptions};
//!
//! # fn main() -> Result<(), rust_nested_records::IngestionError> {
//! let upload = InMemoryFile::new("people.csv", "id,user.name,user.age\n1,Ada,36\n");
//! let file: &dyn FileSource = &upload;
//! let records = process_file(Some(file), &IngestionOptions::default())?.unwrap_or_default();
//!
//! assert_eq!(
//!     records_to_json(&records),
//!     serde_json::json!([{ "id": "1", "user": { "name": "Ada", "age": "36" } }])
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: routing, format adapters, observers
//! - [`expansion`]: path expansion of rows into records
//! - [`types`]: cells, path keys, intermediate rows and records
//! - [`error`]: error types used across ingestion

pub mod error;
pub mod expansion;
pub mod ingestion;
pub mod types;

pub use error::{ErrorKind, IngestionError, IngestionResult};
