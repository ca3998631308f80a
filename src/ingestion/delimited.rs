//! Delimited-text (CSV-like) ingestion.
//!
//! Tokenizing is done by the `csv` crate. The first tokenized row is the header of path keys; the
//! remaining rows are passed to the expansion engine unchanged (every cell is text).

use std::io::Read;

use serde::Deserialize;
use tracing::debug;

use crate::error::{IngestionError, IngestionResult};
use crate::expansion::expand;
use crate::types::{Cell, KeyedRow, PathKey, Record, Rows, NULL_MARKER};

use super::source::FileSource;

/// Tokenizer configuration for delimited text.
///
/// Override individual fields and keep the rest at their defaults:
///
/// ```rust
/// use rust_nested_records::ingestion::DelimitedOptions;
///
/// let opts = DelimitedOptions {
///     delimiter: ';',
///     ..Default::default()
/// };
/// assert!(opts.skip_empty_lines);
/// ```
///
/// Deserializing a partial configuration behaves the same way: absent fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DelimitedOptions {
    /// Field separator. Default `,`.
    pub delimiter: char,
    /// Drop blank lines. Default `true`.
    ///
    /// Only lines that tokenize to a single empty field are dropped; a delimiter-only line such
    /// as `,,` is still a record of empty fields. With `false`, every blank line becomes a row
    /// holding one empty cell.
    pub skip_empty_lines: bool,
    /// Quote character. Default `"`.
    pub quote: char,
    /// Escape character inside quoted fields. Default none (quotes are escaped by doubling).
    pub escape: Option<char>,
    /// Whether `""` inside a quoted field is an escaped quote. Default `true`.
    pub double_quote: bool,
    /// Lines starting with this character are ignored. Default none.
    pub comment: Option<char>,
    /// Trim surrounding whitespace from every field. Default `false`.
    pub trim: bool,
    /// Produce keyed rows (first row names the keys) instead of positional rows. Default `false`.
    pub keyed_rows: bool,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            skip_empty_lines: true,
            quote: '"',
            escape: None,
            double_quote: true,
            comment: None,
            trim: false,
            keyed_rows: false,
        }
    }
}

impl DelimitedOptions {
    /// Build a `csv` reader configuration from these options.
    ///
    /// Headers are not consumed by the reader: the first row is handled by the adapter.
    pub fn reader_builder(&self) -> IngestionResult<csv::ReaderBuilder> {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(ascii_byte("delimiter", self.delimiter)?)
            .quote(ascii_byte("quote", self.quote)?)
            .double_quote(self.double_quote)
            .escape(self.escape.map(|c| ascii_byte("escape", c)).transpose()?)
            .comment(self.comment.map(|c| ascii_byte("comment", c)).transpose()?)
            .trim(if self.trim { csv::Trim::All } else { csv::Trim::None });
        Ok(builder)
    }
}

fn ascii_byte(option: &str, c: char) -> IngestionResult<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(IngestionError::InvalidOptions {
            message: format!("{option} must be an ASCII character (got {c:?})"),
        })
    }
}

/// Read `file` and expand its rows into records.
pub fn ingest_delimited(file: &dyn FileSource, options: &DelimitedOptions) -> IngestionResult<Vec<Record>> {
    Ok(expand(get_rows(file, options)?))
}

/// Read and tokenize `file` into intermediate rows.
///
/// Bytes are decoded as UTF-8 (invalid sequences are replaced) and a leading byte-order mark is
/// dropped.
pub fn get_rows(file: &dyn FileSource, options: &DelimitedOptions) -> IngestionResult<Rows> {
    let bytes = file.read_bytes()?;
    let text = String::from_utf8_lossy(&bytes);
    get_rows_from_str(&text, options)
}

/// Tokenize in-memory text into intermediate rows.
pub fn get_rows_from_str(input: &str, options: &DelimitedOptions) -> IngestionResult<Rows> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let builder = options.reader_builder()?;
    if options.skip_empty_lines {
        get_rows_from_reader(&mut builder.from_reader(input.as_bytes()), options)
    } else {
        let marked = mark_blank_lines(input, options);
        get_rows_from_reader(&mut builder.from_reader(marked.as_bytes()), options)
    }
}

/// Tokenize from an existing reader.
///
/// The reader should be built with [`DelimitedOptions::reader_builder`] (or at least with
/// `has_headers(false)`), otherwise the header row is swallowed by the reader.
///
/// The `csv` reader never yields blank lines, so with `skip_empty_lines = false` they only
/// survive when tokenizing through [`get_rows`] or [`get_rows_from_str`].
pub fn get_rows_from_reader<R: Read>(
    rdr: &mut csv::Reader<R>,
    options: &DelimitedOptions,
) -> IngestionResult<Rows> {
    let mut table: Vec<Vec<Cell>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if options.skip_empty_lines && record.len() == 1 && record[0].is_empty() {
            continue;
        }
        table.push(record.iter().map(Cell::from).collect());
    }
    debug!(rows = table.len(), keyed = options.keyed_rows, "tokenized delimited text");

    if options.keyed_rows {
        Ok(keyed_from_table(table))
    } else {
        Ok(Rows::from_table(table))
    }
}

/// Rewrite every blank line outside a quoted field as an empty quoted field, which the `csv`
/// reader then yields as a record of one empty field.
fn mark_blank_lines(input: &str, options: &DelimitedOptions) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_quotes = false;
    for line in input.split_inclusive('\n') {
        let content = line.trim_end_matches(['\r', '\n']);
        if in_quotes {
            in_quotes = ends_inside_quotes(content, true, options);
        } else if content.is_empty() {
            out.push(options.quote);
            out.push(options.quote);
        } else if options.comment.is_none_or(|c| !content.starts_with(c)) {
            in_quotes = ends_inside_quotes(content, false, options);
        }
        out.push_str(line);
    }
    out
}

/// Scan one line, starting inside a quoted field when `in_quotes` is set, and report whether it
/// ends inside one. Quotes open a field only at its start, as in the `csv` tokenizer.
fn ends_inside_quotes(line: &str, mut in_quotes: bool, options: &DelimitedOptions) -> bool {
    let mut field_start = !in_quotes;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if Some(c) == options.escape {
                chars.next();
            } else if c == options.quote {
                if options.double_quote && chars.peek() == Some(&options.quote) {
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
        } else if c == options.quote && field_start {
            in_quotes = true;
            field_start = false;
        } else {
            field_start = c == options.delimiter;
        }
    }
    in_quotes
}

fn keyed_from_table(table: Vec<Vec<Cell>>) -> Rows {
    let mut iter = table.into_iter();
    let header: Vec<PathKey> = iter
        .next()
        .map(|h| h.iter().map(PathKey::from).collect())
        .unwrap_or_default();

    let rows = iter
        .map(|row| {
            let mut cells = row.into_iter();
            header
                .iter()
                .map(|key| (key.clone(), cells.next().unwrap_or(NULL_MARKER)))
                .collect::<KeyedRow>()
        })
        .collect();
    Rows::Keyed(rows)
}
