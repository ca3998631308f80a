#![cfg(feature = "excel")]

//! Spreadsheet (`.xlsx`) ingestion.
//!
//! Only the first sheet is read. Its first row names the keys; every later row becomes a
//! [`KeyedRow`] holding one entry per header column.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use tracing::debug;

use crate::error::{IngestionError, IngestionResult};
use crate::expansion::expand;
use crate::types::{Cell, KeyedRow, PathKey, Record, Rows, NULL_MARKER};

use super::source::FileSource;

/// Header name given to columns whose header cell is empty.
pub const EMPTY_HEADER: &str = "__EMPTY";

/// Read the first sheet of `file` and expand its rows into records.
pub fn process_spreadsheet(file: &dyn FileSource) -> IngestionResult<Vec<Record>> {
    Ok(expand(get_rows(file)?))
}

/// Read the first sheet of `file` into keyed rows.
///
/// Behavior:
/// - Rows whose cells are all empty are dropped
/// - Empty cells are kept as [`NULL_MARKER`] so every header column shows up in every row
/// - Empty header cells are named [`EMPTY_HEADER`]; repeated names get `_1`, `_2`, ... suffixes
pub fn get_rows(file: &dyn FileSource) -> IngestionResult<Rows> {
    let bytes = file.read_bytes()?;
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook.worksheet_range_at(0).ok_or(IngestionError::NoSheets)??;
    Ok(sheet_rows(&range))
}

/// Convert a decoded sheet range into keyed rows.
pub fn sheet_rows(range: &Range<Data>) -> Rows {
    let mut iter = range.rows();
    let header = match iter.next() {
        Some(row) => header_keys(row),
        None => return Rows::Keyed(Vec::new()),
    };

    let mut dropped = 0usize;
    let rows: Vec<KeyedRow> = iter
        .filter(|row| {
            let blank = row.iter().all(|c| matches!(c, Data::Empty));
            if blank {
                dropped += 1;
            }
            !blank
        })
        .map(|row| {
            header
                .iter()
                .enumerate()
                .map(|(idx, key)| {
                    let cell = row.get(idx).map(convert_cell).unwrap_or(NULL_MARKER);
                    (key.clone(), cell)
                })
                .collect()
        })
        .collect();

    debug!(rows = rows.len(), blank_rows_dropped = dropped, columns = header.len(), "read sheet");
    Rows::Keyed(rows)
}

fn header_keys(row: &[Data]) -> Vec<PathKey> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    row.iter()
        .map(|c| {
            let base = match c {
                Data::Empty => EMPTY_HEADER.to_string(),
                other => PathKey::from(&convert_cell(other)).as_str().to_string(),
            };
            PathKey::from(dedupe_header(&mut seen, base))
        })
        .collect()
}

fn dedupe_header(seen: &mut HashMap<String, usize>, base: String) -> String {
    let counter = seen.get(&base).copied().unwrap_or(0);
    if counter == 0 {
        seen.insert(base.clone(), 1);
        return base;
    }

    let mut counter = counter;
    let mut candidate = format!("{base}_{counter}");
    counter += 1;
    while seen.contains_key(&candidate) {
        candidate = format!("{base}_{counter}");
        counter += 1;
    }
    seen.insert(base, counter);
    seen.insert(candidate.clone(), 1);
    candidate
}

fn convert_cell(c: &Data) -> Cell {
    match c {
        Data::Empty => NULL_MARKER,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        // Serial date number, the same value the workbook stores.
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}
