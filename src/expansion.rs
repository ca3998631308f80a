//! Path expansion: turns intermediate [`Rows`] into nested [`Record`]s.
//!
//! Every key is read as a dot-separated path and the row's value is written at that path inside a
//! record that starts out empty for each row.
//!
//! ## Write rules
//!
//! - Keys are applied in order: header order for positional rows, insertion order for keyed rows.
//! - Writing a path that was already written replaces the old value (last write wins). The key
//!   keeps its original position in the record.
//! - Missing intermediate segments are created as empty nested records.
//! - An intermediate segment that currently holds a scalar is replaced by a fresh nested record
//!   (keys `a` then `a.b` produce `{ "a": { "b": .. } }`).
//! - Writing a scalar where a nested record lives replaces the whole nested record.
//!
//! ```rust
//! use rust_nested_records::expansion::expand;
//! use rust_nested_records::types::{Cell, Rows};
//!
//! let rows = Rows::from_table(vec![
//!     vec![Cell::from("user.name"), Cell::from("user.age")],
//!     vec![Cell::from("Al"), Cell::Number(30.0)],
//! ]);
//! let records = expand(rows);
//! assert_eq!(records[0].cell_at("user.name"), Some(&Cell::from("Al")));
//! assert_eq!(records[0].cell_at("user.age"), Some(&Cell::Number(30.0)));
//! ```

use serde_json::Value as JsonValue;

use crate::types::{Cell, KeyedRow, PathKey, Record, Rows, Value, NULL_MARKER};

/// Expand every row into a record.
pub fn expand(rows: Rows) -> Vec<Record> {
    match rows {
        Rows::Positional { header, rows } => expand_positional(&header, rows),
        Rows::Keyed(rows) => expand_keyed(rows),
    }
}

/// Expand positional rows against a shared header.
///
/// Cells beyond the header length are ignored; a short row reads [`NULL_MARKER`] for the
/// missing trailing cells.
pub fn expand_positional(header: &[PathKey], rows: Vec<Vec<Cell>>) -> Vec<Record> {
    rows.into_iter()
        .map(|row| {
            let mut cells = row.into_iter();
            header.iter().fold(Record::new(), |record, key| {
                let cell = cells.next().unwrap_or(NULL_MARKER);
                set_path(record, key, cell)
            })
        })
        .collect()
}

/// Expand rows that carry their own keys.
pub fn expand_keyed(rows: Vec<KeyedRow>) -> Vec<Record> {
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .fold(Record::new(), |record, (key, cell)| set_path(record, &key, cell))
        })
        .collect()
}

/// Write `cell` at `key` inside `record`, returning the updated root.
pub fn set_path(record: Record, key: &PathKey, cell: Cell) -> Record {
    let segments: Vec<&str> = key.segments().collect();
    write_segments(record, &segments, cell)
}

fn write_segments(mut node: Record, segments: &[&str], cell: Cell) -> Record {
    match segments {
        [] => node,
        [last] => {
            node.insert(*last, Value::Scalar(cell));
            node
        }
        [head, rest @ ..] => {
            // Take the child out so it can be rebuilt by value; scalars are discarded.
            let child = match node.get_mut(head) {
                Some(slot) => match std::mem::replace(slot, Value::Nested(Record::new())) {
                    Value::Nested(child) => child,
                    Value::Scalar(_) => Record::new(),
                },
                None => Record::new(),
            };
            let child = write_segments(child, rest, cell);
            node.insert(*head, Value::Nested(child));
            node
        }
    }
}

/// Render records as a JSON array.
pub fn records_to_json(records: &[Record]) -> JsonValue {
    // Serializing `Record` cannot fail: keys are strings and cells map to JSON scalars.
    serde_json::to_value(records).unwrap_or(JsonValue::Null)
}

#[cfg(test)]
mod tests {
    use super::{expand, expand_keyed, expand_positional, records_to_json, set_path};
    use crate::types::{Cell, KeyedRow, PathKey, Record, Rows, Value, NULL_MARKER};

    fn keys(names: &[&str]) -> Vec<PathKey> {
        names.iter().map(|n| PathKey::from(*n)).collect()
    }

    #[test]
    fn nested_paths_share_a_parent() {
        let records = expand_positional(
            &keys(&["user.name", "user.age"]),
            vec![vec![Cell::from("Al"), Cell::Number(30.0)]],
        );
        assert_eq!(records.len(), 1);
        assert_eq!(
            records_to_json(&records),
            serde_json::json!([{ "user": { "name": "Al", "age": 30.0 } }])
        );
    }

    #[test]
    fn short_rows_fill_missing_cells_with_null_marker() {
        let header = keys(&["a", "b.c", "d"]);
        let records = expand_positional(&header, vec![vec![Cell::from("1")]]);
        let r = &records[0];
        assert_eq!(r.cell_at("a"), Some(&Cell::from("1")));
        assert_eq!(r.cell_at("b.c"), Some(&NULL_MARKER));
        assert_eq!(r.cell_at("d"), Some(&NULL_MARKER));
    }

    #[test]
    fn extra_cells_past_header_are_ignored() {
        let records = expand_positional(
            &keys(&["a"]),
            vec![vec![Cell::from("1"), Cell::from("2")]],
        );
        assert_eq!(records[0].len(), 1);
    }

    #[test]
    fn all_blank_row_still_produces_record() {
        let records = expand_positional(&keys(&["a", "b"]), vec![vec![]]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cell_at("a"), Some(&NULL_MARKER));
        assert_eq!(records[0].cell_at("b"), Some(&NULL_MARKER));
    }

    #[test]
    fn duplicate_header_keys_last_write_wins() {
        let records = expand_positional(
            &keys(&["a", "a"]),
            vec![vec![Cell::Number(1.0), Cell::Number(2.0)]],
        );
        assert_eq!(records[0].cell_at("a"), Some(&Cell::Number(2.0)));
        assert_eq!(records[0].len(), 1);
    }

    #[test]
    fn duplicate_keyed_entries_last_write_wins() {
        let row: KeyedRow = vec![("x.y", "first"), ("x.y", "second")].into_iter().collect();
        let records = expand_keyed(vec![row]);
        assert_eq!(records[0].cell_at("x.y"), Some(&Cell::from("second")));
    }

    #[test]
    fn keyed_form_matches_positional_form() {
        let keyed: KeyedRow = vec![("user.name", "Al")].into_iter().collect();
        let from_keyed = expand(Rows::Keyed(vec![keyed]));
        let from_positional = expand_positional(&keys(&["user.name"]), vec![vec![Cell::from("Al")]]);
        assert_eq!(from_keyed, from_positional);
    }

    #[test]
    fn empty_and_null_header_keys_write_under_empty_key() {
        let rows = Rows::from_table(vec![
            vec![NULL_MARKER, Cell::from("b")],
            vec![Cell::from("v1"), Cell::from("v2")],
        ]);
        let records = expand(rows);
        assert_eq!(records[0].get(""), Some(&Value::Scalar(Cell::from("v1"))));

        let records = expand_positional(&keys(&[""]), vec![vec![Cell::from("v")]]);
        assert_eq!(records[0].keys().collect::<Vec<_>>(), vec![""]);
    }

    #[test]
    fn writing_same_pair_twice_is_idempotent() {
        let key = PathKey::from("a.b");
        let once = set_path(Record::new(), &key, Cell::from("v"));
        let twice = set_path(once.clone(), &key, Cell::from("v"));
        assert_eq!(once, twice);
    }

    #[test]
    fn scalar_intermediate_is_replaced_by_nested_record() {
        let r = set_path(Record::new(), &PathKey::from("a"), Cell::from("scalar"));
        let r = set_path(r, &PathKey::from("a.b"), Cell::from("nested"));
        assert_eq!(records_to_json(&[r]), serde_json::json!([{ "a": { "b": "nested" } }]));
    }

    #[test]
    fn scalar_write_replaces_nested_record() {
        let r = set_path(Record::new(), &PathKey::from("a.b"), Cell::from("nested"));
        let r = set_path(r, &PathKey::from("a"), Cell::from("scalar"));
        assert_eq!(r.cell_at("a"), Some(&Cell::from("scalar")));
    }

    #[test]
    fn sibling_paths_are_preserved() {
        let r = set_path(Record::new(), &PathKey::from("a.b"), Cell::from("1"));
        let r = set_path(r, &PathKey::from("a.c.d"), Cell::from("2"));
        let r = set_path(r, &PathKey::from("a.c.e"), Cell::from("3"));
        assert_eq!(
            records_to_json(&[r]),
            serde_json::json!([{ "a": { "b": "1", "c": { "d": "2", "e": "3" } } }])
        );
    }

    #[test]
    fn overwritten_key_keeps_first_position() {
        let r = set_path(Record::new(), &PathKey::from("a"), Cell::from("1"));
        let r = set_path(r, &PathKey::from("b"), Cell::from("2"));
        let r = set_path(r, &PathKey::from("a"), Cell::from("3"));
        assert_eq!(r.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn empty_segments_are_legal() {
        let r = set_path(Record::new(), &PathKey::from("a..b"), Cell::from("v"));
        let inner = r.get("a").and_then(Value::as_record).and_then(|r| r.get(""));
        assert!(inner.and_then(Value::as_record).is_some());
        assert_eq!(r.cell_at("a..b"), Some(&Cell::from("v")));
    }

    #[test]
    fn records_do_not_share_structure() {
        let mut records = expand_positional(
            &keys(&["a.b"]),
            vec![vec![Cell::from("1")], vec![Cell::from("2")]],
        );
        let second = records.pop().unwrap();
        assert_eq!(records[0].cell_at("a.b"), Some(&Cell::from("1")));
        assert_eq!(second.cell_at("a.b"), Some(&Cell::from("2")));
    }

    #[test]
    fn header_only_table_yields_no_records() {
        let rows = Rows::from_table(vec![vec![Cell::from("a")]]);
        assert!(expand(rows).is_empty());
    }
}
