//! Core data model types for ingestion and expansion.
//!
//! Adapters produce [`Rows`] (either positional cells aligned to a header of [`PathKey`]s, or
//! keyed rows), and the expansion engine turns each row into a nested [`Record`].

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single cell value as produced by an ingestion adapter.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Absent or blank cell. See [`NULL_MARKER`].
    Null,
    /// Text value (delimited-text cells are always text).
    Text(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value (spreadsheet cells only).
    Bool(bool),
}

/// Sentinel written for cells that are absent or blank.
///
/// Distinct from `Cell::Text(String::new())`, which is a present-but-empty value.
pub const NULL_MARKER: Cell = Cell::Null;

impl Cell {
    /// Returns `true` for [`NULL_MARKER`].
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Text content, if this is a text cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content, if this is a number cell.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_owned())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

/// A dot-separated path naming a location inside a [`Record`].
///
/// Any string is a legal path. The empty key is the single segment `""`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathKey(String);

impl PathKey {
    /// Create a path key from any string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Ordered path segments (always at least one).
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PathKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for PathKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<Option<&str>> for PathKey {
    fn from(s: Option<&str>) -> Self {
        Self(s.unwrap_or_default().to_owned())
    }
}

/// Header cells become keys; `Null` normalizes to the empty key.
impl From<&Cell> for PathKey {
    fn from(c: &Cell) -> Self {
        match c {
            Cell::Null => Self::default(),
            Cell::Text(s) => Self(s.clone()),
            Cell::Number(n) => Self(n.to_string()),
            Cell::Bool(b) => Self(b.to_string()),
        }
    }
}

/// A self-describing row: ordered `(key, value)` entries.
///
/// Duplicate keys are allowed; the expansion engine applies them in order (last write wins).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyedRow {
    entries: Vec<(PathKey, Cell)>,
}

impl KeyedRow {
    /// Create an empty keyed row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, keeping insertion order.
    pub fn push(&mut self, key: impl Into<PathKey>, value: impl Into<Cell>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(PathKey, Cell)> {
        self.entries.iter()
    }

    /// Value of the first entry with `key`.
    pub fn get(&self, key: &str) -> Option<&Cell> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<PathKey>, V: Into<Cell>> FromIterator<(K, V)> for KeyedRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for KeyedRow {
    type Item = (PathKey, Cell);
    type IntoIter = std::vec::IntoIter<(PathKey, Cell)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Intermediate row set handed from an adapter to the expansion engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Rows {
    /// A shared header of path keys plus rows of cells aligned to it by index.
    ///
    /// A row may be shorter than the header; missing trailing cells read as [`NULL_MARKER`].
    Positional {
        header: Vec<PathKey>,
        rows: Vec<Vec<Cell>>,
    },
    /// Rows that carry their own keys.
    Keyed(Vec<KeyedRow>),
}

impl Rows {
    /// Build positional rows from a raw table whose first row is the header.
    pub fn from_table(table: Vec<Vec<Cell>>) -> Self {
        let mut iter = table.into_iter();
        let header = iter
            .next()
            .map(|h| h.iter().map(PathKey::from).collect())
            .unwrap_or_default();
        Rows::Positional {
            header,
            rows: iter.collect(),
        }
    }

    /// Number of data rows (the header is not counted).
    pub fn len(&self) -> usize {
        match self {
            Rows::Positional { rows, .. } => rows.len(),
            Rows::Keyed(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A node in a [`Record`]: either a cell or a nested record.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(Cell),
    Nested(Record),
}

impl Value {
    /// The cell, if this is a scalar.
    pub fn as_cell(&self) -> Option<&Cell> {
        match self {
            Value::Scalar(c) => Some(c),
            Value::Nested(_) => None,
        }
    }

    /// The nested record, if this is not a scalar.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Nested(r) => Some(r),
            Value::Scalar(_) => None,
        }
    }
}

/// A nested record produced by expanding one row.
///
/// Keys keep the order in which they were first written.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a direct child by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Look up a value by dot path (e.g. `user.name`).
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next().unwrap_or_default())?;
        for segment in segments {
            current = current.as_record()?.get(segment)?;
        }
        Some(current)
    }

    /// Convenience: the cell at `path`, if the path ends at a scalar.
    pub fn cell_at(&self, path: &str) -> Option<&Cell> {
        self.get_path(path).and_then(Value::as_cell)
    }

    /// Insert or replace a direct child, returning the previous value.
    ///
    /// A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((key, value));
                None
            }
        }
    }

    /// Iterate direct children in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Direct child keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::{Cell, KeyedRow, PathKey, Record, Rows, Value, NULL_MARKER};

    #[test]
    fn path_key_segments_split_on_dots() {
        let key = PathKey::from("user.address.city");
        assert_eq!(key.segments().collect::<Vec<_>>(), vec!["user", "address", "city"]);
    }

    #[test]
    fn empty_and_null_keys_normalize_to_single_empty_segment() {
        assert_eq!(PathKey::from(&NULL_MARKER).segments().collect::<Vec<_>>(), vec![""]);
        assert_eq!(PathKey::from("").segments().collect::<Vec<_>>(), vec![""]);
        assert_eq!(PathKey::from(None::<&str>), PathKey::from(""));
    }

    #[test]
    fn numeric_header_cells_become_plain_keys() {
        assert_eq!(PathKey::from(&Cell::Number(2024.0)).as_str(), "2024");
        assert_eq!(PathKey::from(&Cell::Number(1.5)).as_str(), "1.5");
        assert_eq!(PathKey::from(&Cell::Bool(true)).as_str(), "true");
    }

    #[test]
    fn rows_from_table_uses_first_row_as_header() {
        let rows = Rows::from_table(vec![
            vec![Cell::from("id"), Cell::from("user.name")],
            vec![Cell::from("1"), Cell::from("Ada")],
        ]);
        match rows {
            Rows::Positional { header, rows } => {
                assert_eq!(header, vec![PathKey::from("id"), PathKey::from("user.name")]);
                assert_eq!(rows.len(), 1);
            }
            Rows::Keyed(_) => panic!("expected positional rows"),
        }
    }

    #[test]
    fn rows_from_empty_table_is_empty() {
        let rows = Rows::from_table(Vec::new());
        assert!(rows.is_empty());
    }

    #[test]
    fn keyed_row_preserves_order_and_duplicates() {
        let row: KeyedRow = vec![("b", "1"), ("a", "2"), ("b", "3")].into_iter().collect();
        let keys: Vec<_> = row.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "b"]);
        assert_eq!(row.get("b"), Some(&Cell::from("1")));
    }

    #[test]
    fn record_insert_replaces_in_place() {
        let mut r = Record::new();
        r.insert("a", Value::Scalar(Cell::from("1")));
        r.insert("b", Value::Scalar(Cell::from("2")));
        let prev = r.insert("a", Value::Scalar(Cell::from("3")));
        assert_eq!(prev, Some(Value::Scalar(Cell::from("1"))));
        assert_eq!(r.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(r.cell_at("a"), Some(&Cell::from("3")));
    }

    #[test]
    fn record_serializes_as_json_object() {
        let mut user = Record::new();
        user.insert("name", Value::Scalar(Cell::from("Al")));
        user.insert("age", Value::Scalar(Cell::Number(30.0)));
        user.insert("nick", Value::Scalar(NULL_MARKER));
        let mut r = Record::new();
        r.insert("user", Value::Nested(user));
        r.insert("active", Value::Scalar(Cell::Bool(true)));

        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "user": { "name": "Al", "age": 30.0, "nick": null },
                "active": true
            })
        );
    }
}
