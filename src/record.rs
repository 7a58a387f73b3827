/// Record model for tablepipe
///
/// A Record is a string-keyed map of cell values. Records may nest: a field
/// holding `ColumnValue::Rows` carries child records (the field name is
/// configurable, `"children"` by default), and a field holding
/// `ColumnValue::Object` carries a sub-record addressable by a data-index path.
///
/// # Examples
///
/// ```
/// use tablepipe::{ColumnValue, Record};
///
/// let record = Record::new()
///     .with("key", 1)
///     .with("name", "Alice")
///     .with("age", 32);
///
/// assert_eq!(record.get("name").and_then(|v| v.as_str()), Some("Alice"));
/// assert_eq!(record.get("age"), Some(&ColumnValue::Int(32)));
/// ```

use crate::error::TableError;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Identity of a row, a column, or a filter value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl Key {
    /// Loose equality on the string form, so a selected `"1"` matches a declared `1`.
    pub fn loosely_eq(&self, other: &Key) -> bool {
        match (self, other) {
            (Key::Int(a), Key::Int(b)) => a == b,
            (Key::Str(a), Key::Str(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(v) => write!(f, "{}", v),
            Key::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<i64> for Key {
    fn from(v: i64) -> Self {
        Key::Int(v)
    }
}

impl From<i32> for Key {
    fn from(v: i32) -> Self {
        Key::Int(v as i64)
    }
}

impl From<usize> for Key {
    fn from(v: usize) -> Self {
        Key::Int(v as i64)
    }
}

fn compare_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Cell value enum to support multiple types
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    /// Nested record, reachable through a data-index path
    Object(Record),
    /// Child records of a tree row
    Rows(Vec<Record>),
    Null,
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ColumnValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ColumnValue::Float(v) => Some(*v),
            ColumnValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ColumnValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ColumnValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_rows(&self) -> Option<&[Record]> {
        match self {
            ColumnValue::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// Converts a scalar cell into a key. Nested values and nulls have no key form.
    pub fn to_key(&self) -> Option<Key> {
        match self {
            ColumnValue::Int(v) => Some(Key::Int(*v)),
            ColumnValue::String(s) => Some(Key::Str(s.clone())),
            ColumnValue::Float(v) => Some(Key::Str(v.to_string())),
            ColumnValue::Bool(v) => Some(Key::Str(v.to_string())),
            ColumnValue::Object(_) | ColumnValue::Rows(_) | ColumnValue::Null => None,
        }
    }

    /// Total ordering used by field comparators. NaN sorts after every
    /// number and nulls sort after every value.
    pub fn compare(&self, other: &ColumnValue) -> Ordering {
        match (self, other) {
            (ColumnValue::Null, ColumnValue::Null) => Ordering::Equal,
            (ColumnValue::Null, _) => Ordering::Greater,
            (_, ColumnValue::Null) => Ordering::Less,
            (ColumnValue::Int(a), ColumnValue::Int(b)) => a.cmp(b),
            (ColumnValue::Float(a), ColumnValue::Float(b)) => compare_f64(*a, *b),
            (ColumnValue::Int(a), ColumnValue::Float(b)) => compare_f64(*a as f64, *b),
            (ColumnValue::Float(a), ColumnValue::Int(b)) => compare_f64(*a, *b as f64),
            (ColumnValue::String(a), ColumnValue::String(b)) => a.cmp(b),
            (ColumnValue::Bool(a), ColumnValue::Bool(b)) => a.cmp(b),
            // Mixed types - compare by debug form for deterministic ordering
            (a, b) => format!("{:?}", a).cmp(&format!("{:?}", b)),
        }
    }

    fn from_json(field: &str, value: &JsonValue) -> Result<Self, TableError> {
        Ok(match value {
            JsonValue::Null => ColumnValue::Null,
            JsonValue::Bool(b) => ColumnValue::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => ColumnValue::Int(i),
                None => ColumnValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => ColumnValue::String(s.clone()),
            JsonValue::Object(_) => ColumnValue::Object(Record::from_json(value)?),
            JsonValue::Array(items) => {
                let rows = items
                    .iter()
                    .map(Record::from_json)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| TableError::UnsupportedValue {
                        field: field.to_string(),
                        reason: "arrays may only hold objects".to_string(),
                    })?;
                ColumnValue::Rows(rows)
            }
        })
    }
}

impl From<i64> for ColumnValue {
    fn from(v: i64) -> Self {
        ColumnValue::Int(v)
    }
}

impl From<i32> for ColumnValue {
    fn from(v: i32) -> Self {
        ColumnValue::Int(v as i64)
    }
}

impl From<f64> for ColumnValue {
    fn from(v: f64) -> Self {
        ColumnValue::Float(v)
    }
}

impl From<bool> for ColumnValue {
    fn from(v: bool) -> Self {
        ColumnValue::Bool(v)
    }
}

impl From<&str> for ColumnValue {
    fn from(v: &str) -> Self {
        ColumnValue::String(v.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(v: String) -> Self {
        ColumnValue::String(v)
    }
}

impl From<Record> for ColumnValue {
    fn from(v: Record) -> Self {
        ColumnValue::Object(v)
    }
}

impl From<Vec<Record>> for ColumnValue {
    fn from(v: Vec<Record>) -> Self {
        ColumnValue::Rows(v)
    }
}

impl Serialize for ColumnValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ColumnValue::Int(v) => serializer.serialize_i64(*v),
            ColumnValue::Float(v) => serializer.serialize_f64(*v),
            ColumnValue::String(s) => serializer.serialize_str(s),
            ColumnValue::Bool(b) => serializer.serialize_bool(*b),
            ColumnValue::Object(record) => record.serialize(serializer),
            ColumnValue::Rows(rows) => {
                let mut seq = serializer.serialize_seq(Some(rows.len()))?;
                for row in rows {
                    seq.serialize_element(row)?;
                }
                seq.end()
            }
            ColumnValue::Null => serializer.serialize_unit(),
        }
    }
}

/// A single row: field name to cell value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: HashMap<String, ColumnValue>,
}

impl Record {
    pub fn new() -> Self {
        Record {
            values: HashMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<ColumnValue>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&ColumnValue> {
        self.values.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Resolves a data-index path through nested objects.
    pub fn get_path(&self, path: &[String]) -> Option<&ColumnValue> {
        let (first, rest) = path.split_first()?;
        let mut value = self.values.get(first)?;
        for segment in rest {
            match value {
                ColumnValue::Object(inner) => value = inner.values.get(segment)?,
                _ => return None,
            }
        }
        Some(value)
    }

    /// Child rows stored under `children_field`, if the field holds rows.
    pub fn children(&self, children_field: &str) -> Option<&[Record]> {
        self.values.get(children_field).and_then(ColumnValue::as_rows)
    }

    /// Copy of this record with its children replaced.
    pub fn with_children(&self, children_field: &str, children: Vec<Record>) -> Record {
        let mut record = self.clone();
        record
            .values
            .insert(children_field.to_string(), ColumnValue::Rows(children));
        record
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &ColumnValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse a JSON object into a record.
    pub fn from_json(value: &JsonValue) -> Result<Record, TableError> {
        let obj = value.as_object().ok_or(TableError::NotAnObject)?;
        let mut values = HashMap::with_capacity(obj.len());
        for (field, v) in obj {
            values.insert(field.clone(), ColumnValue::from_json(field, v)?);
        }
        Ok(Record { values })
    }

    /// Parse a JSON array of objects into records.
    pub fn list_from_json(json: &str) -> Result<Vec<Record>, TableError> {
        let parsed: JsonValue = serde_json::from_str(json)?;
        let items = parsed.as_array().ok_or(TableError::NotAnArray)?;
        items.iter().map(Record::from_json).collect()
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Sorted field order keeps snapshots deterministic.
        let mut fields: Vec<_> = self.values.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (k, v) in fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
