/// Keyed lookup over a (possibly nested) record set.
///
/// The index maps every row key, nested rows included, to the position of
/// its record. It is built lazily on the first lookup and reused for as long
/// as the data, the row-key source and the children field stay the same
/// (compared by identity), so re-renders that don't touch selection never pay
/// for a rebuild.

use crate::diagnostics::{Diagnostics, Warning};
use crate::record::{ColumnValue, Key, Record};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Derives a record's key from the record and its index among its siblings.
pub type RowKeyFn = Rc<dyn Fn(&Record, usize) -> Key>;

/// Where a record's key comes from.
#[derive(Clone)]
pub enum RowKey {
    /// Read a field; a missing field falls back to the sibling index
    Field(String),
    Func(RowKeyFn),
}

impl Default for RowKey {
    fn default() -> Self {
        RowKey::Field("key".to_string())
    }
}

impl fmt::Debug for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Field(name) => write!(f, "Field({:?})", name),
            RowKey::Func(_) => f.write_str("Func"),
        }
    }
}

impl RowKey {
    pub fn field(name: impl Into<String>) -> Self {
        RowKey::Field(name.into())
    }

    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Record, usize) -> Key + 'static,
    {
        RowKey::Func(Rc::new(f))
    }

    pub fn key_of(&self, record: &Record, index: usize, diagnostics: &Diagnostics) -> Key {
        match self {
            RowKey::Field(name) => match record.get(name).and_then(ColumnValue::to_key) {
                Some(key) => key,
                None => {
                    diagnostics.warn(Warning::MissingRowKey {
                        field: name.clone(),
                        index,
                    });
                    Key::Int(index as i64)
                }
            },
            RowKey::Func(f) => f(record, index),
        }
    }

    /// Identity comparison: same field name, or the very same function.
    pub fn same(&self, other: &RowKey) -> bool {
        match (self, other) {
            (RowKey::Field(a), RowKey::Field(b)) => a == b,
            (RowKey::Func(a), RowKey::Func(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A record flattened out of the tree, with its key and position.
#[derive(Debug, Clone)]
pub struct KeyedRow {
    pub key: Key,
    pub record: Record,
    pub depth: usize,
    pub parent: Option<Key>,
}

/// Depth-first flattening of `records` with their keys, parents first.
pub fn flatten_keyed(
    records: &[Record],
    row_key: &RowKey,
    children_field: &str,
    diagnostics: &Diagnostics,
) -> Vec<KeyedRow> {
    let mut out = Vec::new();
    flatten_into(records, row_key, children_field, diagnostics, None, &mut out);
    out
}

fn flatten_into(
    records: &[Record],
    row_key: &RowKey,
    children_field: &str,
    diagnostics: &Diagnostics,
    parent: Option<(&Key, usize)>,
    out: &mut Vec<KeyedRow>,
) {
    for (index, record) in records.iter().enumerate() {
        let key = row_key.key_of(record, index, diagnostics);
        let depth = parent.map_or(0, |(_, depth)| depth + 1);
        out.push(KeyedRow {
            key: key.clone(),
            record: record.clone(),
            depth,
            parent: parent.map(|(key, _)| key.clone()),
        });
        if let Some(children) = record.children(children_field) {
            flatten_into(children, row_key, children_field, diagnostics, Some((&key, depth)), out);
        }
    }
}

struct BuiltIndex {
    data: Rc<Vec<Record>>,
    row_key: RowKey,
    children_field: String,
    paths: HashMap<Key, Vec<usize>>,
}

impl BuiltIndex {
    fn matches(&self, data: &Rc<Vec<Record>>, row_key: &RowKey, children_field: &str) -> bool {
        Rc::ptr_eq(&self.data, data) && self.row_key.same(row_key) && self.children_field == children_field
    }
}

/// Lazily built `key -> record` map.
#[derive(Default)]
pub struct KeyedLookupIndex {
    built: RefCell<Option<BuiltIndex>>,
    builds: Cell<usize>,
}

impl fmt::Debug for KeyedLookupIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedLookupIndex")
            .field("built", &self.built.borrow().is_some())
            .field("builds", &self.builds.get())
            .finish()
    }
}

impl KeyedLookupIndex {
    pub fn new() -> Self {
        KeyedLookupIndex::default()
    }

    /// Number of times the map has been (re)built.
    pub fn build_count(&self) -> usize {
        self.builds.get()
    }

    /// Drops the map; the next lookup rebuilds it.
    pub fn invalidate(&self) {
        self.built.replace(None);
    }

    /// Resolves `key` against `data`, building the map first if the inputs changed.
    pub fn get_by_key<'a>(
        &self,
        data: &'a Rc<Vec<Record>>,
        row_key: &RowKey,
        children_field: &str,
        key: &Key,
        diagnostics: &Diagnostics,
    ) -> Option<&'a Record> {
        self.ensure(data, row_key, children_field, diagnostics);
        let path = self.built.borrow().as_ref()?.paths.get(key).cloned()?;
        resolve(data, &path, children_field)
    }

    pub fn contains(
        &self,
        data: &Rc<Vec<Record>>,
        row_key: &RowKey,
        children_field: &str,
        key: &Key,
        diagnostics: &Diagnostics,
    ) -> bool {
        self.get_by_key(data, row_key, children_field, key, diagnostics)
            .is_some()
    }

    fn ensure(&self, data: &Rc<Vec<Record>>, row_key: &RowKey, children_field: &str, diagnostics: &Diagnostics) {
        let fresh = self
            .built
            .borrow()
            .as_ref()
            .map_or(false, |built| built.matches(data, row_key, children_field));
        if fresh {
            return;
        }

        let mut paths = HashMap::new();
        let mut prefix = Vec::new();
        index_level(data, row_key, children_field, diagnostics, &mut prefix, &mut paths);
        log::debug!("built row key index over {} record(s)", paths.len());

        self.builds.set(self.builds.get() + 1);
        self.built.replace(Some(BuiltIndex {
            data: Rc::clone(data),
            row_key: row_key.clone(),
            children_field: children_field.to_string(),
            paths,
        }));
    }
}

fn index_level(
    records: &[Record],
    row_key: &RowKey,
    children_field: &str,
    diagnostics: &Diagnostics,
    prefix: &mut Vec<usize>,
    paths: &mut HashMap<Key, Vec<usize>>,
) {
    for (index, record) in records.iter().enumerate() {
        prefix.push(index);
        let key = row_key.key_of(record, index, diagnostics);
        if paths.contains_key(&key) {
            diagnostics.warn_duplicate_key(&key);
        }
        paths.insert(key, prefix.clone());
        if let Some(children) = record.children(children_field) {
            index_level(children, row_key, children_field, diagnostics, prefix, paths);
        }
        prefix.pop();
    }
}

fn resolve<'a>(records: &'a [Record], path: &[usize], children_field: &str) -> Option<&'a Record> {
    let (first, rest) = path.split_first()?;
    let record = records.get(*first)?;
    if rest.is_empty() {
        Some(record)
    } else {
        resolve(record.children(children_field)?, rest, children_field)
    }
}
