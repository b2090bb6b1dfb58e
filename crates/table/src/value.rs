//! Table values
//!
//! `Table` keeps its entries sorted: integer keys first in numeric order,
//! then string keys. Sequences are just tables whose keys are integers;
//! gaps are tolerated on read and removed on write.

use std::collections::BTreeMap;
use std::fmt;

/// A table key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl Key {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(i) => Some(*i),
            Key::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            Key::Int(_) => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "[{}]", i),
            Key::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Int(i as i64)
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

/// A table value
///
/// Integers and floats are kept apart so that `1` and `1.0` survive a round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Table(Table),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view; integral floats are accepted
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "number",
            Value::Str(_) => "string",
            Value::Table(_) => "table",
        }
    }

    /// Visit every string reachable from this value (keys excluded)
    pub fn visit_strings<'a>(&'a self, f: &mut dyn FnMut(&'a str)) {
        match self {
            Value::Str(s) => f(s),
            Value::Table(t) => t.visit_strings(f),
            _ => {}
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Value::Table(t)
    }
}

/// An ordered, untyped key-value table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    entries: BTreeMap<Key, Value>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sequence, numbering items 1..=n in iteration order
    pub fn from_sequence<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let entries = items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (Key::Int(i as i64 + 1), v.into()))
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(&Key::Str(key.to_string()))
    }

    pub fn get_index(&self, index: i64) -> Option<&Value> {
        self.entries.get(&Key::Int(index))
    }

    pub fn get_key(&self, key: &Key) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Insert only when the key is not present yet
    pub fn insert_missing(&mut self, key: Key, value: Value) {
        self.entries.entry(key).or_insert(value);
    }

    /// Builder: set a value
    pub fn with(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(&Key::Str(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    /// String-keyed entries in key order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| k.as_str().map(|k| (k, v)))
    }

    /// Integer-keyed entries sorted numerically, with their original keys
    pub fn indexed(&self) -> impl Iterator<Item = (i64, &Value)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| k.as_int().map(|i| (i, v)))
    }

    /// Integer-keyed values in numeric key order; gaps are skipped
    pub fn sequence(&self) -> Vec<&Value> {
        self.indexed().map(|(_, v)| v).collect()
    }

    /// True when the keys are exactly 1..=n
    pub fn is_contiguous_sequence(&self) -> bool {
        self.entries
            .keys()
            .enumerate()
            .all(|(i, k)| *k == Key::Int(i as i64 + 1))
    }

    /// Copy every entry of `other` that is not present here
    pub fn merge_missing(&mut self, other: &Table) {
        for (k, v) in other.iter() {
            self.insert_missing(k.clone(), v.clone());
        }
    }

    pub fn visit_strings<'a>(&'a self, f: &mut dyn FnMut(&'a str)) {
        for value in self.entries.values() {
            value.visit_strings(f);
        }
    }
}

impl FromIterator<(Key, Value)> for Table {
    fn from_iter<T: IntoIterator<Item = (Key, Value)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Table {
    type Item = (Key, Value);
    type IntoIter = std::collections::btree_map::IntoIter<Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
