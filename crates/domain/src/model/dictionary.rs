//! String dictionary (`l10n/<bucket>/dictionary`)
//!
//! Texts shown to players are stored out of line and referenced by
//! `DictKey_<label>_<n>` keys.

use sortie_resources::{Bucket, ResourceKey};
use sortie_table::Table;
use std::collections::BTreeMap;
use std::fmt;

/// Key of a dictionary entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringKey(String);

impl StringKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StringKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    /// Default-bucket entries
    entries: BTreeMap<String, String>,
    /// Other language buckets, kept as read
    translations: BTreeMap<Bucket, Table>,
    max_id: u32,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new text and return its key
    pub fn add(&mut self, label: &str, text: impl Into<String>) -> StringKey {
        self.max_id += 1;
        let key = format!("DictKey_{}_{}", label, self.max_id);
        self.entries.insert(key.clone(), text.into());
        StringKey(key)
    }

    /// Insert an entry read from a file
    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        let key = key.into();
        if let Some(index) = ResourceKey::index_of(&key) {
            self.observe(index);
        }
        self.entries.insert(key, text.into());
    }

    pub fn get(&self, key: &StringKey) -> Option<&str> {
        self.entries.get(key.as_str()).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest key index in use (`maxDictId`)
    pub fn max_id(&self) -> u32 {
        self.max_id
    }

    pub fn observe(&mut self, index: u32) {
        self.max_id = self.max_id.max(index);
    }

    pub fn set_translation(&mut self, bucket: Bucket, table: Table) {
        self.translations.insert(bucket, table);
    }

    pub fn translations(&self) -> impl Iterator<Item = (&Bucket, &Table)> {
        self.translations.iter()
    }
}
