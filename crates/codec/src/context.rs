//! Load and save contexts

use sortie_domain::IdRegistry;
use sortie_resources::{ResourceKey, ResourceStore};
use sortie_shared::{Category, Diagnostics, IdKind, LoadOptions, MizError, Result, Strictness};
use sortie_table::{Table, Value};
use std::collections::BTreeSet;

/// State threaded through a load
#[derive(Debug)]
pub struct LoadContext<'a> {
    options: &'a LoadOptions,
    resources: &'a ResourceStore,
    registry: IdRegistry,
    /// Ids registered so far, in order
    journal: Vec<(IdKind, u32)>,
    diagnostics: Diagnostics,
}

impl<'a> LoadContext<'a> {
    pub fn new(options: &'a LoadOptions, resources: &'a ResourceStore) -> Self {
        Self {
            options,
            resources,
            registry: IdRegistry::new(),
            journal: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn options(&self) -> &LoadOptions {
        self.options
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Record an id found in the file; a second holder is renumbered by the repair pass
    pub fn register(&mut self, kind: IdKind, id: u32, path: &str) {
        match self.registry.register(kind, id) {
            Ok(()) => self.journal.push((kind, id)),
            Err(e) => tracing::debug!(path = %path, error = %e, "Duplicate id deferred to repair"),
        }
    }

    /// Decode one record under the strictness policy.
    ///
    /// A record that fails gives back every id it registered, including the
    /// ids of nested records decoded before the failure.
    pub fn decode_record<T>(
        &mut self,
        decode: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<Option<T>> {
        let mark = self.journal.len();
        let result = decode(self);
        if result.is_err() {
            for (kind, id) in self.journal.drain(mark..) {
                self.registry.release(kind, id);
            }
        }
        self.recover(result)
    }

    /// The issued resource key behind `text`, if any
    pub fn resource(&self, text: &str) -> Option<ResourceKey> {
        self.resources.issued(text)
    }

    /// Apply the strictness policy to a record-level result.
    ///
    /// Lenient loads turn `MalformedRecord` and `UnsupportedVariant` into a
    /// WARN diagnostic and yield `None`; every other error propagates.
    pub fn recover<T>(&mut self, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_record_level() && self.options.strictness == Strictness::Lenient => {
                let (category, path) = match &e {
                    MizError::MalformedRecord(m) => (Category::MalformedRecordSkipped, m.path.clone()),
                    MizError::UnsupportedVariant(u) => {
                        (Category::UnsupportedVariantSkipped, u.path.clone())
                    }
                    _ => (Category::MalformedRecordSkipped, String::new()),
                };
                tracing::warn!(path = %path, error = %e, "Record skipped");
                self.diagnostics
                    .warn(category, e.to_string(), Some(path.as_str()).filter(|p| !p.is_empty()));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Hand back the registry and the diagnostics collected so far
    pub fn finish(self) -> (IdRegistry, Diagnostics) {
        (self.registry, self.diagnostics)
    }
}

/// State threaded through a save
#[derive(Debug)]
pub struct SaveContext<'a> {
    resources: &'a ResourceStore,
}

impl<'a> SaveContext<'a> {
    pub fn new(resources: &'a ResourceStore) -> Self {
        Self { resources }
    }

    /// Key text for the file; fails for keys this mission never issued
    pub fn key(&self, key: &ResourceKey) -> Result<Value> {
        self.resources.resolve(key)?;
        Ok(Value::from(key.as_str()))
    }
}

/// Issued keys mentioned by any string in `tables`.
///
/// A key counts when a string equals it or contains it as a token, so keys
/// used inside compiled trigger code (`getValueResourceByKey("ResKey_Action_3")`)
/// are kept too.
pub fn referenced_keys(tables: &[&Table], resources: &ResourceStore) -> BTreeSet<String> {
    let issued: Vec<ResourceKey> = resources.keys();
    let mut referenced = BTreeSet::new();

    let mut visit = |s: &str| {
        for key in &issued {
            if mentions(s, key.as_str()) {
                referenced.insert(key.as_str().to_string());
            }
        }
    };
    for table in tables {
        table.visit_strings(&mut visit);
    }
    referenced
}

/// `haystack` contains `key` not followed by another digit
fn mentions(haystack: &str, key: &str) -> bool {
    haystack.match_indices(key).any(|(start, _)| {
        !haystack[start + key.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    })
}
