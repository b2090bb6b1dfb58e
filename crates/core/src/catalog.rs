//! Module catalog - which optional content module provides a unit type
//!
//! The catalog is an external collaborator: the host program knows which
//! unit types ship with the base game and which come from a module. The
//! repair pass only asks it questions.

use std::collections::BTreeMap;

/// Module Catalog Trait
///
/// Read-only and shared between missions; implementations must not keep
/// per-mission state.
pub trait ModuleCatalog {
    /// The module providing `unit_type`, or `None` for base content
    fn module_for(&self, unit_type: &str) -> Option<&str>;
}

/// Map-backed catalog
#[derive(Debug, Clone, Default)]
pub struct StaticModuleCatalog {
    modules: BTreeMap<String, String>,
}

impl StaticModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: declare that `unit_type` comes from `module`
    pub fn with(mut self, unit_type: impl Into<String>, module: impl Into<String>) -> Self {
        self.insert(unit_type, module);
        self
    }

    pub fn insert(&mut self, unit_type: impl Into<String>, module: impl Into<String>) {
        self.modules.insert(unit_type.into(), module.into());
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleCatalog for StaticModuleCatalog {
    fn module_for(&self, unit_type: &str) -> Option<&str> {
        self.modules.get(unit_type).map(String::as_str)
    }
}
