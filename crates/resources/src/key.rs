//! Resource keys and buckets

use std::fmt;
use uuid::Uuid;

/// Identity of one resource store
///
/// Every key carries the id of the store that issued it, so a key taken
/// from another mission is rejected instead of silently resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId(Uuid);

impl StoreId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for StoreId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named resource scope (`l10n/<name>` in the archive)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bucket(String);

impl Bucket {
    pub const DEFAULT_NAME: &'static str = "DEFAULT";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT_NAME
    }
}

impl Default for Bucket {
    fn default() -> Self {
        Self::new(Self::DEFAULT_NAME)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque handle to a stored asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    store: StoreId,
    key: String,
}

impl ResourceKey {
    pub(crate) fn new(store: StoreId, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn store(&self) -> StoreId {
        self.store
    }

    /// The key text written to the mission file (`ResKey_Action_3`)
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Trailing numeric index of a key text such as `ResKey_Action_12`
    pub fn index_of(key: &str) -> Option<u32> {
        key.rsplit_once('_').and_then(|(_, n)| n.parse().ok())
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}
