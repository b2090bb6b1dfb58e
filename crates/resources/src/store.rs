//! ResourceStore - binary assets of one mission, staged on disk
//!
//! Files are written to a temporary directory owned by the store. The
//! directory is created on first use and removed when the store is
//! dropped, which ties the staged bytes to exactly one mission instance.

use crate::key::{Bucket, ResourceKey, StoreId};
use sortie_shared::{MizError, Result};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;

/// Subdirectory of the staging area holding kneeboard pages
const KNEEBOARD_DIR: &str = "KNEEBOARD";
/// Subdirectory of the staging area holding pass-through archive entries
const ENTRIES_DIR: &str = "_entries";

#[derive(Debug, Clone)]
struct StoredFile {
    file_name: String,
    staged: PathBuf,
}

/// A kneeboard page, either general or bound to one aircraft type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kneeboard {
    owner: Option<String>,
    file_name: String,
    staged: PathBuf,
}

impl Kneeboard {
    /// Aircraft type the page belongs to; `None` for every aircraft
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> &Path {
        &self.staged
    }

    /// Entry name inside the mission archive
    pub fn archive_path(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}/{}/IMAGES/{}", KNEEBOARD_DIR, owner, self.file_name),
            None => format!("{}/IMAGES/{}", KNEEBOARD_DIR, self.file_name),
        }
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(&self.staged)?)
    }
}

/// One resource as handed to the container on save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedResource {
    pub key: ResourceKey,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Per-mission resource store
#[derive(Debug)]
pub struct ResourceStore {
    id: StoreId,
    /// bucket -> key text -> file
    buckets: BTreeMap<Bucket, BTreeMap<String, StoredFile>>,
    /// Highest key index issued or ingested so far
    max_index: u32,
    kneeboards: Vec<Kneeboard>,
    /// Archive entries nobody interprets, kept verbatim (archive path -> staged file)
    passthrough: BTreeMap<String, PathBuf>,
    staging: Option<TempDir>,
}

impl ResourceStore {
    /// Create an empty store with a fresh identity
    pub fn new() -> Self {
        Self {
            id: StoreId::new(),
            buckets: BTreeMap::new(),
            max_index: 0,
            kneeboards: Vec::new(),
            passthrough: BTreeMap::new(),
            staging: None,
        }
    }

    pub fn id(&self) -> StoreId {
        self.id
    }

    /// Private staging directory, if anything has been staged yet
    pub fn staging_dir(&self) -> Option<&Path> {
        self.staging.as_ref().map(|d| d.path())
    }

    /// Highest numeric key index in use
    pub fn max_index(&self) -> u32 {
        self.max_index
    }

    /// Make sure future keys are numbered above `index`
    pub fn observe_index(&mut self, index: u32) {
        self.max_index = self.max_index.max(index);
    }

    // ========== Registration ==========

    /// Register a file from disk; the key label becomes `ResKey_<label>_<n>`
    pub fn add_file(&mut self, bucket: &Bucket, path: &Path, label: &str) -> Result<ResourceKey> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| MizError::Config(format!("not a file path: {}", path.display())))?
            .to_string();
        let bytes = std::fs::read(path)?;
        self.add_bytes(bucket, &file_name, &bytes, label)
    }

    /// Register an in-memory asset
    ///
    /// Adding the same name with the same bytes again returns the existing
    /// key. A different payload under a name already in the bucket is kept
    /// under a disambiguated name.
    pub fn add_bytes(
        &mut self,
        bucket: &Bucket,
        file_name: &str,
        bytes: &[u8],
        label: &str,
    ) -> Result<ResourceKey> {
        let file_name = single_component(file_name)?;

        if let Some(existing) = self.find_identical(bucket, file_name, bytes)? {
            return Ok(existing);
        }

        let stored_name = self.free_name(bucket, file_name);
        let staged = self.stage(&Path::new(bucket.as_str()).join(&stored_name), bytes)?;

        self.max_index += 1;
        let key = format!("ResKey_{}_{}", label, self.max_index);
        tracing::debug!(key = %key, bucket = %bucket, file = %stored_name, "Resource added");

        self.buckets.entry(bucket.clone()).or_default().insert(
            key.clone(),
            StoredFile {
                file_name: stored_name,
                staged,
            },
        );
        Ok(ResourceKey::new(self.id, key))
    }

    /// Register a resource read from a mission archive under its original key
    pub fn ingest(
        &mut self,
        bucket: &Bucket,
        key: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<ResourceKey> {
        let file_name = single_component(file_name)
            .map_err(|_| MizError::corrupt(format!("unsafe resource name '{}'", file_name)))?;

        let staged = match self.staged_in_bucket(bucket, file_name) {
            Some(path) => path,
            None => self.stage(&Path::new(bucket.as_str()).join(file_name), bytes)?,
        };

        if let Some(index) = ResourceKey::index_of(key) {
            self.observe_index(index);
        }
        self.buckets.entry(bucket.clone()).or_default().insert(
            key.to_string(),
            StoredFile {
                file_name: file_name.to_string(),
                staged,
            },
        );
        Ok(ResourceKey::new(self.id, key))
    }

    /// Add a kneeboard page from disk
    pub fn add_kneeboard(&mut self, owner: Option<&str>, path: &Path) -> Result<()> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| MizError::Config(format!("not a file path: {}", path.display())))?
            .to_string();
        let bytes = std::fs::read(path)?;
        self.add_kneeboard_bytes(owner, &file_name, &bytes)
    }

    /// Add a kneeboard page from memory
    pub fn add_kneeboard_bytes(
        &mut self,
        owner: Option<&str>,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<()> {
        let file_name = single_component(file_name)?;
        if let Some(owner) = owner {
            single_component(owner)?;
        }

        let mut stored_name = file_name.to_string();
        let mut n = 1;
        while self
            .kneeboards
            .iter()
            .any(|k| k.owner.as_deref() == owner && k.file_name == stored_name)
        {
            n += 1;
            stored_name = numbered_name(file_name, n);
        }

        let rel = Path::new(KNEEBOARD_DIR)
            .join(owner.unwrap_or("_all"))
            .join(&stored_name);
        let staged = self.stage(&rel, bytes)?;
        self.kneeboards.push(Kneeboard {
            owner: owner.map(str::to_string),
            file_name: stored_name,
            staged,
        });
        Ok(())
    }

    /// Keep an archive entry verbatim
    pub fn add_passthrough(&mut self, archive_path: &str, bytes: &[u8]) -> Result<()> {
        let rel = relative_path(archive_path)
            .ok_or_else(|| MizError::corrupt(format!("unsafe entry name '{}'", archive_path)))?;
        let staged = self.stage(&Path::new(ENTRIES_DIR).join(rel), bytes)?;
        self.passthrough.insert(archive_path.to_string(), staged);
        Ok(())
    }

    // ========== Lookup ==========

    /// The key issued for `text`, if this store knows it
    pub fn issued(&self, text: &str) -> Option<ResourceKey> {
        self.buckets
            .values()
            .any(|files| files.contains_key(text))
            .then(|| ResourceKey::new(self.id, text))
    }

    /// Staged location of a key's file (the default bucket wins)
    pub fn resolve(&self, key: &ResourceKey) -> Result<&Path> {
        self.lookup(key).map(|f| f.staged.as_path())
    }

    pub fn read(&self, key: &ResourceKey) -> Result<Vec<u8>> {
        Ok(std::fs::read(self.resolve(key)?)?)
    }

    pub fn file_name(&self, key: &ResourceKey) -> Result<&str> {
        self.lookup(key).map(|f| f.file_name.as_str())
    }

    /// All issued keys, each once
    pub fn keys(&self) -> Vec<ResourceKey> {
        let mut texts: Vec<&String> = self.buckets.values().flat_map(|f| f.keys()).collect();
        texts.sort();
        texts.dedup();
        texts
            .into_iter()
            .map(|t| ResourceKey::new(self.id, t.as_str()))
            .collect()
    }

    pub fn buckets(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.keys()
    }

    pub fn kneeboards(&self) -> &[Kneeboard] {
        &self.kneeboards
    }

    /// Pass-through entries as (archive path, staged file)
    pub fn passthrough(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.passthrough
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    /// Contents of one bucket, in key order
    pub fn export(&self, bucket: &Bucket) -> Result<Vec<ExportedResource>> {
        let Some(files) = self.buckets.get(bucket) else {
            return Ok(Vec::new());
        };
        files
            .iter()
            .map(|(key, file)| {
                Ok(ExportedResource {
                    key: ResourceKey::new(self.id, key.as_str()),
                    file_name: file.file_name.clone(),
                    bytes: std::fs::read(&file.staged)?,
                })
            })
            .collect()
    }

    // ========== Internals ==========

    fn lookup(&self, key: &ResourceKey) -> Result<&StoredFile> {
        if key.store() != self.id {
            return Err(MizError::unknown_key(key.as_str()));
        }
        let default = Bucket::default();
        self.buckets
            .get(&default)
            .and_then(|files| files.get(key.as_str()))
            .or_else(|| {
                self.buckets
                    .values()
                    .find_map(|files| files.get(key.as_str()))
            })
            .ok_or_else(|| MizError::unknown_key(key.as_str()))
    }

    fn find_identical(
        &self,
        bucket: &Bucket,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Option<ResourceKey>> {
        let Some(files) = self.buckets.get(bucket) else {
            return Ok(None);
        };
        for (key, file) in files.iter().filter(|(_, f)| f.file_name == file_name) {
            if std::fs::read(&file.staged)? == bytes {
                return Ok(Some(ResourceKey::new(self.id, key.as_str())));
            }
        }
        Ok(None)
    }

    fn staged_in_bucket(&self, bucket: &Bucket, file_name: &str) -> Option<PathBuf> {
        self.buckets.get(bucket).and_then(|files| {
            files
                .values()
                .find(|f| f.file_name == file_name)
                .map(|f| f.staged.clone())
        })
    }

    fn free_name(&self, bucket: &Bucket, file_name: &str) -> String {
        let taken = |name: &str| {
            self.buckets
                .get(bucket)
                .is_some_and(|files| files.values().any(|f| f.file_name == name))
        };
        let mut candidate = file_name.to_string();
        let mut n = 1;
        while taken(&candidate) {
            n += 1;
            candidate = numbered_name(file_name, n);
        }
        candidate
    }

    fn stage(&mut self, rel: &Path, bytes: &[u8]) -> Result<PathBuf> {
        let dir = match &self.staging {
            Some(dir) => dir.path().to_path_buf(),
            None => {
                let dir = tempfile::Builder::new()
                    .prefix(&format!("sortie-{}-", self.id))
                    .tempdir()?;
                tracing::debug!(path = %dir.path().display(), "Staging directory created");
                let path = dir.path().to_path_buf();
                self.staging = Some(dir);
                path
            }
        };

        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

impl Default for ResourceStore {
    fn default() -> Self {
        Self::new()
    }
}

/// `name.ext` -> `name_<n>.ext`
fn numbered_name(file_name: &str, n: u32) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, n, ext),
        _ => format!("{}_{}", file_name, n),
    }
}

fn single_component(name: &str) -> Result<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(MizError::Config(format!("invalid resource name '{}'", name))),
    }
}

fn relative_path(name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    let normal = path.components().all(|c| matches!(c, Component::Normal(_)));
    (normal && !name.is_empty()).then(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_bytes_is_idempotent() {
        let mut store = ResourceStore::new();
        let bucket = Bucket::default();

        let a = store.add_bytes(&bucket, "briefing.png", b"png-1", "ImageBriefing").unwrap();
        let b = store.add_bytes(&bucket, "briefing.png", b"png-1", "ImageBriefing").unwrap();

        assert_eq!(a, b);
        assert_eq!(store.keys().len(), 1);
        assert_eq!(a.as_str(), "ResKey_ImageBriefing_1");
    }

    #[test]
    fn test_same_name_different_payload() {
        let mut store = ResourceStore::new();
        let bucket = Bucket::default();

        let a = store.add_bytes(&bucket, "briefing.png", b"first", "Action").unwrap();
        let b = store.add_bytes(&bucket, "briefing.png", b"second", "Action").unwrap();

        assert_ne!(a, b);
        assert_eq!(store.file_name(&a).unwrap(), "briefing.png");
        assert_eq!(store.file_name(&b).unwrap(), "briefing_2.png");
        assert_eq!(store.read(&a).unwrap(), b"first");
        assert_eq!(store.read(&b).unwrap(), b"second");
    }

    #[test]
    fn test_stores_are_isolated() {
        let mut first = ResourceStore::new();
        let mut second = ResourceStore::new();
        let bucket = Bucket::default();

        let a = first.ingest(&bucket, "ResKey_Action_1", "map.png", b"AAAA").unwrap();
        let b = second.ingest(&bucket, "ResKey_Action_1", "map.png", b"BBBB").unwrap();

        assert_ne!(first.staging_dir(), second.staging_dir());
        assert_eq!(first.read(&a).unwrap(), b"AAAA");
        assert_eq!(second.read(&b).unwrap(), b"BBBB");
    }

    #[test]
    fn test_foreign_key_rejected() {
        let mut first = ResourceStore::new();
        let second = ResourceStore::new();
        let key = first
            .add_bytes(&Bucket::default(), "a.ogg", b"ogg", "Action")
            .unwrap();

        let err = second.resolve(&key).unwrap_err();
        assert!(matches!(err, MizError::UnknownResourceKey(_)));
        assert!(second.issued(key.as_str()).is_none());
    }

    #[test]
    fn test_ingest_tracks_index() {
        let mut store = ResourceStore::new();
        store
            .ingest(&Bucket::default(), "ResKey_Action_41", "a.ogg", b"x")
            .unwrap();

        let next = store
            .add_bytes(&Bucket::default(), "b.ogg", b"y", "Action")
            .unwrap();
        assert_eq!(next.as_str(), "ResKey_Action_42");
    }

    #[test]
    fn test_shared_file_between_keys() {
        let mut store = ResourceStore::new();
        let bucket = Bucket::default();
        let a = store.ingest(&bucket, "ResKey_Action_1", "a.ogg", b"x").unwrap();
        let b = store.ingest(&bucket, "ResKey_Action_2", "a.ogg", b"x").unwrap();

        assert_eq!(store.resolve(&a).unwrap(), store.resolve(&b).unwrap());
        assert_eq!(store.export(&bucket).unwrap().len(), 2);
    }

    #[test]
    fn test_staging_removed_on_drop() {
        let mut store = ResourceStore::new();
        assert!(store.staging_dir().is_none());
        store
            .add_bytes(&Bucket::default(), "a.txt", b"a", "Action")
            .unwrap();

        let dir = store.staging_dir().unwrap().to_path_buf();
        assert!(dir.exists());
        drop(store);
        assert!(!dir.exists());
    }

    #[test]
    fn test_kneeboards() {
        let mut store = ResourceStore::new();
        store.add_kneeboard_bytes(Some("F-15C"), "page1.png", b"p1").unwrap();
        store.add_kneeboard_bytes(None, "common.png", b"c").unwrap();
        store.add_kneeboard_bytes(Some("F-15C"), "page1.png", b"p2").unwrap();

        let paths: Vec<String> = store.kneeboards().iter().map(|k| k.archive_path()).collect();
        assert_eq!(
            paths,
            vec![
                "KNEEBOARD/F-15C/IMAGES/page1.png",
                "KNEEBOARD/IMAGES/common.png",
                "KNEEBOARD/F-15C/IMAGES/page1_2.png",
            ]
        );
        assert_eq!(store.kneeboards()[2].read().unwrap(), b"p2");
    }

    #[test]
    fn test_add_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intel.jpg");
        std::fs::write(&path, b"jpeg").unwrap();

        let mut store = ResourceStore::new();
        let key = store.add_file(&Bucket::default(), &path, "ImageBriefing").unwrap();
        assert_eq!(store.file_name(&key).unwrap(), "intel.jpg");
        assert_ne!(store.resolve(&key).unwrap(), path.as_path());
    }

    #[test]
    fn test_unsafe_names_rejected() {
        let mut store = ResourceStore::new();
        assert!(store
            .add_bytes(&Bucket::default(), "../escape.png", b"x", "Action")
            .is_err());
        assert!(store.add_passthrough("../track", b"x").is_err());
        assert!(store.add_passthrough("track/data", b"x").is_ok());
        assert_eq!(store.passthrough().count(), 1);
    }

    #[test]
    fn test_numbered_name() {
        assert_eq!(numbered_name("a.png", 2), "a_2.png");
        assert_eq!(numbered_name("noext", 3), "noext_3");
        assert_eq!(numbered_name(".hidden", 2), ".hidden_2");
    }
}
