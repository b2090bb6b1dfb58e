//! Mission container - the `.miz` zip archive
//!
//! ```text
//! mission                         root table (Lua text)
//! options                         options table
//! warehouses                      warehouses table
//! theatre                         terrain name (plain text)
//! l10n/<bucket>/dictionary        string dictionary
//! l10n/<bucket>/mapResource       resource key -> file name
//! l10n/<bucket>/<file>            resource payloads
//! KNEEBOARD/[<type>/]IMAGES/<f>   kneeboard pages
//! ```
//!
//! Anything else in the archive is carried through untouched.

use sortie_codec::{encode_mission, referenced_keys};
use sortie_domain::Mission;
use sortie_resources::{Bucket, ResourceStore};
use sortie_shared::{Category, Compression, Diagnostics, MizError, Result, SaveOptions};
use sortie_table::{parse_assignment, to_lua, Key, Table, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const MISSION_ENTRY: &str = "mission";
pub const OPTIONS_ENTRY: &str = "options";
pub const WAREHOUSES_ENTRY: &str = "warehouses";
pub const THEATRE_ENTRY: &str = "theatre";

const L10N_DIR: &str = "l10n";
const DICTIONARY: &str = "dictionary";
const MAP_RESOURCE: &str = "mapResource";
const KNEEBOARD_DIR: &str = "KNEEBOARD";
const IMAGES_DIR: &str = "IMAGES";

fn archive_error(e: zip::result::ZipError) -> MizError {
    MizError::Archive(e.to_string())
}

/// Contents of an archive, parsed but not yet interpreted
#[derive(Debug, Default)]
pub struct RawArchive {
    pub mission: Table,
    pub options: Table,
    pub warehouses: Table,
    pub theatre: Option<String>,
    pub dictionaries: BTreeMap<Bucket, Table>,
    pub map_resources: BTreeMap<Bucket, Table>,
    /// Every other entry, by archive path
    pub files: BTreeMap<String, Vec<u8>>,
}

fn parse_entry(name: &str, bytes: &[u8]) -> Result<Table> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| MizError::corrupt(format!("entry '{}' is not UTF-8 text", name)))?;
    let (_, table) = parse_assignment(text)
        .map_err(|e| MizError::corrupt(format!("entry '{}': {}", name, e)))?;
    Ok(table)
}

/// `l10n/<bucket>/<file>` split into its bucket and file name
fn l10n_entry(name: &str) -> Option<(Bucket, &str)> {
    let rest = name.strip_prefix(L10N_DIR)?.strip_prefix('/')?;
    let (bucket, file) = rest.split_once('/')?;
    (!bucket.is_empty() && !file.is_empty() && !file.contains('/')).then(|| (Bucket::new(bucket), file))
}

/// `KNEEBOARD/IMAGES/<f>` or `KNEEBOARD/<type>/IMAGES/<f>`
fn kneeboard_entry(name: &str) -> Option<(Option<&str>, &str)> {
    let rest = name.strip_prefix(KNEEBOARD_DIR)?.strip_prefix('/')?;
    let parts: Vec<&str> = rest.split('/').collect();
    match parts.as_slice() {
        [IMAGES_DIR, file] if !file.is_empty() => Some((None, *file)),
        [owner, IMAGES_DIR, file] if !file.is_empty() => Some((Some(*owner), *file)),
        _ => None,
    }
}

/// Read and parse every entry of an archive
pub fn read_archive<R: Read + Seek>(reader: R) -> Result<RawArchive> {
    let mut zip = ZipArchive::new(reader)
        .map_err(|e| MizError::corrupt(format!("not a mission archive: {}", e)))?;
    let mut raw = RawArchive::default();
    let mut has_mission = false;

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| MizError::corrupt(format!("entry {}: {}", index, e)))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| MizError::corrupt(format!("entry '{}': {}", name, e)))?;
        tracing::debug!(entry = %name, size = bytes.len(), "Archive entry read");

        match name.as_str() {
            MISSION_ENTRY => {
                raw.mission = parse_entry(&name, &bytes)?;
                has_mission = true;
            }
            OPTIONS_ENTRY => raw.options = parse_entry(&name, &bytes)?,
            WAREHOUSES_ENTRY => raw.warehouses = parse_entry(&name, &bytes)?,
            THEATRE_ENTRY => {
                raw.theatre = Some(String::from_utf8_lossy(&bytes).trim().to_string());
            }
            _ => match l10n_entry(&name) {
                Some((bucket, DICTIONARY)) => {
                    raw.dictionaries.insert(bucket, parse_entry(&name, &bytes)?);
                }
                Some((bucket, MAP_RESOURCE)) => {
                    raw.map_resources.insert(bucket, parse_entry(&name, &bytes)?);
                }
                _ => {
                    raw.files.insert(name, bytes);
                }
            },
        }
    }

    if !has_mission {
        return Err(MizError::corrupt("archive has no mission entry"));
    }
    Ok(raw)
}

/// Move the archive's payloads into a mission's resource store.
///
/// Files named by a `mapResource` table are ingested under their keys,
/// kneeboard pages become kneeboards, and every other entry is kept as a
/// pass-through entry. A key whose file is missing is reported and skipped.
pub fn stage_resources(
    raw: &mut RawArchive,
    store: &mut ResourceStore,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let mut consumed = BTreeSet::new();

    for (bucket, map) in &raw.map_resources {
        for (key, value) in map.fields() {
            let path = format!("{}/{}/{}", L10N_DIR, bucket, MAP_RESOURCE);
            let Some(file_name) = value.as_str() else {
                diagnostics.warn(
                    Category::MissingResource,
                    format!("Resource '{}' has no file name", key),
                    Some(path.as_str()),
                );
                continue;
            };
            let entry = format!("{}/{}/{}", L10N_DIR, bucket, file_name);
            match raw.files.get(&entry) {
                Some(bytes) => {
                    store.ingest(bucket, key, file_name, bytes)?;
                    consumed.insert(entry);
                }
                None => {
                    tracing::warn!(key = %key, entry = %entry, "Resource file missing from archive");
                    diagnostics.warn(
                        Category::MissingResource,
                        format!("Resource '{}' names missing file '{}'", key, entry),
                        Some(path.as_str()),
                    );
                }
            }
        }
    }

    for (name, bytes) in &raw.files {
        if consumed.contains(name) {
            continue;
        }
        match kneeboard_entry(name) {
            Some((owner, file)) => store.add_kneeboard_bytes(owner, file, bytes)?,
            None => store.add_passthrough(name, bytes)?,
        }
    }
    raw.files.clear();
    Ok(())
}

/// Every entry a saved archive holds, in write order
pub fn archive_entries(mission: &Mission) -> Result<Vec<(String, Vec<u8>)>> {
    let root = encode_mission(mission)?;
    let resources = mission.resources();
    let referenced = referenced_keys(&[&root, &mission.options], resources);

    let mut entries = vec![
        (MISSION_ENTRY.to_string(), to_lua(MISSION_ENTRY, &root).into_bytes()),
        (OPTIONS_ENTRY.to_string(), to_lua(OPTIONS_ENTRY, &mission.options).into_bytes()),
        (
            WAREHOUSES_ENTRY.to_string(),
            to_lua(WAREHOUSES_ENTRY, &mission.warehouses).into_bytes(),
        ),
        (THEATRE_ENTRY.to_string(), mission.settings.theatre.clone().into_bytes()),
    ];

    let translations: BTreeMap<&Bucket, &Table> = mission.dictionary.translations().collect();
    let mut buckets: BTreeSet<Bucket> = resources.buckets().cloned().collect();
    buckets.insert(Bucket::default());
    buckets.extend(translations.keys().map(|b| (*b).clone()));

    let mut written: BTreeSet<String> = entries.iter().map(|(name, _)| name.clone()).collect();
    let mut push = |entries: &mut Vec<(String, Vec<u8>)>, name: String, bytes: Vec<u8>| {
        if written.insert(name.clone()) {
            entries.push((name, bytes));
        }
    };

    for bucket in &buckets {
        let dictionary = if bucket.is_default() {
            Some(
                mission
                    .dictionary
                    .entries()
                    .map(|(k, v)| (Key::from(k), Value::from(v)))
                    .collect::<Table>(),
            )
        } else {
            translations.get(bucket).map(|t| (*t).clone())
        };
        if let Some(dictionary) = dictionary {
            let name = format!("{}/{}/{}", L10N_DIR, bucket, DICTIONARY);
            push(&mut entries, name, to_lua(DICTIONARY, &dictionary).into_bytes());
        }

        let mut map = Table::new();
        let mut payloads = Vec::new();
        for resource in resources.export(bucket)? {
            if !referenced.contains(resource.key.as_str()) {
                tracing::debug!(key = %resource.key, "Unreferenced resource dropped");
                continue;
            }
            map.insert(resource.key.as_str(), &resource.file_name);
            payloads.push((format!("{}/{}/{}", L10N_DIR, bucket, resource.file_name), resource.bytes));
        }
        if bucket.is_default() || !map.is_empty() {
            let name = format!("{}/{}/{}", L10N_DIR, bucket, MAP_RESOURCE);
            push(&mut entries, name, to_lua(MAP_RESOURCE, &map).into_bytes());
        }
        for (name, bytes) in payloads {
            push(&mut entries, name, bytes);
        }
    }

    for kneeboard in resources.kneeboards() {
        push(&mut entries, kneeboard.archive_path(), kneeboard.read()?);
    }
    for (name, staged) in resources.passthrough() {
        push(&mut entries, name.to_string(), std::fs::read(staged)?);
    }
    Ok(entries)
}

/// Write a mission archive to `writer`, returning the writer
pub fn write_archive<W: Write + Seek>(mission: &Mission, writer: W, options: &SaveOptions) -> Result<W> {
    let entries = archive_entries(mission)?;

    let method = match options.compression {
        Compression::Deflated => CompressionMethod::Deflated,
        Compression::Stored => CompressionMethod::Stored,
    };
    let file_options = SimpleFileOptions::default().compression_method(method);

    let mut zip = ZipWriter::new(writer);
    for (name, bytes) in &entries {
        zip.start_file(name.as_str(), file_options).map_err(archive_error)?;
        zip.write_all(bytes)?;
    }
    tracing::debug!(entries = entries.len(), "Archive written");
    zip.finish().map_err(archive_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn zip_of(entries: &[(&str, &str)]) -> Cursor<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, text) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(text.as_bytes()).unwrap();
        }
        let mut cursor = zip.finish().unwrap();
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn test_entry_names() {
        assert_eq!(
            l10n_entry("l10n/DEFAULT/dictionary"),
            Some((Bucket::default(), "dictionary"))
        );
        assert_eq!(l10n_entry("l10n/DEFAULT/sub/x.png"), None);
        assert_eq!(
            kneeboard_entry("KNEEBOARD/F-16C_50/IMAGES/page.png"),
            Some((Some("F-16C_50"), "page.png"))
        );
        assert_eq!(kneeboard_entry("KNEEBOARD/IMAGES/all.png"), Some((None, "all.png")));
        assert_eq!(kneeboard_entry("KNEEBOARD/notes.txt"), None);
    }

    #[test]
    fn test_not_a_zip() {
        let err = read_archive(Cursor::new(b"plain text".to_vec())).unwrap_err();
        assert!(matches!(err, MizError::CorruptContainer(_)));
    }

    #[test]
    fn test_missing_mission_entry() {
        let archive = zip_of(&[("options", "options = {}")]);
        let err = read_archive(archive).unwrap_err();
        assert!(matches!(err, MizError::CorruptContainer(_)));
    }

    #[test]
    fn test_unparsable_root() {
        let archive = zip_of(&[("mission", "mission = { [\"version\"] = ")]);
        let err = read_archive(archive).unwrap_err();
        assert!(err.to_string().contains("mission"));
    }

    #[test]
    fn test_deeply_nested_root() {
        let depth = 100_000;
        let text = format!("mission = {}{}", "{".repeat(depth), "}".repeat(depth));
        let archive = zip_of(&[("mission", text.as_str())]);
        let err = read_archive(archive).unwrap_err();
        assert!(matches!(err, MizError::CorruptContainer(_)));
    }

    #[test]
    fn test_stage_resources() {
        let archive = zip_of(&[
            ("mission", "mission = {}"),
            (
                "l10n/DEFAULT/mapResource",
                "mapResource = { [\"ResKey_Action_1\"] = \"a.ogg\", [\"ResKey_Action_2\"] = \"gone.ogg\" }",
            ),
            ("l10n/DEFAULT/a.ogg", "ogg"),
            ("KNEEBOARD/IMAGES/all.png", "png"),
            ("track/data", "opaque"),
        ]);
        let mut raw = read_archive(archive).unwrap();
        let mut store = ResourceStore::new();
        let mut diagnostics = Diagnostics::new();
        stage_resources(&mut raw, &mut store, &mut diagnostics).unwrap();

        let key = store.issued("ResKey_Action_1").unwrap();
        assert_eq!(store.read(&key).unwrap(), b"ogg");
        assert!(store.issued("ResKey_Action_2").is_none());
        assert_eq!(diagnostics.by_category(Category::MissingResource).len(), 1);
        assert_eq!(store.kneeboards().len(), 1);
        assert_eq!(store.passthrough().count(), 1);
    }
}
