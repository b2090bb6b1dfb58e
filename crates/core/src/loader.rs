//! Load and save entry points

use crate::catalog::ModuleCatalog;
use crate::container::{read_archive, stage_resources, write_archive, RawArchive};
use crate::repair::repair;
use sortie_codec::{decode_mission, LoadContext};
use sortie_domain::{Dictionary, Mission};
use sortie_resources::ResourceStore;
use sortie_shared::{Diagnostics, LoadOptions, MizError, Result, SaveOptions};
use sortie_table::Value;
use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;

/// A loaded mission and everything the load had to say about it
#[derive(Debug)]
pub struct Loaded {
    pub mission: Mission,
    /// In the order the issues were found; empty for a clean file
    pub diagnostics: Diagnostics,
}

/// Mission loader
///
/// ```no_run
/// use sortie_core::{MissionLoader, LoadOptions};
///
/// let loaded = MissionLoader::new()
///     .options(LoadOptions::tolerant())
///     .load_file("Caucasus Training.miz".as_ref())?;
/// for diagnostic in loaded.diagnostics.iter() {
///     println!("{}", diagnostic);
/// }
/// # Ok::<(), sortie_core::MizError>(())
/// ```
#[derive(Default)]
pub struct MissionLoader<'c> {
    options: LoadOptions,
    catalog: Option<&'c dyn ModuleCatalog>,
}

impl<'c> MissionLoader<'c> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set load options
    pub fn options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    /// Builder: set the module catalog used to fill `required_modules`
    pub fn catalog(mut self, catalog: &'c dyn ModuleCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn load_file(&self, path: &Path) -> Result<Loaded> {
        tracing::info!(path = %path.display(), "Loading mission");
        let file = File::open(path)?;
        self.load_reader(BufReader::new(file))
    }

    pub fn load_reader<R: Read + Seek>(&self, reader: R) -> Result<Loaded> {
        let mut raw = read_archive(reader)?;
        let mut diagnostics = Diagnostics::new();

        let mut resources = ResourceStore::new();
        stage_resources(&mut raw, &mut resources, &mut diagnostics)?;
        if let Some(max) = raw.mission.get("maxDictId").and_then(Value::as_i64) {
            resources.observe_index(u32::try_from(max).unwrap_or(0));
        }

        let mut ctx = LoadContext::new(&self.options, &resources);
        let mut parts = decode_mission(&raw.mission, &mut ctx)?;
        let (registry, decoded) = ctx.finish();
        diagnostics.extend(decoded);

        fill_dictionary(&mut parts.dictionary, &mut raw);
        if !raw.mission.contains("theatre") {
            if let Some(theatre) = raw.theatre.take() {
                parts.settings.theatre = theatre;
            }
        }
        parts.options = std::mem::take(&mut raw.options);
        parts.warehouses = std::mem::take(&mut raw.warehouses);

        let mut mission = Mission::from_parts(parts, registry, resources);
        repair(&mut mission, self.catalog, &mut diagnostics)?;

        tracing::info!(
            groups = mission.groups().count(),
            zones = mission.zones().len(),
            diagnostics = diagnostics.len(),
            "Mission loaded"
        );
        Ok(Loaded {
            mission,
            diagnostics,
        })
    }
}

/// Default bucket entries go into the dictionary; other buckets are kept as translations
fn fill_dictionary(dictionary: &mut Dictionary, raw: &mut RawArchive) {
    for (bucket, table) in std::mem::take(&mut raw.dictionaries) {
        if bucket.is_default() {
            for (key, value) in table.fields() {
                if let Some(text) = value.as_str() {
                    dictionary.insert(key, text);
                }
            }
        } else {
            dictionary.set_translation(bucket, table);
        }
    }
}

/// Save to `path` without ever leaving a half-written file there.
///
/// The archive is written to a temporary file in the destination directory
/// and renamed over the destination once complete.
pub fn save_file(mission: &Mission, path: &Path, options: &SaveOptions) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = tempfile::Builder::new()
        .prefix(".sortie-")
        .suffix(".miz.tmp")
        .tempfile_in(dir)?;

    let temp = write_archive(mission, temp, options)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| MizError::Io(e.error))?;

    tracing::info!(path = %path.display(), "Mission saved");
    Ok(())
}

/// Save to any seekable writer, returning it
pub fn save_writer<W: Write + Seek>(mission: &Mission, writer: W, options: &SaveOptions) -> Result<W> {
    write_archive(mission, writer, options)
}
