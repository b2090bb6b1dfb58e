//! Mission root codec (the archive's `mission` entry)
//!
//! Decoding yields [`MissionParts`]; the archive's other entries
//! (dictionary, options, warehouses) are filled in by the container layer.

use crate::codec::{decode_field, encode_items};
use crate::context::{LoadContext, SaveContext};
use crate::country::{decode_coalition, decode_members, encode_coalition, encode_members};
use crate::record::Record;
use chrono::{Datelike, NaiveDate};
use sortie_domain::{Mission, MissionParts, MissionSettings, Side, StringKey};
use sortie_resources::ResourceKey;
use sortie_shared::{Category, MizError, Result, Strictness};
use sortie_table::{Key, Table, Value};
use std::collections::BTreeMap;

/// Root keys the codec models
const MODELED_KEYS: [&str; 22] = [
    "version",
    "theatre",
    "date",
    "start_time",
    "descriptionText",
    "descriptionBlueTask",
    "descriptionRedTask",
    "descriptionNeutralsTask",
    "sortie",
    "weather",
    "map",
    "coalition",
    "coalitions",
    "triggers",
    "trigrules",
    "goals",
    "drawings",
    "pictureFileNameB",
    "pictureFileNameR",
    "pictureFileNameN",
    "requiredModules",
    "maxDictId",
];

/// Root keys known to the format but kept as opaque tables
const OPAQUE_KEYS: [&str; 7] = [
    "trig",
    "result",
    "forcedOptions",
    "failures",
    "groundControl",
    "currentKey",
    "needModules",
];

fn string_key(record: &Record<'_>, field: &str) -> Result<Option<StringKey>> {
    Ok(record.opt_str(field)?.map(StringKey::new))
}

fn decode_settings(root: &Record<'_>) -> Result<MissionSettings> {
    let defaults = MissionSettings::default();
    let date = match root.opt_record("date")? {
        Some(date) => {
            let (year, month, day) = (date.i64("Year")?, date.i64("Month")?, date.i64("Day")?);
            i32::try_from(year)
                .ok()
                .zip(u32::try_from(month).ok())
                .zip(u32::try_from(day).ok())
                .and_then(|((y, m), d)| NaiveDate::from_ymd_opt(y, m, d))
                .ok_or_else(|| {
                    MizError::malformed(root.path(), "date", format!("{}-{}-{} is not a date", year, month, day))
                })?
        }
        None => defaults.date,
    };

    Ok(MissionSettings {
        version: root.i64_or("version", defaults.version)?,
        theatre: root.str_or("theatre", &defaults.theatre)?,
        date,
        start_time: root.i64_or("start_time", defaults.start_time)?,
        description_text: string_key(root, "descriptionText")?,
        description_blue_task: string_key(root, "descriptionBlueTask")?,
        description_red_task: string_key(root, "descriptionRedTask")?,
        description_neutrals_task: string_key(root, "descriptionNeutralsTask")?,
        sortie: string_key(root, "sortie")?,
        weather: root.table_or_empty("weather")?,
        map: root.table_or_empty("map")?,
    })
}

fn encode_settings(settings: &MissionSettings, table: &mut Table) {
    let date = Table::new()
        .with("Day", i64::from(settings.date.day()))
        .with("Month", i64::from(settings.date.month()))
        .with("Year", i64::from(settings.date.year()));
    table.insert("version", settings.version);
    table.insert("theatre", &settings.theatre);
    table.insert("date", date);
    table.insert("start_time", settings.start_time);
    table.insert("weather", settings.weather.clone());
    table.insert("map", settings.map.clone());

    let keys = [
        ("descriptionText", &settings.description_text),
        ("descriptionBlueTask", &settings.description_blue_task),
        ("descriptionRedTask", &settings.description_red_task),
        ("descriptionNeutralsTask", &settings.description_neutrals_task),
        ("sortie", &settings.sortie),
    ];
    for (field, key) in keys {
        if let Some(key) = key {
            table.insert(field, key.as_str());
        }
    }
}

/// Decode all three coalitions, keeping each country in the first side that lists it
fn decode_coalitions(root: &Record<'_>, parts: &mut MissionParts, ctx: &mut LoadContext<'_>) -> Result<()> {
    let Some(coalition) = root.opt_record("coalition")? else {
        return Ok(());
    };
    let members = root.opt_table("coalitions")?;
    let mut owners: BTreeMap<String, Side> = BTreeMap::new();

    for side in Side::ALL {
        let Some(record) = coalition.opt_record(side.key())? else {
            continue;
        };
        let mut decoded = decode_coalition(&record, side, decode_members(members, side), ctx)?;

        let names: Vec<String> = decoded.countries().iter().map(|c| c.name.clone()).collect();
        for name in names {
            let Some(owner) = owners.get(&name).copied() else {
                owners.insert(name, side);
                continue;
            };
            let conflict = MizError::CountryConflict {
                country: name.clone(),
                coalition: owner.key().to_string(),
            };
            if ctx.options().strictness == Strictness::Strict {
                return Err(conflict);
            }
            tracing::warn!(country = %name, side = side.key(), "Country listed by two coalitions");
            let path = format!("{}.{}", record.path(), name);
            ctx.diagnostics_mut()
                .warn(Category::CountryConflict, conflict.to_string(), Some(path.as_str()));
            decoded.remove_country(&name);
        }
        parts.coalitions.push(decoded);
    }
    Ok(())
}

fn decode_pictures(root: &Record<'_>, parts: &mut MissionParts, ctx: &mut LoadContext<'_>) -> Result<()> {
    for side in Side::ALL {
        let field = format!("pictureFileName{}", side.picture_suffix());
        let Some(list) = root.opt_table(&field)? else {
            continue;
        };
        let mut keys = Vec::new();
        for (index, value) in list.indexed() {
            let Some(text) = value.as_str() else {
                return Err(MizError::malformed(root.path(), format!("{}[{}]", field, index), "expected a key"));
            };
            match ctx.resource(text) {
                Some(key) => keys.push(key),
                None => {
                    let path = format!("{}[{}]", field, index);
                    tracing::warn!(key = %text, path = %path, "Briefing picture has no resource");
                    ctx.diagnostics_mut().warn(
                        Category::MissingResource,
                        format!("Picture key '{}' names no resource", text),
                        Some(path.as_str()),
                    );
                }
            }
        }
        parts.pictures.insert(side, keys);
    }
    Ok(())
}

fn decode_required_modules(root: &Record<'_>) -> Result<BTreeMap<String, String>> {
    let mut modules = BTreeMap::new();
    if let Some(table) = root.opt_table("requiredModules")? {
        for (name, value) in table.fields() {
            let value = value.as_str().ok_or_else(|| {
                MizError::malformed(root.path(), format!("requiredModules.{}", name), "expected a module name")
            })?;
            modules.insert(name.to_string(), value.to_string());
        }
    }
    Ok(modules)
}

/// Decode the `mission` root table.
///
/// Unknown root keys are kept in `unknown` by a tolerant load and dropped
/// with an INFO diagnostic otherwise.
pub fn decode_mission(root: &Table, ctx: &mut LoadContext<'_>) -> Result<MissionParts> {
    let record = Record::new(root, "");
    let mut parts = MissionParts {
        settings: decode_settings(&record)?,
        required_modules: decode_required_modules(&record)?,
        ..Default::default()
    };

    decode_coalitions(&record, &mut parts, ctx)?;

    if let Some(triggers) = record.opt_record("triggers")? {
        parts.zones = decode_field(&triggers, "zones", ctx)?;
        let rest = triggers.extra(&["zones"]);
        if !rest.is_empty() {
            parts.opaque.insert("triggers", rest);
        }
    }
    parts.triggers = decode_field(&record, "trigrules", ctx)?;
    parts.goals = decode_field(&record, "goals", ctx)?;

    if let Some(drawings) = record.opt_record("drawings")? {
        parts.layers = decode_field(&drawings, "layers", ctx)?;
        parts.drawing_options = drawings.table_or_empty("options")?;
        let rest = drawings.extra(&["layers", "options"]);
        if !rest.is_empty() {
            parts.opaque.insert("drawings", rest);
        }
    }

    decode_pictures(&record, &mut parts, ctx)?;

    if let Some(max) = record.opt_i64("maxDictId")? {
        parts.dictionary.observe(u32::try_from(max).unwrap_or(0));
    }

    let tolerant = ctx.options().tolerant;
    for (key, value) in root.iter() {
        let name = match key {
            Key::Str(s) if MODELED_KEYS.contains(&s.as_str()) => continue,
            Key::Str(s) if OPAQUE_KEYS.contains(&s.as_str()) => {
                parts.opaque.insert(s.as_str(), value.clone());
                continue;
            }
            other => other.to_string(),
        };
        if tolerant {
            tracing::debug!(key = %name, "Keeping unknown root key");
            parts.unknown.insert(key.clone(), value.clone());
        } else {
            ctx.diagnostics_mut().info(
                Category::UnknownKeyDropped,
                format!("Unknown root key '{}' dropped", name),
                Some(name.as_str()),
            );
        }
    }

    Ok(parts)
}

fn picture_list(keys: &[ResourceKey], ctx: &SaveContext<'_>) -> Result<Table> {
    let values = keys.iter().map(|k| ctx.key(k)).collect::<Result<Vec<Value>>>()?;
    Ok(Table::from_sequence(values))
}

/// Encode the `mission` root table
pub fn encode_mission(mission: &Mission) -> Result<Table> {
    let ctx = SaveContext::new(mission.resources());
    let mut root = Table::new();
    encode_settings(&mission.settings, &mut root);

    let mut coalition = Table::new();
    let mut members = Table::new();
    for side in Side::ALL {
        let c = mission.coalition(side);
        coalition.insert(side.key(), encode_coalition(c, &ctx)?);
        members.insert(side.key(), encode_members(c));
        let field = format!("pictureFileName{}", side.picture_suffix());
        root.insert(field, picture_list(mission.pictures(side), &ctx)?);
    }
    root.insert("coalition", coalition);
    root.insert("coalitions", members);

    let mut triggers = Table::new().with("zones", encode_items(mission.zones(), &ctx)?);
    if let Some(rest) = mission.opaque.get("triggers").and_then(Value::as_table) {
        triggers.merge_missing(rest);
    }
    root.insert("triggers", triggers);
    root.insert("trigrules", encode_items(mission.triggers(), &ctx)?);
    root.insert("goals", encode_items(mission.goals(), &ctx)?);

    let mut drawings = Table::new()
        .with("options", mission.drawing_options.clone())
        .with("layers", encode_items(mission.layers(), &ctx)?);
    if let Some(rest) = mission.opaque.get("drawings").and_then(Value::as_table) {
        drawings.merge_missing(rest);
    }
    root.insert("drawings", drawings);

    let modules: Table = mission
        .required_modules
        .iter()
        .map(|(k, v)| (Key::from(k.as_str()), Value::from(v)))
        .collect();
    root.insert("requiredModules", modules);
    root.insert(
        "maxDictId",
        mission.dictionary.max_id().max(mission.resources().max_index()),
    );

    // "triggers" and "drawings" are already present, so their opaque rests are skipped here
    root.merge_missing(&mission.opaque);
    root.merge_missing(&mission.unknown);
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortie_domain::{GroupKind, IdRegistry, Position};
    use sortie_resources::{Bucket, ResourceStore};
    use sortie_shared::LoadOptions;

    fn usa(name: &str, id: i64) -> Table {
        Table::new().with("id", id).with("name", name)
    }

    fn root() -> Table {
        let blue = Table::new()
            .with("name", "blue")
            .with("country", Table::from_sequence(vec![usa("USA", 2)]));
        let red = Table::new()
            .with("name", "red")
            .with("country", Table::from_sequence(vec![usa("Russia", 0), usa("USA", 2)]));
        Table::new()
            .with("version", 21)
            .with("theatre", "Syria")
            .with("date", Table::new().with("Day", 14).with("Month", 3).with("Year", 2016))
            .with("start_time", 28800)
            .with("descriptionText", "DictKey_descriptionText_1")
            .with("coalition", Table::new().with("blue", blue).with("red", red))
            .with(
                "coalitions",
                Table::new()
                    .with("blue", Table::from_sequence(vec![2, 21]))
                    .with("red", Table::from_sequence(vec![0])),
            )
            .with("requiredModules", Table::new().with("A-10C", "A-10C"))
            .with("failures", Table::new())
            .with("maxDictId", 5)
            .with("cockpitTheme", "night")
    }

    fn decode(table: &Table, options: &LoadOptions) -> Result<(MissionParts, sortie_shared::Diagnostics)> {
        let store = ResourceStore::new();
        let mut ctx = LoadContext::new(options, &store);
        let parts = decode_mission(table, &mut ctx)?;
        let (_, diagnostics) = ctx.finish();
        Ok((parts, diagnostics))
    }

    #[test]
    fn test_settings_decoded() {
        let (parts, _) = decode(&root(), &LoadOptions::default()).unwrap();
        assert_eq!(parts.settings.theatre, "Syria");
        assert_eq!(parts.settings.date, NaiveDate::from_ymd_opt(2016, 3, 14).unwrap());
        assert_eq!(
            parts.settings.description_text,
            Some(StringKey::new("DictKey_descriptionText_1"))
        );
        assert_eq!(parts.dictionary.max_id(), 5);
        assert!(parts.opaque.contains("failures"));
    }

    #[test]
    fn test_country_conflict_first_side_wins() {
        let (parts, diagnostics) = decode(&root(), &LoadOptions::default()).unwrap();
        let red = parts.coalitions.iter().find(|c| c.side == Side::Red).unwrap();
        assert!(red.country("USA").is_none());
        assert!(red.country("Russia").is_some());
        assert_eq!(diagnostics.by_category(Category::CountryConflict).len(), 1);

        let err = decode(&root(), &LoadOptions::strict()).unwrap_err();
        assert!(matches!(err, MizError::CountryConflict { .. }));
    }

    #[test]
    fn test_unknown_root_key_policy() {
        let (parts, diagnostics) = decode(&root(), &LoadOptions::default()).unwrap();
        assert!(parts.unknown.is_empty());
        assert_eq!(diagnostics.by_category(Category::UnknownKeyDropped).len(), 1);

        let (parts, diagnostics) = decode(&root(), &LoadOptions::tolerant()).unwrap();
        assert_eq!(parts.unknown.get("cockpitTheme").and_then(Value::as_str), Some("night"));
        assert!(diagnostics.by_category(Category::UnknownKeyDropped).is_empty());
    }

    #[test]
    fn test_invalid_date() {
        let table = root().with("date", Table::new().with("Day", 31).with("Month", 2).with("Year", 2016));
        let err = decode(&table, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, MizError::MalformedRecord(ref m) if m.field == "date"));
    }

    #[test]
    fn test_encode_decode_keeps_graph() {
        let (parts, _) = decode(&root(), &LoadOptions::tolerant()).unwrap();
        let mut mission = Mission::from_parts(parts, IdRegistry::new(), ResourceStore::new());
        let group = mission
            .create_group(Side::Blue, "USA", GroupKind::Vehicle, "Armor", Position::new(1.0, 2.0))
            .unwrap();

        let encoded = encode_mission(&mission).unwrap();
        assert_eq!(encoded.get("cockpitTheme").and_then(Value::as_str), Some("night"));
        assert!(encoded.contains("failures"));

        let (parts, _) = decode(&encoded, &LoadOptions::tolerant()).unwrap();
        let reloaded = Mission::from_parts(parts, IdRegistry::new(), ResourceStore::new());
        assert_eq!(reloaded.group(group).map(|g| g.name.as_str()), Some("Armor"));
        assert_eq!(reloaded.coalition(Side::Blue).members, vec![2, 21]);
        assert_eq!(reloaded.required_modules.get("A-10C").map(String::as_str), Some("A-10C"));
        assert_eq!(reloaded.settings, mission.settings);
    }

    #[test]
    fn test_missing_picture_reported() {
        let mut store = ResourceStore::new();
        let key = store
            .add_bytes(&Bucket::default(), "brief.png", b"png", "ImageBriefing")
            .unwrap();
        let table = root().with(
            "pictureFileNameB",
            Table::from_sequence(vec![key.as_str(), "ResKey_ImageBriefing_99"]),
        );

        let options = LoadOptions::default();
        let mut ctx = LoadContext::new(&options, &store);
        let parts = decode_mission(&table, &mut ctx).unwrap();
        assert_eq!(parts.pictures.get(&Side::Blue).map(Vec::len), Some(1));

        let (_, diagnostics) = ctx.finish();
        assert_eq!(diagnostics.by_category(Category::MissingResource).len(), 1);
    }
}
