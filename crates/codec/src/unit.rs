//! Unit codec
//!
//! A unit record carries no discriminator of its own: the collection its
//! group sits in (`vehicle`, `plane`, `helicopter`, `ship`, `static`)
//! decides which role fields are read.

use crate::context::LoadContext;
use crate::record::Record;
use sortie_domain::{
    AltitudeType, Callsign, FlyingData, GroupKind, Position, RadioPreset, ShipData, Skill,
    StaticData, Unit, UnitId, UnitRole, VehicleData,
};
use sortie_shared::{IdKind, MizError, Result};
use sortie_table::{Key, Table, Value};
use std::collections::BTreeMap;

const COMMON_FIELDS: [&str; 7] = ["unitId", "name", "type", "x", "y", "heading", "skill"];

const FLYING_FIELDS: [&str; 8] = [
    "alt",
    "alt_type",
    "speed",
    "onboard_num",
    "callsign",
    "payload",
    "livery_id",
    "Radio",
];

fn role_fields(kind: GroupKind) -> &'static [&'static str] {
    match kind {
        GroupKind::Plane | GroupKind::Helicopter => &FLYING_FIELDS,
        GroupKind::Vehicle => &["playerCanDrive"],
        GroupKind::Ship => &["frequency", "modulation"],
        GroupKind::Static => &["category", "shape_name", "dead"],
    }
}

fn decode_callsign(record: &Record<'_>) -> Result<Option<Callsign>> {
    match record.value("callsign") {
        None => Ok(None),
        Some(Value::Int(n)) => Ok(Some(Callsign::Number(*n))),
        Some(Value::Table(_)) => {
            let callsign = record.record("callsign")?;
            let mut parts = [0i64; 3];
            for (i, part) in parts.iter_mut().enumerate() {
                *part = callsign
                    .table()
                    .get_index(i as i64 + 1)
                    .and_then(Value::as_i64)
                    .ok_or_else(|| MizError::missing(callsign.path(), format!("[{}]", i + 1)))?;
            }
            Ok(Some(Callsign::Named {
                name: callsign.str("name")?.to_string(),
                parts,
            }))
        }
        Some(other) => Err(MizError::malformed(
            record.path(),
            "callsign",
            format!("is a {}, expected integer or table", other.type_name()),
        )),
    }
}

fn encode_callsign(callsign: &Callsign) -> Value {
    match callsign {
        Callsign::Number(n) => Value::Int(*n),
        Callsign::Named { name, parts } => {
            let mut table = Table::from_sequence(parts.iter().copied().map(Value::Int));
            table.insert("name", name);
            Value::Table(table)
        }
    }
}

/// `{ [channel] = value }` with integer channel keys
fn channel_map<T>(
    record: &Record<'_>,
    field: &str,
    convert: impl Fn(&Value) -> Option<T>,
) -> Result<BTreeMap<u32, T>> {
    let mut map = BTreeMap::new();
    if let Some(table) = record.opt_table(field)? {
        for (channel, value) in table.indexed() {
            let parsed = u32::try_from(channel)
                .ok()
                .zip(convert(value))
                .ok_or_else(|| {
                    MizError::malformed(record.path(), format!("{}[{}]", field, channel), "invalid preset")
                })?;
            map.insert(parsed.0, parsed.1);
        }
    }
    Ok(map)
}

fn decode_radio(record: &Record<'_>) -> Result<Vec<RadioPreset>> {
    let Some(radios) = record.opt_record("Radio")? else {
        return Ok(Vec::new());
    };
    radios
        .items()?
        .iter()
        .map(|radio| {
            Ok(RadioPreset {
                channels: channel_map(radio, "channels", Value::as_f64)?,
                modulations: channel_map(radio, "modulations", Value::as_i64)?,
                extra: radio.extra(&["channels", "modulations"]),
            })
        })
        .collect()
}

fn encode_radio(radio: &[RadioPreset]) -> Table {
    Table::from_sequence(radio.iter().map(|preset| {
        let channels: Table = preset
            .channels
            .iter()
            .map(|(ch, f)| (Key::Int(i64::from(*ch)), Value::Float(*f)))
            .collect();
        let modulations: Table = preset
            .modulations
            .iter()
            .map(|(ch, m)| (Key::Int(i64::from(*ch)), Value::Int(*m)))
            .collect();
        let mut table = Table::new()
            .with("channels", channels)
            .with("modulations", modulations);
        table.merge_missing(&preset.extra);
        table
    }))
}

fn decode_role(record: &Record<'_>, kind: GroupKind) -> Result<UnitRole> {
    Ok(match kind {
        GroupKind::Plane | GroupKind::Helicopter => {
            let altitude_type = match record.opt_str("alt_type")? {
                None => AltitudeType::default(),
                Some(tag) => AltitudeType::parse(tag).ok_or_else(|| {
                    MizError::malformed(record.path(), "alt_type", format!("unknown altitude type '{}'", tag))
                })?,
            };
            let defaults = FlyingData::default();
            // older files store the tail number as an integer
            let onboard_num = match record.value("onboard_num") {
                Some(Value::Int(n)) => format!("{:03}", n),
                _ => record.str_or("onboard_num", "")?,
            };
            UnitRole::Flying(FlyingData {
                altitude: record.f64_or("alt", defaults.altitude)?,
                altitude_type,
                speed: record.f64_or("speed", defaults.speed)?,
                onboard_num,
                callsign: decode_callsign(record)?,
                payload: record.table_or_empty("payload")?,
                livery_id: record.opt_str("livery_id")?.map(str::to_string),
                radio: decode_radio(record)?,
            })
        }
        GroupKind::Vehicle => UnitRole::Vehicle(VehicleData {
            player_can_drive: record.bool_or("playerCanDrive", false)?,
        }),
        GroupKind::Ship => UnitRole::Ship(ShipData {
            frequency: record.opt_f64("frequency")?,
            modulation: record.opt_i64("modulation")?,
        }),
        GroupKind::Static => UnitRole::Static(StaticData {
            category: record.str_or("category", "")?,
            shape_name: record.opt_str("shape_name")?.map(str::to_string),
            dead: record.bool_or("dead", false)?,
        }),
    })
}

/// Decode one unit of a group of `kind`, registering its id
pub fn decode_unit(record: &Record<'_>, kind: GroupKind, ctx: &mut LoadContext<'_>) -> Result<Unit> {
    let skill = match record.opt_str("skill")? {
        None => None,
        Some(tag) => Some(Skill::parse(tag).ok_or_else(|| {
            MizError::malformed(record.path(), "skill", format!("unknown skill '{}'", tag))
        })?),
    };

    let id = record.id("unitId")?;
    let mut known = COMMON_FIELDS.to_vec();
    known.extend_from_slice(role_fields(kind));

    let unit = Unit {
        id: UnitId::new(id),
        name: record.str("name")?.to_string(),
        unit_type: record.str("type")?.to_string(),
        position: Position::new(record.f64("x")?, record.f64("y")?),
        heading: record.f64_or("heading", 0.0)?,
        skill,
        role: decode_role(record, kind)?,
        extra: record.extra(&known),
    };
    ctx.register(IdKind::Unit, id, record.path());
    Ok(unit)
}

pub fn encode_unit(unit: &Unit) -> Table {
    let mut table = Table::new()
        .with("unitId", unit.id.get())
        .with("name", &unit.name)
        .with("type", &unit.unit_type)
        .with("x", unit.position.x)
        .with("y", unit.position.y)
        .with("heading", unit.heading);
    if let Some(skill) = unit.skill {
        table.insert("skill", skill.as_str());
    }

    match &unit.role {
        UnitRole::Flying(data) => {
            table.insert("alt", data.altitude);
            table.insert("alt_type", data.altitude_type.as_str());
            table.insert("speed", data.speed);
            table.insert("onboard_num", &data.onboard_num);
            table.insert("payload", data.payload.clone());
            if let Some(callsign) = &data.callsign {
                table.insert("callsign", encode_callsign(callsign));
            }
            if let Some(livery) = &data.livery_id {
                table.insert("livery_id", livery);
            }
            if !data.radio.is_empty() {
                table.insert("Radio", encode_radio(&data.radio));
            }
        }
        UnitRole::Vehicle(data) => {
            table.insert("playerCanDrive", data.player_can_drive);
        }
        UnitRole::Ship(data) => {
            if let Some(frequency) = data.frequency {
                table.insert("frequency", frequency);
            }
            if let Some(modulation) = data.modulation {
                table.insert("modulation", modulation);
            }
        }
        UnitRole::Static(data) => {
            table.insert("category", &data.category);
            table.insert("dead", data.dead);
            if let Some(shape) = &data.shape_name {
                table.insert("shape_name", shape);
            }
        }
    }
    table.merge_missing(&unit.extra);
    table
}
