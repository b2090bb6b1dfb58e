//! Group codec

use crate::context::{LoadContext, SaveContext};
use crate::record::Record;
use crate::route::{decode_route, encode_route};
use crate::unit::{decode_unit, encode_unit};
use sortie_domain::{Group, GroupId, GroupKind, Position};
use sortie_shared::{IdKind, Result};
use sortie_table::Table;

const GROUP_FIELDS: [&str; 15] = [
    "groupId",
    "name",
    "x",
    "y",
    "hidden",
    "lateActivation",
    "start_time",
    "task",
    "frequency",
    "modulation",
    "uncontrolled",
    "password",
    "NavTargetPoints",
    "route",
    "units",
];

/// Decode one group of `kind`; broken units are handled by the load's strictness
pub fn decode_group(record: &Record<'_>, kind: GroupKind, ctx: &mut LoadContext<'_>) -> Result<Group> {
    let id = record.id("groupId")?;
    let mut group = Group::new(
        GroupId::new(id),
        kind,
        record.str("name")?,
        Position::new(record.f64("x")?, record.f64("y")?),
    );
    group.hidden = record.bool_or("hidden", false)?;
    group.late_activation = record.bool_or("lateActivation", false)?;
    group.start_time = record.i64_or("start_time", 0)?;
    group.task = record.opt_str("task")?.map(str::to_string);
    group.frequency = record.opt_f64("frequency")?;
    group.modulation = record.opt_i64("modulation")?;
    group.uncontrolled = record.bool_or("uncontrolled", false)?;
    group.password = record.opt_str("password")?.map(str::to_string);
    group.nav_target_points = record.opt_table("NavTargetPoints")?.cloned();
    group.extra = record.extra(&GROUP_FIELDS);

    let (route, route_extra) = decode_route(record, ctx)?;
    group.route = route;
    group.route_extra = route_extra;

    if let Some(units) = record.opt_record("units")? {
        for unit in units.items()? {
            if let Some(unit) = ctx.decode_record(|ctx| decode_unit(&unit, kind, ctx))? {
                group.units.push(unit);
            }
        }
    }

    ctx.register(IdKind::Group, id, record.path());
    Ok(group)
}

pub fn encode_group(group: &Group, ctx: &SaveContext<'_>) -> Result<Table> {
    let mut table = Table::new()
        .with("groupId", group.id.get())
        .with("name", &group.name)
        .with("x", group.position.x)
        .with("y", group.position.y)
        .with("hidden", group.hidden)
        .with("start_time", group.start_time)
        .with("route", encode_route(&group.route, &group.route_extra, ctx)?)
        .with("units", Table::from_sequence(group.units.iter().map(encode_unit)));

    if group.late_activation {
        table.insert("lateActivation", true);
    }
    if group.kind.is_flying() {
        table.insert("uncontrolled", group.uncontrolled);
    }
    if let Some(task) = &group.task {
        table.insert("task", task);
    }
    if let Some(frequency) = group.frequency {
        table.insert("frequency", frequency);
    }
    if let Some(modulation) = group.modulation {
        table.insert("modulation", modulation);
    }
    if let Some(password) = &group.password {
        table.insert("password", password);
    }
    if let Some(points) = &group.nav_target_points {
        table.insert("NavTargetPoints", points.clone());
    }
    table.merge_missing(&group.extra);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortie_domain::UnitId;
    use sortie_resources::ResourceStore;
    use sortie_shared::{Category, LoadOptions, MizError};
    use sortie_table::Value;

    fn vehicle(id: i64, name: &str) -> Table {
        Table::new()
            .with("unitId", id)
            .with("name", name)
            .with("type", "M-1 Abrams")
            .with("x", 1.0)
            .with("y", 2.0)
            .with("heading", 0.0)
            .with("skill", "Average")
            .with("playerCanDrive", true)
    }

    fn group_table(units: Table) -> Table {
        Table::new()
            .with("groupId", 2)
            .with("name", "Armor")
            .with("x", 1.0)
            .with("y", 2.0)
            .with("hidden", false)
            .with("start_time", 0)
            .with("task", "Ground Nothing")
            .with("visible", false)
            .with("route", Table::new().with("points", Table::new()))
            .with("units", units)
    }

    #[test]
    fn test_group_round_trip() {
        let options = LoadOptions::default();
        let store = ResourceStore::new();
        let mut ctx = LoadContext::new(&options, &store);

        let table = group_table(Table::from_sequence(vec![vehicle(3, "Tank 1"), vehicle(4, "Tank 2")]));
        let group = decode_group(&Record::new(&table, "g"), GroupKind::Vehicle, &mut ctx).unwrap();
        assert_eq!(group.id, GroupId::new(2));
        assert_eq!(group.units.len(), 2);
        assert_eq!(group.units[1].id, UnitId::new(4));
        assert_eq!(group.extra.get("visible"), Some(&Value::Bool(false)));

        let encoded = encode_group(&group, &SaveContext::new(&store)).unwrap();
        assert_eq!(encoded, table);

        let (registry, _) = ctx.finish();
        assert!(registry.contains(IdKind::Group, 2));
        assert!(registry.contains(IdKind::Unit, 4));
    }

    #[test]
    fn test_broken_unit_skipped_when_lenient() {
        let options = LoadOptions::default();
        let store = ResourceStore::new();
        let mut ctx = LoadContext::new(&options, &store);

        let broken = vehicle(4, "Tank 2").with("x", "far away");
        let table = group_table(Table::from_sequence(vec![vehicle(3, "Tank 1"), broken]));
        let group = decode_group(&Record::new(&table, "g"), GroupKind::Vehicle, &mut ctx).unwrap();
        assert_eq!(group.units.len(), 1);

        let (_, diagnostics) = ctx.finish();
        let skipped = diagnostics.by_category(Category::MalformedRecordSkipped);
        assert_eq!(skipped[0].path.as_deref(), Some("g.units[2]"));
    }

    #[test]
    fn test_broken_unit_fails_strict_load() {
        let options = LoadOptions::strict();
        let store = ResourceStore::new();
        let mut ctx = LoadContext::new(&options, &store);

        let broken = vehicle(4, "Tank 2").with("x", "far away");
        let table = group_table(Table::from_sequence(vec![broken]));
        let err = decode_group(&Record::new(&table, "g"), GroupKind::Vehicle, &mut ctx).unwrap_err();
        assert!(matches!(err, MizError::MalformedRecord(_)));
    }
}
