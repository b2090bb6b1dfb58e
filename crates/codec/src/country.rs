//! Coalition and country codecs (`coalition.<side>`, `coalitions`)

use crate::context::{LoadContext, SaveContext};
use crate::group::{decode_group, encode_group};
use crate::record::Record;
use sortie_domain::{Coalition, Country, GroupKind, Position, Side};
use sortie_shared::Result;
use sortie_table::{Table, Value};

fn country_fields() -> Vec<&'static str> {
    let mut known = vec!["id", "name"];
    known.extend(GroupKind::ALL.iter().map(|k| k.key()));
    known
}

pub fn decode_country(record: &Record<'_>, ctx: &mut LoadContext<'_>) -> Result<Country> {
    let mut country = Country::new(record.i64("id")?, record.str("name")?);
    country.extra = record.extra(&country_fields());

    for kind in GroupKind::ALL {
        let Some(collection) = record.opt_record(kind.key())? else {
            continue;
        };
        let Some(groups) = collection.opt_record("group")? else {
            continue;
        };
        for item in groups.items()? {
            if let Some(group) = ctx.decode_record(|ctx| decode_group(&item, kind, ctx))? {
                country.add_group(group);
            }
        }
    }
    Ok(country)
}

pub fn encode_country(country: &Country, ctx: &SaveContext<'_>) -> Result<Table> {
    let mut table = Table::new()
        .with("id", country.id)
        .with("name", &country.name);
    for kind in GroupKind::ALL {
        let groups = country
            .groups(kind)
            .map(|g| encode_group(g, ctx))
            .collect::<Result<Vec<Table>>>()?;
        if !groups.is_empty() {
            table.insert(kind.key(), Table::new().with("group", Table::from_sequence(groups)));
        }
    }
    table.merge_missing(&country.extra);
    Ok(table)
}

/// Decode `coalition.<side>`; `members` is the side's entry of the root
/// `coalitions` list, which also names countries without units.
pub fn decode_coalition(
    record: &Record<'_>,
    side: Side,
    members: Vec<i64>,
    ctx: &mut LoadContext<'_>,
) -> Result<Coalition> {
    let mut coalition = Coalition::new(side);
    coalition.name = record.str_or("name", side.key())?;
    coalition.members = members;
    coalition.nav_points = record.table_or_empty("nav_points")?;
    coalition.extra = record.extra(&["name", "bullseye", "nav_points", "country"]);
    if let Some(bullseye) = record.opt_record("bullseye")? {
        coalition.bullseye = Some(Position::new(bullseye.f64("x")?, bullseye.f64("y")?));
    }

    if let Some(countries) = record.opt_record("country")? {
        for item in countries.items()? {
            if let Some(country) = ctx.decode_record(|ctx| decode_country(&item, ctx))? {
                coalition.insert_country(country);
            }
        }
    }
    Ok(coalition)
}

pub fn encode_coalition(coalition: &Coalition, ctx: &SaveContext<'_>) -> Result<Table> {
    let countries = coalition
        .countries()
        .iter()
        .map(|c| encode_country(c, ctx))
        .collect::<Result<Vec<Table>>>()?;

    let mut table = Table::new()
        .with("name", &coalition.name)
        .with("nav_points", coalition.nav_points.clone())
        .with("country", Table::from_sequence(countries));
    if let Some(bullseye) = coalition.bullseye {
        table.insert("bullseye", Table::new().with("x", bullseye.x).with("y", bullseye.y));
    }
    table.merge_missing(&coalition.extra);
    Ok(table)
}

/// Member country ids of one side in the root `coalitions` table
pub fn decode_members(coalitions: Option<&Table>, side: Side) -> Vec<i64> {
    coalitions
        .and_then(|c| c.get(side.key()))
        .and_then(Value::as_table)
        .map(|list| list.sequence().into_iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default()
}

pub fn encode_members(coalition: &Coalition) -> Table {
    Table::from_sequence(coalition.members.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortie_resources::ResourceStore;
    use sortie_shared::LoadOptions;

    fn plane_group(group_id: i64, unit_id: i64) -> Table {
        let unit = Table::new()
            .with("unitId", unit_id)
            .with("name", format!("Eagle-{}", unit_id))
            .with("type", "F-15C")
            .with("x", 0.0)
            .with("y", 0.0)
            .with("onboard_num", "010");
        Table::new()
            .with("groupId", group_id)
            .with("name", format!("Eagle {}", group_id))
            .with("x", 0.0)
            .with("y", 0.0)
            .with("units", Table::from_sequence(vec![unit]))
    }

    fn blue() -> Table {
        let usa = Table::new()
            .with("id", 2)
            .with("name", "USA")
            .with(
                "plane",
                Table::new().with("group", Table::from_sequence(vec![plane_group(1, 1), plane_group(2, 2)])),
            );
        Table::new()
            .with("name", "blue")
            .with("bullseye", Table::new().with("x", 5.0).with("y", 6.0))
            .with("nav_points", Table::new())
            .with("country", Table::from_sequence(vec![usa]))
    }

    #[test]
    fn test_coalition_decode() {
        let options = LoadOptions::default();
        let store = ResourceStore::new();
        let mut ctx = LoadContext::new(&options, &store);

        let table = blue();
        let coalition =
            decode_coalition(&Record::new(&table, "coalition.blue"), Side::Blue, vec![2, 21], &mut ctx).unwrap();
        assert_eq!(coalition.bullseye, Some(Position::new(5.0, 6.0)));
        assert_eq!(coalition.members, vec![2, 21]);
        let usa = coalition.country("USA").unwrap();
        assert_eq!(usa.groups(GroupKind::Plane).count(), 2);
        assert_eq!(encode_members(&coalition), Table::from_sequence(vec![2, 21]));
    }

    #[test]
    fn test_country_encode_writes_only_used_kinds() {
        let options = LoadOptions::default();
        let store = ResourceStore::new();
        let mut ctx = LoadContext::new(&options, &store);

        let table = blue();
        let coalition =
            decode_coalition(&Record::new(&table, "coalition.blue"), Side::Blue, Vec::new(), &mut ctx).unwrap();
        let encoded = encode_country(&coalition.countries()[0], &SaveContext::new(&store)).unwrap();
        assert!(encoded.contains("plane"));
        assert!(!encoded.contains("vehicle"));
    }

    #[test]
    fn test_skipped_country_leaves_no_ids() {
        let options = LoadOptions::default();
        let store = ResourceStore::new();
        let mut ctx = LoadContext::new(&options, &store);

        // planes decode first, then the broken static collection drops the country
        let usa = Table::new()
            .with("id", 2)
            .with("name", "USA")
            .with("plane", Table::new().with("group", Table::from_sequence(vec![plane_group(1, 1)])))
            .with("static", "broken");
        let table = Table::new().with("country", Table::from_sequence(vec![usa]));
        let coalition =
            decode_coalition(&Record::new(&table, "coalition.blue"), Side::Blue, Vec::new(), &mut ctx).unwrap();
        assert!(coalition.countries().is_empty());

        let (registry, diagnostics) = ctx.finish();
        assert!(registry.is_empty());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_members_list() {
        let root = Table::new().with("red", Table::from_sequence(vec![0, 1]));
        assert_eq!(decode_members(Some(&root), Side::Red), vec![0, 1]);
        assert!(decode_members(Some(&root), Side::Blue).is_empty());
        assert!(decode_members(None, Side::Neutrals).is_empty());
    }
}
