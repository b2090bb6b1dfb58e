//! Trigger zone codec (`triggers.zones`)

use crate::codec::EntityCodec;
use crate::context::{LoadContext, SaveContext};
use crate::record::{points_table, Record};
use sortie_domain::{Position, TriggerZone, ZoneId, ZoneShape};
use sortie_shared::{IdKind, MizError, Result};
use sortie_table::{Table, Value};

const COMMON_FIELDS: [&str; 8] = [
    "zoneId",
    "name",
    "x",
    "y",
    "type",
    "color",
    "hidden",
    "properties",
];

fn decode_color(record: &Record<'_>) -> Result<[f64; 4]> {
    let mut color = [1.0, 1.0, 1.0, 0.15];
    if let Some(table) = record.opt_table("color")? {
        for (i, component) in color.iter_mut().enumerate() {
            if let Some(v) = table.get_index(i as i64 + 1) {
                *component = v.as_f64().ok_or_else(|| {
                    MizError::malformed(record.path(), "color", "components must be numbers")
                })?;
            }
        }
    }
    Ok(color)
}

impl EntityCodec for TriggerZone {
    const FAMILY: &'static str = "zone";

    fn decode(record: &Record<'_>, ctx: &mut LoadContext<'_>) -> Result<Self> {
        // files written before quad zones existed have no type
        let tag = record.i64_or("type", ZoneShape::CIRCLE_TAG)?;
        let (shape, shape_field) = match tag {
            ZoneShape::CIRCLE_TAG => (
                ZoneShape::Circle {
                    radius: record.f64("radius")?,
                },
                "radius",
            ),
            ZoneShape::QUAD_TAG => (
                ZoneShape::QuadPoint {
                    vertices: record.points("verticies")?,
                },
                "verticies",
            ),
            other => {
                return Err(MizError::unsupported(
                    Self::FAMILY,
                    record.path(),
                    Some(other.to_string()),
                ))
            }
        };

        let id = record.id("zoneId")?;
        let mut known = COMMON_FIELDS.to_vec();
        known.push(shape_field);

        let zone = TriggerZone {
            id: ZoneId::new(id),
            name: record.str("name")?.to_string(),
            position: Position::new(record.f64("x")?, record.f64("y")?),
            shape,
            color: decode_color(record)?,
            hidden: record.bool_or("hidden", false)?,
            properties: record.table_or_empty("properties")?,
            extra: record.extra(&known),
        };
        ctx.register(IdKind::Zone, id, record.path());
        Ok(zone)
    }

    fn encode(&self, _ctx: &SaveContext<'_>) -> Result<Table> {
        let mut table = Table::new()
            .with("zoneId", self.id.get())
            .with("name", &self.name)
            .with("x", self.position.x)
            .with("y", self.position.y)
            .with("type", self.shape.tag())
            .with("color", Table::from_sequence(self.color.iter().copied().map(Value::Float)))
            .with("hidden", self.hidden)
            .with("properties", self.properties.clone());
        match &self.shape {
            ZoneShape::Circle { radius } => {
                table.insert("radius", *radius);
            }
            ZoneShape::QuadPoint { vertices } => {
                table.insert("verticies", points_table(vertices));
            }
        }
        table.merge_missing(&self.extra);
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortie_resources::ResourceStore;
    use sortie_shared::LoadOptions;

    fn decode(table: &Table) -> Result<TriggerZone> {
        let options = LoadOptions::default();
        let store = ResourceStore::new();
        let mut ctx = LoadContext::new(&options, &store);
        TriggerZone::decode(&Record::new(table, "triggers.zones[1]"), &mut ctx)
    }

    #[test]
    fn test_circle_zone() {
        let table = Table::new()
            .with("zoneId", 4)
            .with("name", "LZ Alpha")
            .with("x", 100.0)
            .with("y", 200.0)
            .with("radius", 750.0)
            .with("hidden", false)
            .with("color", Table::from_sequence(vec![1.0, 0.0, 0.0, 0.15]));

        let zone = decode(&table).unwrap();
        assert_eq!(zone.id, ZoneId::new(4));
        assert_eq!(zone.radius(), 750.0);
        assert_eq!(zone.color, [1.0, 0.0, 0.0, 0.15]);

        let store = ResourceStore::new();
        let encoded = zone.encode(&SaveContext::new(&store)).unwrap();
        assert_eq!(decode(&encoded).unwrap(), zone);
    }

    #[test]
    fn test_quad_zone_keeps_radius_as_extra() {
        let vertex = |x: f64, y: f64| Table::new().with("x", x).with("y", y);
        let table = Table::new()
            .with("zoneId", 9)
            .with("name", "Box")
            .with("x", 0.0)
            .with("y", 0.0)
            .with("type", 2)
            .with("radius", 100.0)
            .with(
                "verticies",
                Table::from_sequence(vec![
                    vertex(0.0, 0.0),
                    vertex(0.0, 10.0),
                    vertex(10.0, 10.0),
                    vertex(10.0, 0.0),
                ]),
            );

        let zone = decode(&table).unwrap();
        match &zone.shape {
            ZoneShape::QuadPoint { vertices } => assert_eq!(vertices.len(), 4),
            other => panic!("expected quad, got {:?}", other),
        }
        assert_eq!(zone.extra.get("radius"), Some(&Value::Float(100.0)));

        let store = ResourceStore::new();
        let encoded = zone.encode(&SaveContext::new(&store)).unwrap();
        assert_eq!(encoded.get("radius"), Some(&Value::Float(100.0)));
    }

    #[test]
    fn test_unknown_zone_type() {
        let table = Table::new().with("zoneId", 1).with("type", 7);
        assert!(matches!(decode(&table), Err(MizError::UnsupportedVariant(_))));
    }
}
