//! Trigger, rule and goal codecs (`trigrules`, `goals`)
//!
//! Rules are `{ predicate = "...", <param> = <value>, ... }`. An integer
//! `zone` parameter becomes a [`ZoneRef`]; a string parameter naming a key
//! issued by the mission's resource store becomes a [`ResourceKey`]
//! (sortie_resources::ResourceKey).

use crate::codec::EntityCodec;
use crate::context::{LoadContext, SaveContext};
use crate::record::Record;
use sortie_domain::{Goal, GoalSide, Param, Rule, Trigger, TriggerMode, ZoneId, ZoneRef};
use sortie_shared::{MizError, Result};
use sortie_table::{Key, Table, Value};
use std::collections::BTreeMap;

const ZONE_PARAM: &str = "zone";

fn decode_rule(record: &Record<'_>, ctx: &LoadContext<'_>) -> Result<Rule> {
    let predicate = record.str("predicate")?.to_string();
    let mut params = BTreeMap::new();

    for (key, value) in record.table().iter() {
        let name = match key {
            Key::Str(s) if s == "predicate" => continue,
            Key::Str(s) => s.clone(),
            Key::Int(i) => {
                return Err(MizError::malformed(
                    record.path(),
                    format!("[{}]", i),
                    "rule parameters must be named",
                ))
            }
        };

        let param = match value {
            Value::Int(id) if name == ZONE_PARAM => match u32::try_from(*id) {
                Ok(id) => Param::Zone(ZoneRef(ZoneId::new(id))),
                Err(_) => Param::Value(value.clone()),
            },
            Value::Str(text) => match ctx.resource(text) {
                Some(key) => Param::Resource(key),
                None => Param::Value(value.clone()),
            },
            other => Param::Value(other.clone()),
        };
        params.insert(name, param);
    }

    Ok(Rule { predicate, params })
}

fn encode_rule(rule: &Rule, ctx: &SaveContext<'_>) -> Result<Table> {
    let mut table = Table::new().with("predicate", &rule.predicate);
    for (name, param) in &rule.params {
        let value = match param {
            Param::Value(v) => v.clone(),
            Param::Zone(zone) => Value::from(zone.0.get()),
            Param::Resource(key) => ctx.key(key)?,
        };
        table.insert(name.as_str(), value);
    }
    Ok(table)
}

/// Rules are kept all-or-nothing: dropping one condition would change what
/// the trigger means, so a broken rule fails its trigger.
fn decode_rules(record: &Record<'_>, field: &str, ctx: &LoadContext<'_>) -> Result<Vec<Rule>> {
    match record.opt_record(field)? {
        Some(rules) => rules.items()?.iter().map(|r| decode_rule(r, ctx)).collect(),
        None => Ok(Vec::new()),
    }
}

fn encode_rules(rules: &[Rule], ctx: &SaveContext<'_>) -> Result<Table> {
    let tables = rules
        .iter()
        .map(|r| encode_rule(r, ctx))
        .collect::<Result<Vec<Table>>>()?;
    Ok(Table::from_sequence(tables))
}

impl EntityCodec for Trigger {
    const FAMILY: &'static str = "trigger";

    fn decode(record: &Record<'_>, ctx: &mut LoadContext<'_>) -> Result<Self> {
        let Some(tag) = record.opt_str("predicate")? else {
            return Err(MizError::unsupported(Self::FAMILY, record.path(), None));
        };
        let mode = TriggerMode::parse(tag).ok_or_else(|| {
            MizError::unsupported(Self::FAMILY, record.path(), Some(tag.to_string()))
        })?;

        Ok(Trigger {
            mode,
            comment: record.str_or("comment", "")?,
            event_list: record.str_or("eventlist", "")?,
            color: record.opt_str("colorItem")?.map(str::to_string),
            conditions: decode_rules(record, "rules", ctx)?,
            actions: decode_rules(record, "actions", ctx)?,
            extra: record.extra(&["predicate", "comment", "eventlist", "colorItem", "rules", "actions"]),
        })
    }

    fn encode(&self, ctx: &SaveContext<'_>) -> Result<Table> {
        let mut table = Table::new()
            .with("predicate", self.mode.tag())
            .with("comment", &self.comment)
            .with("eventlist", &self.event_list)
            .with("rules", encode_rules(&self.conditions, ctx)?)
            .with("actions", encode_rules(&self.actions, ctx)?);
        if let Some(color) = &self.color {
            table.insert("colorItem", color);
        }
        table.merge_missing(&self.extra);
        Ok(table)
    }
}

impl EntityCodec for Goal {
    const FAMILY: &'static str = "goal";

    fn decode(record: &Record<'_>, ctx: &mut LoadContext<'_>) -> Result<Self> {
        let tag = record.str("side")?;
        let side = GoalSide::parse(tag).ok_or_else(|| {
            MizError::unsupported(Self::FAMILY, record.path(), Some(tag.to_string()))
        })?;

        Ok(Goal {
            side,
            score: record.i64_or("score", 0)?,
            comment: record.str_or("comment", "")?,
            rules: decode_rules(record, "rules", ctx)?,
            extra: record.extra(&["side", "score", "comment", "rules"]),
        })
    }

    fn encode(&self, ctx: &SaveContext<'_>) -> Result<Table> {
        let mut table = Table::new()
            .with("side", self.side.tag())
            .with("score", self.score)
            .with("comment", &self.comment)
            .with("rules", encode_rules(&self.rules, ctx)?);
        table.merge_missing(&self.extra);
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortie_resources::{Bucket, ResourceStore};
    use sortie_shared::LoadOptions;

    fn trigger_table() -> Table {
        let condition = Table::new()
            .with("predicate", "c_unit_in_zone")
            .with("unit", 12)
            .with("zone", 3);
        let action = Table::new()
            .with("predicate", "a_out_picture")
            .with("file", "ResKey_Action_7")
            .with("seconds", 10);
        Table::new()
            .with("predicate", "triggerOnce")
            .with("comment", "Show map")
            .with("eventlist", "")
            .with("colorItem", "0x00ff80ff")
            .with("rules", Table::from_sequence(vec![condition]))
            .with("actions", Table::from_sequence(vec![action]))
    }

    #[test]
    fn test_trigger_params_typed() {
        let mut store = ResourceStore::new();
        store
            .ingest(&Bucket::default(), "ResKey_Action_7", "map.png", b"png")
            .unwrap();
        let options = LoadOptions::default();
        let mut ctx = LoadContext::new(&options, &store);

        let table = trigger_table();
        let trigger = Trigger::decode(&Record::new(&table, "trigrules[1]"), &mut ctx).unwrap();

        assert_eq!(trigger.mode, TriggerMode::Once);
        assert_eq!(
            trigger.conditions[0].params.get("zone"),
            Some(&Param::Zone(ZoneRef(ZoneId::new(3))))
        );
        assert!(matches!(trigger.actions[0].params.get("file"), Some(Param::Resource(_))));

        let encoded = trigger.encode(&SaveContext::new(&store)).unwrap();
        assert_eq!(encoded, table);
    }

    #[test]
    fn test_unissued_key_stays_a_string() {
        let store = ResourceStore::new();
        let options = LoadOptions::default();
        let mut ctx = LoadContext::new(&options, &store);

        let table = trigger_table();
        let trigger = Trigger::decode(&Record::new(&table, "trigrules[1]"), &mut ctx).unwrap();
        assert_eq!(
            trigger.actions[0].params.get("file"),
            Some(&Param::Value(Value::from("ResKey_Action_7")))
        );
    }

    #[test]
    fn test_unknown_mode() {
        let store = ResourceStore::new();
        let options = LoadOptions::default();
        let mut ctx = LoadContext::new(&options, &store);

        let table = trigger_table().with("predicate", "triggerSometimes");
        let err = Trigger::decode(&Record::new(&table, "trigrules[1]"), &mut ctx).unwrap_err();
        assert!(matches!(err, MizError::UnsupportedVariant(_)));
    }

    #[test]
    fn test_goal_round_trip() {
        let store = ResourceStore::new();
        let options = LoadOptions::default();
        let mut ctx = LoadContext::new(&options, &store);

        let rule = Table::new().with("predicate", "c_unit_dead").with("unit", 3);
        let table = Table::new()
            .with("side", "BLUE")
            .with("score", 100)
            .with("comment", "Kill the tank")
            .with("predicate", "score")
            .with("rules", Table::from_sequence(vec![rule]));

        let goal = Goal::decode(&Record::new(&table, "goals[1]"), &mut ctx).unwrap();
        assert_eq!(goal.side, GoalSide::Blue);
        assert_eq!(goal.rules.len(), 1);
        assert_eq!(goal.encode(&SaveContext::new(&store)).unwrap(), table);
    }
}
