//! Route codecs: waypoints and their combo-task attachments

use crate::codec::{decode_field, EntityCodec};
use crate::context::{LoadContext, SaveContext};
use crate::record::Record;
use sortie_domain::{AltitudeType, Attachment, Position, TaskRecord, Waypoint, OPTION_ACTION, WRAPPED_ACTION};
use sortie_shared::{MizError, Result};
use sortie_table::{Table, Value};

const COMBO_TASK: &str = "ComboTask";

const TASK_FIELDS: [&str; 5] = ["id", "number", "enabled", "auto", "params"];

const WAYPOINT_FIELDS: [&str; 13] = [
    "x",
    "y",
    "alt",
    "alt_type",
    "type",
    "action",
    "speed",
    "ETA",
    "ETA_locked",
    "speed_locked",
    "name",
    "task",
    "number",
];

impl EntityCodec for Attachment {
    const FAMILY: &'static str = "task";

    fn decode(record: &Record<'_>, _ctx: &mut LoadContext<'_>) -> Result<Self> {
        let Some(id) = record.opt_str("id")? else {
            return Err(MizError::unsupported(Self::FAMILY, record.path(), None));
        };
        let task = TaskRecord {
            id: id.to_string(),
            enabled: record.bool_or("enabled", true)?,
            auto: record.bool_or("auto", false)?,
            params: record.table_or_empty("params")?,
            extra: record.extra(&TASK_FIELDS),
        };

        if task.id != WRAPPED_ACTION {
            return Ok(Attachment::Task(task));
        }
        Ok(match task.action_id() {
            Some(OPTION_ACTION) => Attachment::Option(task),
            _ => Attachment::Command(task),
        })
    }

    fn encode(&self, _ctx: &SaveContext<'_>) -> Result<Table> {
        let task = self.record();
        let mut table = Table::new()
            .with("id", &task.id)
            .with("enabled", task.enabled)
            .with("auto", task.auto)
            .with("params", task.params.clone());
        table.merge_missing(&task.extra);
        Ok(table)
    }
}

impl EntityCodec for Waypoint {
    const FAMILY: &'static str = "waypoint";

    fn decode(record: &Record<'_>, ctx: &mut LoadContext<'_>) -> Result<Self> {
        let altitude_type = match record.opt_str("alt_type")? {
            None => None,
            Some(tag) => Some(AltitudeType::parse(tag).ok_or_else(|| {
                MizError::malformed(record.path(), "alt_type", format!("unknown altitude type '{}'", tag))
            })?),
        };

        let mut extra = record.extra(&WAYPOINT_FIELDS);
        let mut attachments = Vec::new();
        if let Some(task) = record.opt_record("task")? {
            if task.opt_str("id")? == Some(COMBO_TASK) {
                attachments = match task.opt_record("params")? {
                    Some(params) => decode_field(&params, "tasks", ctx)?,
                    None => Vec::new(),
                };
            } else {
                extra.insert("task", task.table().clone());
            }
        }

        Ok(Waypoint {
            position: Position::new(record.f64("x")?, record.f64("y")?),
            altitude: record.f64_or("alt", 0.0)?,
            altitude_type,
            kind: record.str_or("type", "Turning Point")?,
            action: record.str_or("action", "Turning Point")?,
            speed: record.f64_or("speed", 0.0)?,
            eta: record.f64_or("ETA", 0.0)?,
            eta_locked: record.bool_or("ETA_locked", false)?,
            speed_locked: record.bool_or("speed_locked", true)?,
            name: record.opt_str("name")?.map(str::to_string),
            attachments,
            extra,
        })
    }

    fn encode(&self, ctx: &SaveContext<'_>) -> Result<Table> {
        let mut table = Table::new()
            .with("x", self.position.x)
            .with("y", self.position.y)
            .with("alt", self.altitude)
            .with("type", &self.kind)
            .with("action", &self.action)
            .with("speed", self.speed)
            .with("ETA", self.eta)
            .with("ETA_locked", self.eta_locked)
            .with("speed_locked", self.speed_locked);
        if let Some(alt_type) = self.altitude_type {
            table.insert("alt_type", alt_type.as_str());
        }
        if let Some(name) = &self.name {
            table.insert("name", name);
        }

        if !self.extra.contains("task") {
            let mut tasks = Vec::with_capacity(self.attachments.len());
            for (i, attachment) in self.attachments.iter().enumerate() {
                let mut task = attachment.encode(ctx)?;
                task.insert("number", (i + 1) as i64);
                tasks.push(task);
            }
            let combo = Table::new()
                .with("id", COMBO_TASK)
                .with("params", Table::new().with("tasks", Table::from_sequence(tasks)));
            table.insert("task", combo);
        }
        table.merge_missing(&self.extra);
        Ok(table)
    }
}

/// `route = { points = {...}, <extra> }` split into its waypoints and the rest
pub fn decode_route(group: &Record<'_>, ctx: &mut LoadContext<'_>) -> Result<(Vec<Waypoint>, Table)> {
    match group.opt_record("route")? {
        Some(route) => {
            let points = decode_field(&route, "points", ctx)?;
            Ok((points, route.extra(&["points"])))
        }
        None => Ok((Vec::new(), Table::new())),
    }
}

pub fn encode_route(points: &[Waypoint], route_extra: &Table, ctx: &SaveContext<'_>) -> Result<Value> {
    let mut route = Table::new().with("points", crate::codec::encode_items(points, ctx)?);
    route.merge_missing(route_extra);
    Ok(Value::Table(route))
}
