//! Record - typed field access on a table, with the record's path
//!
//! Every accessor reports problems as `MalformedRecord` naming the full
//! path of the field, e.g. `coalition.blue.country[1].plane.group[2].x`.

use sortie_domain::Position;
use sortie_shared::{MizError, Result};
use sortie_table::{Key, Table, Value};

#[derive(Debug, Clone)]
pub struct Record<'a> {
    table: &'a Table,
    path: String,
}

impl<'a> Record<'a> {
    pub fn new(table: &'a Table, path: impl Into<String>) -> Self {
        Self {
            table,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn field_path(&self, field: &str) -> String {
        if self.path.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.path, field)
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.table.contains(field)
    }

    pub fn value(&self, field: &str) -> Option<&'a Value> {
        self.table.get(field)
    }

    fn wrong_type(&self, field: &str, expected: &str, found: &Value) -> MizError {
        MizError::malformed(
            self.path.clone(),
            field,
            format!("is a {}, expected {}", found.type_name(), expected),
        )
    }

    // ========== Strings ==========

    pub fn opt_str(&self, field: &str) -> Result<Option<&'a str>> {
        match self.value(field) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s)),
            Some(other) => Err(self.wrong_type(field, "string", other)),
        }
    }

    pub fn str(&self, field: &str) -> Result<&'a str> {
        self.opt_str(field)?
            .ok_or_else(|| MizError::missing(self.path.clone(), field))
    }

    pub fn str_or(&self, field: &str, default: &str) -> Result<String> {
        Ok(self.opt_str(field)?.unwrap_or(default).to_string())
    }

    // ========== Numbers ==========

    pub fn opt_f64(&self, field: &str) -> Result<Option<f64>> {
        match self.value(field) {
            None => Ok(None),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.wrong_type(field, "number", v)),
        }
    }

    pub fn f64(&self, field: &str) -> Result<f64> {
        self.opt_f64(field)?
            .ok_or_else(|| MizError::missing(self.path.clone(), field))
    }

    pub fn f64_or(&self, field: &str, default: f64) -> Result<f64> {
        Ok(self.opt_f64(field)?.unwrap_or(default))
    }

    pub fn opt_i64(&self, field: &str) -> Result<Option<i64>> {
        match self.value(field) {
            None => Ok(None),
            Some(v) => v
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.wrong_type(field, "integer", v)),
        }
    }

    pub fn i64(&self, field: &str) -> Result<i64> {
        self.opt_i64(field)?
            .ok_or_else(|| MizError::missing(self.path.clone(), field))
    }

    pub fn i64_or(&self, field: &str, default: i64) -> Result<i64> {
        Ok(self.opt_i64(field)?.unwrap_or(default))
    }

    /// A non-negative id that fits in `u32`
    pub fn id(&self, field: &str) -> Result<u32> {
        let raw = self.i64(field)?;
        u32::try_from(raw).map_err(|_| {
            MizError::malformed(self.path.clone(), field, format!("{} is not a valid id", raw))
        })
    }

    // ========== Booleans ==========

    pub fn opt_bool(&self, field: &str) -> Result<Option<bool>> {
        match self.value(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.wrong_type(field, "boolean", other)),
        }
    }

    pub fn bool(&self, field: &str) -> Result<bool> {
        self.opt_bool(field)?
            .ok_or_else(|| MizError::missing(self.path.clone(), field))
    }

    pub fn bool_or(&self, field: &str, default: bool) -> Result<bool> {
        Ok(self.opt_bool(field)?.unwrap_or(default))
    }

    // ========== Nested tables ==========

    pub fn opt_table(&self, field: &str) -> Result<Option<&'a Table>> {
        match self.value(field) {
            None => Ok(None),
            Some(Value::Table(t)) => Ok(Some(t)),
            Some(other) => Err(self.wrong_type(field, "table", other)),
        }
    }

    /// Clone of a nested table, empty when absent
    pub fn table_or_empty(&self, field: &str) -> Result<Table> {
        Ok(self.opt_table(field)?.cloned().unwrap_or_default())
    }

    pub fn opt_record(&self, field: &str) -> Result<Option<Record<'a>>> {
        Ok(self
            .opt_table(field)?
            .map(|t| Record::new(t, self.field_path(field))))
    }

    pub fn record(&self, field: &str) -> Result<Record<'a>> {
        self.opt_record(field)?
            .ok_or_else(|| MizError::missing(self.path.clone(), field))
    }

    /// Integer-keyed entries of this record, sorted numerically.
    /// Each entry must be a table; its path carries the original key.
    pub fn items(&self) -> Result<Vec<Record<'a>>> {
        self.table
            .indexed()
            .map(|(index, value)| match value {
                Value::Table(t) => Ok(Record::new(t, format!("{}[{}]", self.path, index))),
                other => Err(MizError::malformed(
                    self.path.clone(),
                    format!("[{}]", index),
                    format!("is a {}, expected table", other.type_name()),
                )),
            })
            .collect()
    }

    /// Required point list: `{ [i] = { x = .., y = .. } }`, gaps tolerated
    pub fn points(&self, field: &str) -> Result<Vec<Position>> {
        self.record(field)?
            .items()?
            .iter()
            .map(|p| Ok(Position::new(p.f64("x")?, p.f64("y")?)))
            .collect()
    }

    /// Every field not named in `known`, for round-tripping unmodeled data
    pub fn extra(&self, known: &[&str]) -> Table {
        self.table
            .iter()
            .filter(|(key, _)| match key {
                Key::Str(s) => !known.contains(&s.as_str()),
                Key::Int(_) => true,
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Point list as written on save
pub fn points_table(points: &[Position]) -> Table {
    Table::from_sequence(
        points
            .iter()
            .map(|p| Table::new().with("x", p.x).with("y", p.y)),
    )
}
