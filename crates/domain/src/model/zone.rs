//! Trigger zones

use super::ids::{Position, ZoneId};
use sortie_table::Table;

/// Zone geometry
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneShape {
    /// `type = 0`
    Circle { radius: f64 },
    /// `type = 2`, four corners
    QuadPoint { vertices: Vec<Position> },
}

impl ZoneShape {
    pub const CIRCLE_TAG: i64 = 0;
    pub const QUAD_TAG: i64 = 2;

    pub fn tag(&self) -> i64 {
        match self {
            ZoneShape::Circle { .. } => Self::CIRCLE_TAG,
            ZoneShape::QuadPoint { .. } => Self::QUAD_TAG,
        }
    }
}

/// A named map region referenced by triggers
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerZone {
    pub id: ZoneId,
    pub name: String,
    pub position: Position,
    pub shape: ZoneShape,
    /// RGBA, each component in 0..=1
    pub color: [f64; 4],
    pub hidden: bool,
    /// User properties, kept opaque
    pub properties: Table,
    pub extra: Table,
}

impl TriggerZone {
    pub fn new(id: ZoneId, name: impl Into<String>, position: Position, shape: ZoneShape) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            shape,
            color: [1.0, 1.0, 1.0, 0.15],
            hidden: false,
            properties: Table::new(),
            extra: Table::new(),
        }
    }

    /// Circle radius; quad zones report zero
    pub fn radius(&self) -> f64 {
        match self.shape {
            ZoneShape::Circle { radius } => radius,
            ZoneShape::QuadPoint { .. } => 0.0,
        }
    }
}
