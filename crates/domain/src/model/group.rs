//! Group - units sharing a movement role and a route

use super::ids::{GroupId, Position};
use super::route::Waypoint;
use super::unit::{Unit, UnitRole};
use sortie_table::Table;

/// Movement role of a group; fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKind {
    Vehicle,
    Plane,
    Helicopter,
    Ship,
    Static,
}

impl GroupKind {
    /// File order of the per-country group collections
    pub const ALL: [GroupKind; 5] = [
        GroupKind::Ship,
        GroupKind::Vehicle,
        GroupKind::Plane,
        GroupKind::Helicopter,
        GroupKind::Static,
    ];

    /// Collection name inside a country record
    pub fn key(&self) -> &'static str {
        match self {
            GroupKind::Vehicle => "vehicle",
            GroupKind::Plane => "plane",
            GroupKind::Helicopter => "helicopter",
            GroupKind::Ship => "ship",
            GroupKind::Static => "static",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    pub fn is_flying(&self) -> bool {
        matches!(self, GroupKind::Plane | GroupKind::Helicopter)
    }

    /// Whether a unit with this role may join a group of this kind
    pub fn accepts(&self, role: &UnitRole) -> bool {
        matches!(
            (self, role),
            (GroupKind::Vehicle, UnitRole::Vehicle(_))
                | (GroupKind::Plane, UnitRole::Flying(_))
                | (GroupKind::Helicopter, UnitRole::Flying(_))
                | (GroupKind::Ship, UnitRole::Ship(_))
                | (GroupKind::Static, UnitRole::Static(_))
        )
    }
}

/// A group of units
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub kind: GroupKind,
    pub name: String,
    pub position: Position,
    pub hidden: bool,
    pub late_activation: bool,
    /// Seconds after mission start
    pub start_time: i64,
    /// Main task, e.g. `CAP` or `Ground Nothing`
    pub task: Option<String>,
    /// Radio frequency in MHz (flying and ship groups)
    pub frequency: Option<f64>,
    pub modulation: Option<i64>,
    pub uncontrolled: bool,
    pub password: Option<String>,
    /// Flying groups only, kept opaque
    pub nav_target_points: Option<Table>,
    pub route: Vec<Waypoint>,
    /// Unmodeled fields of the route record (everything beside its points)
    pub route_extra: Table,
    pub units: Vec<Unit>,
    /// Unmodeled fields, written back untouched
    pub extra: Table,
}

impl Group {
    pub fn new(id: GroupId, kind: GroupKind, name: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            position,
            hidden: false,
            late_activation: false,
            start_time: 0,
            task: None,
            frequency: None,
            modulation: None,
            uncontrolled: false,
            password: None,
            nav_target_points: None,
            route: Vec::new(),
            route_extra: Table::new(),
            units: Vec::new(),
            extra: Table::new(),
        }
    }

    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::unit::{FlyingData, ShipData, StaticData, VehicleData};

    #[test]
    fn test_kind_keys() {
        for kind in GroupKind::ALL {
            assert_eq!(GroupKind::parse(kind.key()), Some(kind));
        }
        assert_eq!(GroupKind::parse("submarine"), None);
    }

    #[test]
    fn test_accepts() {
        let flying = UnitRole::Flying(FlyingData::default());
        assert!(GroupKind::Plane.accepts(&flying));
        assert!(GroupKind::Helicopter.accepts(&flying));
        assert!(!GroupKind::Vehicle.accepts(&flying));
        assert!(GroupKind::Ship.accepts(&UnitRole::Ship(ShipData::default())));
        assert!(GroupKind::Static.accepts(&UnitRole::Static(StaticData::default())));
        assert!(!GroupKind::Static.accepts(&UnitRole::Vehicle(VehicleData::default())));
    }
}
