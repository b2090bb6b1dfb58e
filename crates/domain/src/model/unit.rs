//! Unit - one vehicle, aircraft, ship or static object

use super::ids::{Position, UnitId};
use super::route::AltitudeType;
use sortie_table::Table;
use std::collections::BTreeMap;

/// AI skill level, or a human slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Skill {
    Average,
    Good,
    High,
    Excellent,
    Random,
    Client,
    Player,
}

impl Skill {
    pub const ALL: [Skill; 7] = [
        Skill::Average,
        Skill::Good,
        Skill::High,
        Skill::Excellent,
        Skill::Random,
        Skill::Client,
        Skill::Player,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Skill::Average => "Average",
            Skill::Good => "Good",
            Skill::High => "High",
            Skill::Excellent => "Excellent",
            Skill::Random => "Random",
            Skill::Client => "Client",
            Skill::Player => "Player",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == tag)
    }

    /// Slots a human can occupy
    pub fn is_human(&self) -> bool {
        matches!(self, Skill::Client | Skill::Player)
    }
}

/// Flight callsign
#[derive(Debug, Clone, PartialEq)]
pub enum Callsign {
    /// Plain numeric callsign (eastern aircraft)
    Number(i64),
    /// Named callsign, e.g. `Enfield11` with name index, flight and element
    Named { name: String, parts: [i64; 3] },
}

/// One radio's channel presets, keyed by channel number
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadioPreset {
    pub channels: BTreeMap<u32, f64>,
    pub modulations: BTreeMap<u32, i64>,
    pub extra: Table,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleData {
    pub player_can_drive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlyingData {
    pub altitude: f64,
    pub altitude_type: AltitudeType,
    pub speed: f64,
    /// Tail / onboard number, normally three digits
    pub onboard_num: String,
    pub callsign: Option<Callsign>,
    /// Pylons, fuel, flares, chaff, gun
    pub payload: Table,
    pub livery_id: Option<String>,
    /// Presets per radio, radio 1 first
    pub radio: Vec<RadioPreset>,
}

impl Default for FlyingData {
    fn default() -> Self {
        Self {
            altitude: 2000.0,
            altitude_type: AltitudeType::Baro,
            speed: 138.89,
            onboard_num: String::new(),
            callsign: None,
            payload: Table::new(),
            livery_id: None,
            radio: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipData {
    pub frequency: Option<f64>,
    pub modulation: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticData {
    pub category: String,
    pub shape_name: Option<String>,
    pub dead: bool,
}

/// Role-specific attributes; must match the owning group's kind
#[derive(Debug, Clone, PartialEq)]
pub enum UnitRole {
    Vehicle(VehicleData),
    Flying(FlyingData),
    Ship(ShipData),
    Static(StaticData),
}

impl UnitRole {
    pub fn name(&self) -> &'static str {
        match self {
            UnitRole::Vehicle(_) => "vehicle",
            UnitRole::Flying(_) => "flying",
            UnitRole::Ship(_) => "ship",
            UnitRole::Static(_) => "static",
        }
    }
}

/// A unit inside a group
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    /// Catalog type tag, e.g. `F-15C` or `M-1 Abrams`
    pub unit_type: String,
    pub position: Position,
    pub heading: f64,
    /// Statics have no skill
    pub skill: Option<Skill>,
    pub role: UnitRole,
    /// Unmodeled fields, written back untouched
    pub extra: Table,
}

impl Unit {
    pub fn flying(&self) -> Option<&FlyingData> {
        match &self.role {
            UnitRole::Flying(data) => Some(data),
            _ => None,
        }
    }

    pub fn flying_mut(&mut self) -> Option<&mut FlyingData> {
        match &mut self.role {
            UnitRole::Flying(data) => Some(data),
            _ => None,
        }
    }

    pub fn onboard_num(&self) -> Option<&str> {
        self.flying()
            .map(|f| f.onboard_num.as_str())
            .filter(|n| !n.is_empty())
    }
}

/// Everything needed to add a unit; the id comes from the mission
#[derive(Debug, Clone, PartialEq)]
pub struct NewUnit {
    pub name: String,
    pub unit_type: String,
    pub position: Position,
    pub heading: f64,
    pub skill: Option<Skill>,
    pub role: UnitRole,
}

impl NewUnit {
    pub fn new(name: impl Into<String>, unit_type: impl Into<String>, role: UnitRole) -> Self {
        let skill = match role {
            UnitRole::Static(_) => None,
            _ => Some(Skill::Average),
        };
        Self {
            name: name.into(),
            unit_type: unit_type.into(),
            position: Position::default(),
            heading: 0.0,
            skill,
            role,
        }
    }

    /// Builder: set position
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Builder: set heading (radians)
    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = heading;
        self
    }

    /// Builder: set skill
    pub fn with_skill(mut self, skill: Skill) -> Self {
        self.skill = Some(skill);
        self
    }

    pub(crate) fn into_unit(self, id: UnitId) -> Unit {
        Unit {
            id,
            name: self.name,
            unit_type: self.unit_type,
            position: self.position,
            heading: self.heading,
            skill: self.skill,
            role: self.role,
            extra: Table::new(),
        }
    }
}
