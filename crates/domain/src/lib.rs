//! # Sortie Domain Layer
//!
//! The typed mission graph.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Domain Layer (This Crate)                     │
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │  model/   - Mission, coalitions, groups, units, triggers    ││
//! │  │  service/ - Identifier registry, whole-graph repairs        ││
//! │  └─────────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything that carries a global id (groups, units, trigger zones) gets
//! it from the mission's [`IdRegistry`]. References between entities are
//! ids, never pointers: a trigger condition holds a [`ZoneRef`] and asks
//! the mission to resolve it.

pub mod model;
pub mod service;

// Re-export commonly used types
pub use model::{
    country::{Coalition, Country, Side},
    dictionary::{Dictionary, StringKey},
    drawing::{
        Drawing, DrawingCommon, IconDrawing, Layer, LineDrawing, LineMode, LineStyle,
        PolygonDrawing, PolygonShape, Rgba, TextBoxDrawing, UnknownStyle,
    },
    group::{Group, GroupKind},
    ids::{GroupId, Position, UnitId, ZoneId},
    mission::{Mission, MissionParts},
    route::{AltitudeType, Attachment, TaskRecord, Waypoint, OPTION_ACTION, WRAPPED_ACTION},
    settings::MissionSettings,
    trigger::{Goal, GoalSide, Param, Rule, Trigger, TriggerMode, ZoneRef},
    unit::{
        Callsign, FlyingData, NewUnit, RadioPreset, ShipData, Skill, StaticData, Unit, UnitRole,
        VehicleData,
    },
    zone::{TriggerZone, ZoneShape},
};

pub use service::{
    id_registry::IdRegistry,
    onboard::OnboardChange,
    renumber::Renumbering,
};
