//! Mission graph types
//!
//! Names follow the simulator's own vocabulary: coalitions own countries,
//! countries own groups, groups own units and a route of waypoints.

pub mod country;
pub mod dictionary;
pub mod drawing;
pub mod group;
pub mod ids;
pub mod mission;
pub mod route;
pub mod settings;
pub mod trigger;
pub mod unit;
pub mod zone;
