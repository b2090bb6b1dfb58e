//! Domain services - operations that need the whole graph

pub mod id_registry;
pub mod onboard;
pub mod renumber;
