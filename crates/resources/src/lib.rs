//! # Sortie Resources
//!
//! Binary assets (briefing images, sounds, scripts, kneeboard pages)
//! belonging to one mission. Every store stages its files in a private
//! temporary directory, so two missions that both carry `briefing.png`
//! never see each other's bytes.

pub mod key;
pub mod store;

pub use key::{Bucket, ResourceKey, StoreId};
pub use store::{ExportedResource, Kneeboard, ResourceStore};
