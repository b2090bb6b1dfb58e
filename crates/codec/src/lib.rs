//! # Sortie Codec
//!
//! Entity codecs: each family converts between its typed form and one
//! [`Table`](sortie_table::Table) record. Polymorphic families read a
//! discriminator first and dispatch on it; integer-keyed sub-collections
//! are sorted numerically on load and renumbered 1..n on save.
//!
//! A load threads a [`LoadContext`] through the codecs. It registers every
//! id it meets and, in lenient mode, turns a broken record into a
//! diagnostic instead of failing the whole document.

pub mod codec;
pub mod context;
pub mod country;
pub mod drawing;
pub mod group;
pub mod mission;
pub mod record;
pub mod route;
pub mod trigger;
pub mod unit;
pub mod zone;

pub use codec::{decode_field, decode_items, encode_items, EntityCodec};
pub use context::{referenced_keys, LoadContext, SaveContext};
pub use mission::{decode_mission, encode_mission};
pub use record::Record;
