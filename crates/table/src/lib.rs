//! # Sortie Table
//!
//! The untyped, nested key-value structure exchanged with the mission
//! container. Records are string-keyed, sequences are integer-keyed.
//!
//! ```text
//! mission =
//! {
//!     ["theatre"] = "Caucasus",
//!     ["pictureFileNameB"] =
//!     {
//!         [1] = "ResKey_ImageBriefing_1",
//!     }, -- end of ["pictureFileNameB"]
//! } -- end of mission
//! ```

pub mod parser;
pub mod value;
pub mod writer;

pub use parser::{parse_assignment, parse_chunk, ParseError};
pub use value::{Key, Table, Value};
pub use writer::to_lua;
