//! # Sortie Shared
//!
//! Common types used across all Sortie crates: the error taxonomy,
//! the diagnostics model produced by a load, and load/save configuration.

pub mod config;
pub mod diagnostic;
pub mod error;

// Re-exports
pub use config::*;
pub use diagnostic::*;
pub use error::*;
