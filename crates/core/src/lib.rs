//! # Sortie Core
//!
//! Mission container: reads and writes `.miz` archives and runs the
//! validation/repair pass after every load.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        MissionLoader                             │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────────┐  │
//! │  │  container   │──▶│    codec     │──▶│        repair        │  │
//! │  │ zip entries, │   │ tables into  │   │ ids, onboard numbers,│  │
//! │  │  resources   │   │ typed graph  │   │ modules, zone refs   │  │
//! │  └──────────────┘   └──────────────┘   └──────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod container;
pub mod loader;
pub mod repair;

pub use catalog::{ModuleCatalog, StaticModuleCatalog};
pub use container::{read_archive, write_archive};
pub use loader::{save_file, save_writer, Loaded, MissionLoader};
pub use repair::repair;

// Re-export the types every caller needs
pub use sortie_domain::Mission;
pub use sortie_shared::{
    Category, ContainerConfig, Diagnostic, Diagnostics, LoadOptions, MizError, Result,
    SaveOptions, Severity, Strictness,
};
