//! Configuration types for loading and saving missions

use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do with a record that cannot be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Skip the record and report a diagnostic (default)
    #[default]
    Lenient,
    /// Abort the whole load
    Strict,
}

/// Options for a mission load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadOptions {
    /// Preserve unrecognized top-level keys and re-emit them on save
    #[serde(default)]
    pub tolerant: bool,

    /// Policy for malformed or unsupported records
    #[serde(default)]
    pub strictness: Strictness,
}

impl LoadOptions {
    pub fn tolerant() -> Self {
        Self {
            tolerant: true,
            ..Default::default()
        }
    }

    pub fn strict() -> Self {
        Self {
            strictness: Strictness::Strict,
            ..Default::default()
        }
    }
}

/// Archive entry compression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Deflated,
    Stored,
}

/// Options for a mission save
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOptions {
    #[serde(default)]
    pub compression: Compression,
}

/// Combined container configuration (config.json / config.yaml)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerConfig {
    #[serde(default)]
    pub load: LoadOptions,

    #[serde(default)]
    pub save: SaveOptions,
}

impl ContainerConfig {
    /// Load configuration from a JSON or YAML file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        let config: Self = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        Ok(config)
    }
}
