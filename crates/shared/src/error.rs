//! Error types for Sortie

use std::fmt;
use thiserror::Error;

/// Identifier namespaces managed per mission
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IdKind {
    Group,
    Unit,
    Zone,
}

impl IdKind {
    pub const ALL: [IdKind; 3] = [IdKind::Group, IdKind::Unit, IdKind::Zone];

    pub fn as_str(&self) -> &'static str {
        match self {
            IdKind::Group => "group",
            IdKind::Unit => "unit",
            IdKind::Zone => "zone",
        }
    }
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Archive or root table could not be read
#[derive(Debug, Error)]
#[error("Corrupt mission container: {reason}")]
pub struct CorruptContainerError {
    pub reason: String,
}

/// A record is missing a required field (or holds the wrong shape)
#[derive(Debug, Error)]
#[error("Malformed record at '{path}': field '{field}' {problem}")]
pub struct MalformedRecordError {
    pub path: String,
    pub field: String,
    pub problem: String,
}

/// Discriminator value not recognized by any codec of the family
#[derive(Debug, Error)]
#[error("Unsupported {family} variant at '{path}': {}", tag.as_deref().map(|t| format!("'{t}'")).unwrap_or_else(|| "missing discriminator".to_string()))]
pub struct UnsupportedVariantError {
    pub family: String,
    pub path: String,
    pub tag: Option<String>,
}

/// Two entities claim the same global identifier
#[derive(Debug, Error)]
#[error("Duplicate {kind} id {id}")]
pub struct DuplicateIdError {
    pub kind: IdKind,
    pub id: u32,
}

/// A resource key that the current store never issued
#[derive(Debug, Error)]
#[error("Unknown resource key '{key}'")]
pub struct UnknownResourceKeyError {
    pub key: String,
}

/// General Sortie error type
#[derive(Debug, Error)]
pub enum MizError {
    #[error(transparent)]
    CorruptContainer(#[from] CorruptContainerError),

    #[error(transparent)]
    MalformedRecord(#[from] MalformedRecordError),

    #[error(transparent)]
    UnsupportedVariant(#[from] UnsupportedVariantError),

    #[error(transparent)]
    DuplicateId(#[from] DuplicateIdError),

    #[error(transparent)]
    UnknownResourceKey(#[from] UnknownResourceKeyError),

    #[error("Country '{country}' already belongs to coalition '{coalition}'")]
    CountryConflict { country: String, coalition: String },

    #[error("Unit category '{unit}' does not fit a {group} group")]
    UnitKindMismatch { unit: String, group: String },

    #[error("No group with id {0}")]
    UnknownGroup(u32),

    #[error("No country named '{0}'")]
    UnknownCountry(String),

    #[error("No free {0} id left")]
    IdSpaceExhausted(IdKind),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl MizError {
    pub fn corrupt(reason: impl Into<String>) -> Self {
        CorruptContainerError {
            reason: reason.into(),
        }
        .into()
    }

    pub fn malformed(
        path: impl Into<String>,
        field: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        MalformedRecordError {
            path: path.into(),
            field: field.into(),
            problem: problem.into(),
        }
        .into()
    }

    pub fn missing(path: impl Into<String>, field: impl Into<String>) -> Self {
        Self::malformed(path, field, "is missing")
    }

    pub fn unsupported(
        family: impl Into<String>,
        path: impl Into<String>,
        tag: Option<String>,
    ) -> Self {
        UnsupportedVariantError {
            family: family.into(),
            path: path.into(),
            tag,
        }
        .into()
    }

    pub fn unknown_key(key: impl Into<String>) -> Self {
        UnknownResourceKeyError { key: key.into() }.into()
    }

    /// Errors scoped to a single record; a lenient load skips the record instead of failing.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            MizError::MalformedRecord(_) | MizError::UnsupportedVariant(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MizError>;
