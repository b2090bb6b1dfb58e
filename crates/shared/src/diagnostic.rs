//! Diagnostics - non-fatal findings collected while loading a mission

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// What was repaired, skipped or left unresolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    OnboardNumberReassigned,
    DuplicateIdRenumbered,
    UnsupportedVariantSkipped,
    MalformedRecordSkipped,
    DanglingZoneReference,
    MissingResource,
    UnknownKeyDropped,
    CountryConflict,
}

/// A single finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    /// Location in the root table, when the finding is tied to one record
    pub path: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, category: Category, message: impl Into<String>) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            path: None,
        }
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "[{}] {} ({})", self.severity, self.message, path),
            None => write!(f, "[{}] {}", self.severity, self.message),
        }
    }
}

/// Ordered collector of diagnostics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn info(&mut self, category: Category, message: impl Into<String>, path: Option<&str>) {
        self.record(Severity::Info, category, message, path);
    }

    pub fn warn(&mut self, category: Category, message: impl Into<String>, path: Option<&str>) {
        self.record(Severity::Warn, category, message, path);
    }

    pub fn error(&mut self, category: Category, message: impl Into<String>, path: Option<&str>) {
        self.record(Severity::Error, category, message, path);
    }

    fn record(
        &mut self,
        severity: Severity,
        category: Category,
        message: impl Into<String>,
        path: Option<&str>,
    ) {
        let mut diagnostic = Diagnostic::new(severity, category, message);
        diagnostic.path = path.map(str::to_string);
        self.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of diagnostics with the given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity == severity).count()
    }

    pub fn by_category(&self, category: Category) -> Vec<&Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.category == category)
            .collect()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }

    /// Export as JSON
    pub fn export_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.entries).unwrap_or_default()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_and_count() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn(
            Category::OnboardNumberReassigned,
            "onboard number 010 reassigned to 011",
            Some("coalition.blue.country[USA].plane.group[1].units[2]"),
        );
        diagnostics.info(Category::UnknownKeyDropped, "dropped key 'foo'", None);

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.count(Severity::Warn), 1);
        assert_eq!(diagnostics.count(Severity::Error), 0);
        assert_eq!(
            diagnostics.by_category(Category::UnknownKeyDropped).len(),
            1
        );
    }

    #[test]
    fn test_export_json() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn(Category::MissingResource, "missing briefing.png", Some("l10n/DEFAULT"));

        let json = diagnostics.export_json();
        assert_eq!(json[0]["severity"], "WARN");
        assert_eq!(json[0]["category"], "missing_resource");
        assert_eq!(json[0]["path"], "l10n/DEFAULT");
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::new(Severity::Warn, Category::DanglingZoneReference, "zone 9 not found")
            .at("trigrules[1].rules[1]");
        assert_eq!(d.to_string(), "[WARN] zone 9 not found (trigrules[1].rules[1])");
    }
}
