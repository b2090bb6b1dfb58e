//! Global mission settings

use super::dictionary::StringKey;
use chrono::NaiveDate;
use sortie_table::Table;

/// Terrain a new mission is placed on
pub const DEFAULT_THEATRE: &str = "Caucasus";
/// Format version written by current simulator builds
pub const FORMAT_VERSION: i64 = 21;

#[derive(Debug, Clone, PartialEq)]
pub struct MissionSettings {
    pub version: i64,
    pub theatre: String,
    pub date: NaiveDate,
    /// Seconds after midnight
    pub start_time: i64,
    pub description_text: Option<StringKey>,
    pub description_blue_task: Option<StringKey>,
    pub description_red_task: Option<StringKey>,
    pub description_neutrals_task: Option<StringKey>,
    pub sortie: Option<StringKey>,
    /// Weather block, kept opaque
    pub weather: Table,
    /// Editor map view, kept opaque
    pub map: Table,
}

impl Default for MissionSettings {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            theatre: DEFAULT_THEATRE.to_string(),
            date: NaiveDate::from_ymd_opt(2011, 6, 1).unwrap_or_default(),
            start_time: 43200,
            description_text: None,
            description_blue_task: None,
            description_red_task: None,
            description_neutrals_task: None,
            sortie: None,
            weather: Table::new(),
            map: Table::new(),
        }
    }
}
