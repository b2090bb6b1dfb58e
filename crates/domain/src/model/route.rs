//! Route - waypoints and their task attachments

use super::ids::Position;
use sortie_table::{Table, Value};

/// Reference for a waypoint or unit altitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AltitudeType {
    #[default]
    Baro,
    Radio,
}

impl AltitudeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AltitudeType::Baro => "BARO",
            AltitudeType::Radio => "RADIO",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "BARO" => Some(AltitudeType::Baro),
            "RADIO" => Some(AltitudeType::Radio),
            _ => None,
        }
    }
}

/// A task-like record: type tag plus opaque parameters
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    /// Task id, e.g. `EngageTargets` or `WrappedAction`
    pub id: String,
    pub enabled: bool,
    pub auto: bool,
    pub params: Table,
    pub extra: Table,
}

impl TaskRecord {
    pub fn new(id: impl Into<String>, params: Table) -> Self {
        Self {
            id: id.into(),
            enabled: true,
            auto: false,
            params,
            extra: Table::new(),
        }
    }

    /// Wrapped action: `{ id = "WrappedAction", params = { action = { id, params } } }`
    pub fn wrapped(action_id: &str, action_params: Table) -> Self {
        let action = Table::new()
            .with("id", action_id)
            .with("params", action_params);
        Self::new(WRAPPED_ACTION, Table::new().with("action", action))
    }

    /// Inner action id of a wrapped action
    pub fn action_id(&self) -> Option<&str> {
        self.params
            .get("action")
            .and_then(Value::as_table)
            .and_then(|a| a.get("id"))
            .and_then(Value::as_str)
    }
}

pub const WRAPPED_ACTION: &str = "WrappedAction";
/// Inner action id that turns a wrapped action into an option
pub const OPTION_ACTION: &str = "Option";

/// One entry of a waypoint's combo task
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    /// Something the group does (orbit, engage, escort, ...)
    Task(TaskRecord),
    /// A behaviour setting (ROE, reaction to threat, ...)
    Option(TaskRecord),
    /// A one-shot command (set frequency, activate beacon, ...)
    Command(TaskRecord),
}

impl Attachment {
    pub fn record(&self) -> &TaskRecord {
        match self {
            Attachment::Task(r) | Attachment::Option(r) | Attachment::Command(r) => r,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Attachment::Task(_) => "task",
            Attachment::Option(_) => "option",
            Attachment::Command(_) => "command",
        }
    }
}

/// A route point
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub position: Position,
    pub altitude: f64,
    pub altitude_type: Option<AltitudeType>,
    /// Point type, e.g. `Turning Point` or `TakeOffParking`
    pub kind: String,
    /// Movement action, e.g. `Turning Point` or `Off Road`
    pub action: String,
    pub speed: f64,
    pub eta: f64,
    pub eta_locked: bool,
    pub speed_locked: bool,
    pub name: Option<String>,
    pub attachments: Vec<Attachment>,
    pub extra: Table,
}

impl Waypoint {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            altitude: 0.0,
            altitude_type: None,
            kind: "Turning Point".to_string(),
            action: "Turning Point".to_string(),
            speed: 0.0,
            eta: 0.0,
            eta_locked: false,
            speed_locked: true,
            name: None,
            attachments: Vec::new(),
            extra: Table::new(),
        }
    }

    /// Builder: set altitude
    pub fn with_altitude(mut self, altitude: f64, altitude_type: AltitudeType) -> Self {
        self.altitude = altitude;
        self.altitude_type = Some(altitude_type);
        self
    }

    /// Builder: set speed (m/s)
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Builder: append an attachment
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}
