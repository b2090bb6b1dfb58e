//! Triggers, goals and their rules
//!
//! The condition and action vocabulary is not modeled: a rule is a
//! predicate name plus a parameter bag. Two kinds of parameter get typed
//! handles because the graph has to follow them: zone ids and resource
//! keys.

use super::ids::ZoneId;
use sortie_resources::ResourceKey;
use sortie_table::{Table, Value};
use std::collections::BTreeMap;

/// Weak reference to a trigger zone; resolve it through the mission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneRef(pub ZoneId);

/// A rule parameter
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Value(Value),
    Zone(ZoneRef),
    Resource(ResourceKey),
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        Param::Value(value)
    }
}

impl From<ZoneRef> for Param {
    fn from(zone: ZoneRef) -> Self {
        Param::Zone(zone)
    }
}

impl From<ResourceKey> for Param {
    fn from(key: ResourceKey) -> Self {
        Param::Resource(key)
    }
}

/// One condition or action
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Condition or action name, e.g. `c_unit_in_zone`
    pub predicate: String,
    pub params: BTreeMap<String, Param>,
}

impl Rule {
    pub fn new(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            params: BTreeMap::new(),
        }
    }

    /// Builder: set a parameter
    pub fn with(mut self, name: impl Into<String>, param: impl Into<Param>) -> Self {
        self.params.insert(name.into(), param.into());
        self
    }

    pub fn zone_refs(&self) -> impl Iterator<Item = ZoneRef> + '_ {
        self.params.values().filter_map(|p| match p {
            Param::Zone(zone) => Some(*zone),
            _ => None,
        })
    }

    pub fn resource_keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.params.values().filter_map(|p| match p {
            Param::Resource(key) => Some(key),
            _ => None,
        })
    }
}

/// When a trigger fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerMode {
    Once,
    Continuous,
    Start,
    Front,
}

impl TriggerMode {
    pub const ALL: [TriggerMode; 4] = [
        TriggerMode::Once,
        TriggerMode::Continuous,
        TriggerMode::Start,
        TriggerMode::Front,
    ];

    /// Tag as written to the file (the misspelling is the simulator's)
    pub fn tag(&self) -> &'static str {
        match self {
            TriggerMode::Once => "triggerOnce",
            TriggerMode::Continuous => "triggerContinious",
            TriggerMode::Start => "triggerStart",
            TriggerMode::Front => "triggerFront",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.tag() == tag)
    }
}

/// A mission trigger
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub mode: TriggerMode,
    pub comment: String,
    pub event_list: String,
    /// Editor color, `0xRRGGBBAA`
    pub color: Option<String>,
    pub conditions: Vec<Rule>,
    pub actions: Vec<Rule>,
    pub extra: Table,
}

impl Trigger {
    pub fn new(mode: TriggerMode, comment: impl Into<String>) -> Self {
        Self {
            mode,
            comment: comment.into(),
            event_list: String::new(),
            color: None,
            conditions: Vec::new(),
            actions: Vec::new(),
            extra: Table::new(),
        }
    }

    /// Builder: append a condition
    pub fn with_condition(mut self, rule: Rule) -> Self {
        self.conditions.push(rule);
        self
    }

    /// Builder: append an action
    pub fn with_action(mut self, rule: Rule) -> Self {
        self.actions.push(rule);
        self
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.conditions.iter().chain(self.actions.iter())
    }

    pub fn zone_refs(&self) -> impl Iterator<Item = ZoneRef> + '_ {
        self.rules().flat_map(Rule::zone_refs)
    }
}

/// Who a goal scores for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoalSide {
    Offline,
    Blue,
    Red,
}

impl GoalSide {
    pub fn tag(&self) -> &'static str {
        match self {
            GoalSide::Offline => "OFFLINE",
            GoalSide::Blue => "BLUE",
            GoalSide::Red => "RED",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "OFFLINE" => Some(GoalSide::Offline),
            "BLUE" => Some(GoalSide::Blue),
            "RED" => Some(GoalSide::Red),
            _ => None,
        }
    }
}

/// A scoring goal
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub side: GoalSide,
    pub score: i64,
    pub comment: String,
    pub rules: Vec<Rule>,
    pub extra: Table,
}

impl Goal {
    pub fn new(side: GoalSide, score: i64, comment: impl Into<String>) -> Self {
        Self {
            side,
            score,
            comment: comment.into(),
            rules: Vec::new(),
            extra: Table::new(),
        }
    }
}
