//! Mission - the root aggregate
//!
//! A mission exclusively owns its coalitions, triggers, drawings, its
//! [`IdRegistry`] and its [`ResourceStore`]. Ids and resource keys are only
//! meaningful inside the mission that issued them.

use super::country::{Coalition, Country, Side};
use super::dictionary::{Dictionary, StringKey};
use super::drawing::{Drawing, Layer};
use super::group::{Group, GroupKind};
use super::ids::{GroupId, Position, UnitId, ZoneId};
use super::route::Waypoint;
use super::settings::MissionSettings;
use super::trigger::{Goal, Trigger, ZoneRef};
use super::unit::{NewUnit, UnitRole};
use super::zone::{TriggerZone, ZoneShape};
use crate::service::id_registry::IdRegistry;
use crate::service::onboard::{self, OnboardChange};
use crate::service::renumber::{self, Renumbering};
use sortie_resources::{Bucket, ResourceKey, ResourceStore};
use sortie_shared::{IdKind, MizError, Result};
use sortie_table::Table;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Everything a loader reconstructs, before it becomes a [`Mission`]
#[derive(Debug, Default)]
pub struct MissionParts {
    pub settings: MissionSettings,
    pub coalitions: Vec<Coalition>,
    pub zones: Vec<TriggerZone>,
    pub triggers: Vec<Trigger>,
    pub goals: Vec<Goal>,
    pub layers: Vec<Layer>,
    pub drawing_options: Table,
    pub pictures: BTreeMap<Side, Vec<ResourceKey>>,
    pub dictionary: Dictionary,
    pub required_modules: BTreeMap<String, String>,
    pub options: Table,
    pub warehouses: Table,
    pub opaque: Table,
    pub unknown: Table,
}

/// A mission document
#[derive(Debug)]
pub struct Mission {
    pub settings: MissionSettings,
    /// Drawing editor options (`drawings.options`), kept opaque
    pub drawing_options: Table,
    pub dictionary: Dictionary,
    /// Module name -> module name, for every optional content module in use
    pub required_modules: BTreeMap<String, String>,
    /// Root of the archive's `options` entry
    pub options: Table,
    /// Root of the archive's `warehouses` entry
    pub warehouses: Table,
    /// Known root keys that are not modeled (`trig`, `result`, `failures`, ...)
    pub opaque: Table,
    /// Unrecognized root keys kept by a tolerant load
    pub unknown: Table,

    pub(crate) blue: Coalition,
    pub(crate) red: Coalition,
    pub(crate) neutrals: Coalition,
    pub(crate) zones: Vec<TriggerZone>,
    triggers: Vec<Trigger>,
    goals: Vec<Goal>,
    layers: Vec<Layer>,
    pictures: BTreeMap<Side, Vec<ResourceKey>>,
    pub(crate) registry: IdRegistry,
    resources: ResourceStore,
}

impl Mission {
    /// An empty mission on the default terrain
    pub fn new() -> Self {
        let mut mission = Self::from_parts(MissionParts::default(), IdRegistry::new(), ResourceStore::new());
        mission.layers = Layer::DEFAULT_NAMES.iter().map(|n| Layer::new(*n)).collect();
        mission
    }

    /// Assemble a mission from decoded parts
    pub fn from_parts(parts: MissionParts, registry: IdRegistry, resources: ResourceStore) -> Self {
        let mut coalitions: BTreeMap<Side, Coalition> = parts
            .coalitions
            .into_iter()
            .map(|c| (c.side, c))
            .collect();
        let mut take = |side: Side| coalitions.remove(&side).unwrap_or_else(|| Coalition::new(side));

        Self {
            settings: parts.settings,
            drawing_options: parts.drawing_options,
            dictionary: parts.dictionary,
            required_modules: parts.required_modules,
            options: parts.options,
            warehouses: parts.warehouses,
            opaque: parts.opaque,
            unknown: parts.unknown,
            blue: take(Side::Blue),
            red: take(Side::Red),
            neutrals: take(Side::Neutrals),
            zones: parts.zones,
            triggers: parts.triggers,
            goals: parts.goals,
            layers: parts.layers,
            pictures: parts.pictures,
            registry,
            resources,
        }
    }

    // ========== Getters ==========

    pub fn coalition(&self, side: Side) -> &Coalition {
        match side {
            Side::Blue => &self.blue,
            Side::Red => &self.red,
            Side::Neutrals => &self.neutrals,
        }
    }

    pub fn coalition_mut(&mut self, side: Side) -> &mut Coalition {
        match side {
            Side::Blue => &mut self.blue,
            Side::Red => &mut self.red,
            Side::Neutrals => &mut self.neutrals,
        }
    }

    pub fn coalitions(&self) -> impl Iterator<Item = &Coalition> {
        [&self.blue, &self.red, &self.neutrals].into_iter()
    }

    /// Every country with the side it belongs to
    pub fn countries(&self) -> impl Iterator<Item = (Side, &Country)> {
        self.coalitions()
            .flat_map(|c| c.countries().iter().map(move |country| (c.side, country)))
    }

    pub fn country(&self, name: &str) -> Option<(Side, &Country)> {
        self.countries().find(|(_, c)| c.name == name)
    }

    /// Every group, in file order
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.countries().flat_map(|(_, c)| c.all_groups())
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups().find(|g| g.id == id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        let (side, index) = self.locate_group(id)?;
        self.coalition_mut(side).countries_mut()[index].group_mut(id)
    }

    pub fn zones(&self) -> &[TriggerZone] {
        &self.zones
    }

    pub fn zone_mut(&mut self, id: ZoneId) -> Option<&mut TriggerZone> {
        self.zones.iter_mut().find(|z| z.id == id)
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    pub fn triggers_mut(&mut self) -> &mut Vec<Trigger> {
        &mut self.triggers
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn goals_mut(&mut self) -> &mut Vec<Goal> {
        &mut self.goals
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Briefing pictures of one side
    pub fn pictures(&self, side: Side) -> &[ResourceKey] {
        self.pictures.get(&side).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn registry(&self) -> &IdRegistry {
        &self.registry
    }

    pub fn resources(&self) -> &ResourceStore {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceStore {
        &mut self.resources
    }

    /// Dictionary text behind a key
    pub fn text(&self, key: &StringKey) -> Option<&str> {
        self.dictionary.get(key)
    }

    /// Type tags of every unit in the mission
    pub fn unit_types(&self) -> BTreeSet<&str> {
        self.groups()
            .flat_map(|g| g.units.iter())
            .map(|u| u.unit_type.as_str())
            .collect()
    }

    // ========== Creation ==========

    /// Add a country to a coalition, or return it if it is already there
    pub fn add_country(&mut self, side: Side, id: i64, name: &str) -> Result<&mut Country> {
        if let Some((other, _)) = self.country(name) {
            if other != side {
                return Err(MizError::CountryConflict {
                    country: name.to_string(),
                    coalition: other.key().to_string(),
                });
            }
        }
        Ok(self.coalition_mut(side).insert_country(Country::new(id, name)))
    }

    /// Create an empty group with a fresh id
    pub fn create_group(
        &mut self,
        side: Side,
        country: &str,
        kind: GroupKind,
        name: impl Into<String>,
        position: Position,
    ) -> Result<GroupId> {
        if self.coalition(side).country(country).is_none() {
            return Err(MizError::UnknownCountry(country.to_string()));
        }

        let id = GroupId::new(self.registry.allocate(IdKind::Group)?);
        let group = Group::new(id, kind, name, position);
        tracing::debug!(id = %id, group = %group.name, kind = kind.key(), "Group created");

        let country = self
            .coalition_mut(side)
            .country_mut(country)
            .ok_or_else(|| MizError::UnknownCountry(country.to_string()))?;
        country.add_group(group);
        Ok(id)
    }

    /// Add a unit to a group; flying units without an onboard number get a free one
    pub fn add_unit(&mut self, group_id: GroupId, unit: NewUnit) -> Result<UnitId> {
        let (side, index) = self
            .locate_group(group_id)
            .ok_or(MizError::UnknownGroup(group_id.get()))?;

        let country = &self.coalition(side).countries()[index];
        let kind = country
            .group(group_id)
            .map(|g| g.kind)
            .ok_or(MizError::UnknownGroup(group_id.get()))?;
        if !kind.accepts(&unit.role) {
            return Err(MizError::UnitKindMismatch {
                unit: unit.role.name().to_string(),
                group: kind.key().to_string(),
            });
        }
        let free_onboard = onboard::next_free(country);

        let id = UnitId::new(self.registry.allocate(IdKind::Unit)?);
        let mut unit = unit.into_unit(id);
        if let UnitRole::Flying(data) = &mut unit.role {
            if data.onboard_num.is_empty() {
                data.onboard_num = free_onboard.unwrap_or_default();
            }
        }

        let group = self
            .coalition_mut(side)
            .countries_mut()[index]
            .group_mut(group_id)
            .ok_or(MizError::UnknownGroup(group_id.get()))?;
        group.units.push(unit);
        Ok(id)
    }

    /// Append a waypoint to a group's route
    pub fn add_waypoint(&mut self, group_id: GroupId, waypoint: Waypoint) -> Result<()> {
        let group = self
            .group_mut(group_id)
            .ok_or(MizError::UnknownGroup(group_id.get()))?;
        group.route.push(waypoint);
        Ok(())
    }

    pub fn add_trigger_zone(
        &mut self,
        name: impl Into<String>,
        position: Position,
        shape: ZoneShape,
    ) -> Result<ZoneId> {
        let id = ZoneId::new(self.registry.allocate(IdKind::Zone)?);
        self.zones.push(TriggerZone::new(id, name, position, shape));
        Ok(id)
    }

    pub fn add_trigger(&mut self, trigger: Trigger) {
        self.triggers.push(trigger);
    }

    pub fn add_goal(&mut self, goal: Goal) {
        self.goals.push(goal);
    }

    /// Get or create a drawing layer
    pub fn add_layer(&mut self, name: &str) -> &mut Layer {
        let index = match self.layers.iter().position(|l| l.name == name) {
            Some(index) => index,
            None => {
                self.layers.push(Layer::new(name));
                self.layers.len() - 1
            }
        };
        &mut self.layers[index]
    }

    pub fn add_drawing(&mut self, layer: &str, drawing: Drawing) {
        self.add_layer(layer).add_drawing(drawing);
    }

    /// Register a briefing picture for one side
    pub fn add_picture(&mut self, side: Side, path: &Path) -> Result<ResourceKey> {
        let key = self
            .resources
            .add_file(&Bucket::default(), path, "ImageBriefing")?;
        let pictures = self.pictures.entry(side).or_default();
        if !pictures.contains(&key) {
            pictures.push(key.clone());
        }
        Ok(key)
    }

    /// Register a file for trigger actions (sounds, pictures, scripts)
    pub fn add_resource(&mut self, path: &Path) -> Result<ResourceKey> {
        self.resources.add_file(&Bucket::default(), path, "Action")
    }

    /// Add a kneeboard page, for one aircraft type or for all
    pub fn add_kneeboard(&mut self, owner: Option<&str>, path: &Path) -> Result<()> {
        self.resources.add_kneeboard(owner, path)
    }

    /// Store a text in the dictionary
    pub fn string(&mut self, label: &str, text: impl Into<String>) -> StringKey {
        self.dictionary.add(label, text)
    }

    // ========== Lookup ==========

    /// Group by exact name, falling back to the first partial match
    pub fn find_group(&self, name: &str) -> Option<&Group> {
        self.groups()
            .find(|g| g.name == name)
            .or_else(|| self.groups().find(|g| g.name.contains(name)))
    }

    pub fn find_zone(&self, name: &str) -> Option<&TriggerZone> {
        self.zones.iter().find(|z| z.name == name)
    }

    pub fn resolve_zone(&self, zone: ZoneRef) -> Option<&TriggerZone> {
        self.zones.iter().find(|z| z.id == zone.0)
    }

    /// Zone references in triggers and goals that resolve to nothing
    pub fn dangling_zone_refs(&self) -> Vec<(String, ZoneRef)> {
        let mut dangling = Vec::new();
        for (i, trigger) in self.triggers.iter().enumerate() {
            for zone in trigger.zone_refs() {
                if self.resolve_zone(zone).is_none() {
                    dangling.push((format!("trigrules[{}]", i + 1), zone));
                }
            }
        }
        for (i, goal) in self.goals.iter().enumerate() {
            for zone in goal.rules.iter().flat_map(|r| r.zone_refs()) {
                if self.resolve_zone(zone).is_none() {
                    dangling.push((format!("goals[{}]", i + 1), zone));
                }
            }
        }
        dangling
    }

    // ========== Removal & repair ==========

    /// Remove a group; its group and unit ids stay retired
    pub fn retire_group(&mut self, id: GroupId) -> Result<Group> {
        let (side, index) = self
            .locate_group(id)
            .ok_or(MizError::UnknownGroup(id.get()))?;
        let group = self.coalition_mut(side).countries_mut()[index]
            .remove_group(id)
            .ok_or(MizError::UnknownGroup(id.get()))?;

        self.registry.retire(IdKind::Group, id.get());
        for unit in &group.units {
            self.registry.retire(IdKind::Unit, unit.id.get());
        }
        tracing::debug!(id = %id, group = %group.name, "Group retired");
        Ok(group)
    }

    /// Give every flying unit an onboard number unique within its country
    pub fn reassign_onboard_numbers(&mut self) -> Vec<OnboardChange> {
        onboard::reassign(self)
    }

    /// Renumber later holders of an id already used by an earlier entity
    pub fn renumber_duplicate_ids(&mut self) -> Result<Vec<Renumbering>> {
        renumber::renumber_duplicates(self)
    }

    fn locate_group(&self, id: GroupId) -> Option<(Side, usize)> {
        self.coalitions().find_map(|c| {
            c.countries()
                .iter()
                .position(|country| country.group(id).is_some())
                .map(|index| (c.side, index))
        })
    }
}

impl Default for Mission {
    fn default() -> Self {
        Self::new()
    }
}
