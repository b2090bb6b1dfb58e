//! Duplicate id repair
//!
//! A loaded file may give the same id to two entities. The registry only
//! records the id once; this pass walks the graph in file order, keeps the
//! first holder and gives every later holder a freshly allocated id.

use crate::model::ids::{GroupId, UnitId, ZoneId};
use crate::model::mission::Mission;
use sortie_shared::{IdKind, Result};
use std::collections::HashSet;

/// One renumbered entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renumbering {
    pub kind: IdKind,
    pub old: u32,
    pub new: u32,
    /// Where the entity lives, e.g. `blue.USA.plane.CAP`
    pub path: String,
}

pub(crate) fn renumber_duplicates(mission: &mut Mission) -> Result<Vec<Renumbering>> {
    let mut changes = Vec::new();
    let mut groups = HashSet::new();
    let mut units = HashSet::new();
    let mut zones = HashSet::new();

    let Mission {
        blue,
        red,
        neutrals,
        zones: trigger_zones,
        registry,
        ..
    } = mission;

    for coalition in [blue, red, neutrals] {
        let side = coalition.side.key();
        for country in coalition.countries_mut() {
            let country_name = country.name.clone();
            for group in country.groups_raw_mut().iter_mut() {
                let group_path = format!("{}.{}.{}.{}", side, country_name, group.kind.key(), group.name);

                if !groups.insert(group.id) {
                    let new = GroupId::new(registry.allocate(IdKind::Group)?);
                    groups.insert(new);
                    changes.push(Renumbering {
                        kind: IdKind::Group,
                        old: group.id.get(),
                        new: new.get(),
                        path: group_path.clone(),
                    });
                    group.id = new;
                }

                for unit in group.units.iter_mut() {
                    if !units.insert(unit.id) {
                        let new = UnitId::new(registry.allocate(IdKind::Unit)?);
                        units.insert(new);
                        changes.push(Renumbering {
                            kind: IdKind::Unit,
                            old: unit.id.get(),
                            new: new.get(),
                            path: format!("{}.{}", group_path, unit.name),
                        });
                        unit.id = new;
                    }
                }
            }
        }
    }

    for zone in trigger_zones.iter_mut() {
        if !zones.insert(zone.id) {
            let new = ZoneId::new(registry.allocate(IdKind::Zone)?);
            zones.insert(new);
            changes.push(Renumbering {
                kind: IdKind::Zone,
                old: zone.id.get(),
                new: new.get(),
                path: format!("triggers.zones.{}", zone.name),
            });
            zone.id = new;
        }
    }

    for change in &changes {
        tracing::info!(kind = %change.kind, old = change.old, new = change.new, path = %change.path, "Duplicate id renumbered");
    }
    Ok(changes)
}
