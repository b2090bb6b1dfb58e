//! Onboard number repair
//!
//! Aircraft of one country share a pool of three-digit tail numbers. When
//! two flying units carry the same number, the first one (in file order)
//! keeps it and every later holder gets the smallest free number.

use crate::model::country::Country;
use crate::model::group::GroupKind;
use crate::model::ids::UnitId;
use crate::model::mission::Mission;
use std::collections::{BTreeSet, HashSet};

const FLYING_KINDS: [GroupKind; 2] = [GroupKind::Plane, GroupKind::Helicopter];

/// One reassigned onboard number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardChange {
    pub unit: UnitId,
    pub unit_name: String,
    pub country: String,
    pub old: String,
    pub new: String,
}

fn numbers_in_use(country: &Country) -> BTreeSet<String> {
    FLYING_KINDS
        .iter()
        .flat_map(|kind| country.groups(*kind))
        .flat_map(|g| g.units.iter())
        .filter_map(|u| u.onboard_num())
        .map(str::to_string)
        .collect()
}

fn smallest_free(taken: &BTreeSet<String>) -> Option<String> {
    (1..=999)
        .map(|n| format!("{:03}", n))
        .find(|candidate| !taken.contains(candidate))
}

/// Next onboard number not used by any aircraft of the country
pub fn next_free(country: &Country) -> Option<String> {
    smallest_free(&numbers_in_use(country))
}

pub(crate) fn reassign(mission: &mut Mission) -> Vec<OnboardChange> {
    let mut changes = Vec::new();
    let Mission {
        blue, red, neutrals, ..
    } = mission;

    for coalition in [blue, red, neutrals] {
        for country in coalition.countries_mut() {
            let mut taken = numbers_in_use(country);
            let mut seen = HashSet::new();
            let country_name = country.name.clone();

            for kind in FLYING_KINDS {
                for group in country.groups_mut(kind) {
                    for unit in group.units.iter_mut() {
                        let unit_id = unit.id;
                        let unit_name = unit.name.clone();
                        let Some(data) = unit.flying_mut() else {
                            continue;
                        };
                        if data.onboard_num.is_empty() || seen.insert(data.onboard_num.clone()) {
                            continue;
                        }

                        let Some(new) = smallest_free(&taken) else {
                            tracing::warn!(country = %country_name, "No free onboard number left");
                            continue;
                        };
                        tracing::info!(
                            unit = %unit_name,
                            old = %data.onboard_num,
                            new = %new,
                            "Onboard number reassigned"
                        );
                        taken.insert(new.clone());
                        seen.insert(new.clone());
                        let old = std::mem::replace(&mut data.onboard_num, new.clone());
                        changes.push(OnboardChange {
                            unit: unit_id,
                            unit_name,
                            country: country_name.clone(),
                            old,
                            new,
                        });
                    }
                }
            }
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use crate::model::country::Side;
    use crate::model::group::GroupKind;
    use crate::model::ids::Position;
    use crate::model::mission::Mission;
    use crate::model::unit::{FlyingData, NewUnit, UnitRole};

    fn flying(onboard: &str) -> UnitRole {
        UnitRole::Flying(FlyingData {
            onboard_num: onboard.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_single_collision_single_change() {
        let mut mission = Mission::new();
        mission.add_country(Side::Blue, 2, "USA").unwrap();
        let planes = mission
            .create_group(Side::Blue, "USA", GroupKind::Plane, "CAP", Position::default())
            .unwrap();
        let helos = mission
            .create_group(Side::Blue, "USA", GroupKind::Helicopter, "CSAR", Position::default())
            .unwrap();
        mission.add_unit(planes, NewUnit::new("CAP-1", "F-15C", flying("010"))).unwrap();
        mission.add_unit(planes, NewUnit::new("CAP-2", "F-15C", flying("001"))).unwrap();
        mission.add_unit(helos, NewUnit::new("CSAR-1", "UH-1H", flying("010"))).unwrap();

        let changes = mission.reassign_onboard_numbers();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].unit_name, "CSAR-1");
        assert_eq!(changes[0].old, "010");
        assert_eq!(changes[0].new, "002");

        // now clean
        assert!(mission.reassign_onboard_numbers().is_empty());
    }

    #[test]
    fn test_countries_are_separate_pools() {
        let mut mission = Mission::new();
        mission.add_country(Side::Blue, 2, "USA").unwrap();
        mission.add_country(Side::Blue, 4, "UK").unwrap();
        let a = mission
            .create_group(Side::Blue, "USA", GroupKind::Plane, "A", Position::default())
            .unwrap();
        let b = mission
            .create_group(Side::Blue, "UK", GroupKind::Plane, "B", Position::default())
            .unwrap();
        mission.add_unit(a, NewUnit::new("A-1", "F-15C", flying("100"))).unwrap();
        mission.add_unit(b, NewUnit::new("B-1", "Tornado GR4", flying("100"))).unwrap();

        assert!(mission.reassign_onboard_numbers().is_empty());
    }
}
