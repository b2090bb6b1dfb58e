//! Coalitions and countries

use super::group::{Group, GroupKind};
use super::ids::{GroupId, Position};
use sortie_table::Table;

/// One of the three coalitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Blue,
    Red,
    Neutrals,
}

impl Side {
    pub const ALL: [Side; 3] = [Side::Blue, Side::Red, Side::Neutrals];

    pub fn key(&self) -> &'static str {
        match self {
            Side::Blue => "blue",
            Side::Red => "red",
            Side::Neutrals => "neutrals",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    /// Suffix of the side's briefing picture list (`pictureFileNameB`)
    pub fn picture_suffix(&self) -> char {
        match self {
            Side::Blue => 'B',
            Side::Red => 'R',
            Side::Neutrals => 'N',
        }
    }
}

/// A country and its groups
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    /// Catalog id of the country
    pub id: i64,
    pub name: String,
    /// Groups of every kind, each kind in file order
    groups: Vec<Group>,
    pub extra: Table,
}

impl Country {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            groups: Vec::new(),
            extra: Table::new(),
        }
    }

    pub fn add_group(&mut self, group: Group) {
        self.groups.push(group);
    }

    /// Groups of one kind, in order
    pub fn groups(&self, kind: GroupKind) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter(move |g| g.kind == kind)
    }

    pub fn groups_mut(&mut self, kind: GroupKind) -> impl Iterator<Item = &mut Group> {
        self.groups.iter_mut().filter(move |g| g.kind == kind)
    }

    /// Every group, kinds in file order
    pub fn all_groups(&self) -> impl Iterator<Item = &Group> {
        GroupKind::ALL.into_iter().flat_map(move |kind| self.groups(kind))
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    pub fn remove_group(&mut self, id: GroupId) -> Option<Group> {
        let index = self.groups.iter().position(|g| g.id == id)?;
        Some(self.groups.remove(index))
    }

    pub fn has_units(&self) -> bool {
        self.groups.iter().any(|g| !g.units.is_empty())
    }

    /// Sort groups so that kinds follow file order; order within a kind is kept
    pub(crate) fn normalize_order(&mut self) {
        self.groups.sort_by_key(|g| {
            GroupKind::ALL
                .iter()
                .position(|k| *k == g.kind)
                .unwrap_or(usize::MAX)
        });
    }

    pub(crate) fn groups_raw_mut(&mut self) -> &mut Vec<Group> {
        &mut self.groups
    }
}

/// A coalition and its countries
#[derive(Debug, Clone, PartialEq)]
pub struct Coalition {
    pub side: Side,
    pub name: String,
    pub bullseye: Option<Position>,
    /// Navigation points, kept opaque
    pub nav_points: Table,
    /// Catalog ids of member countries, including those without units
    pub members: Vec<i64>,
    countries: Vec<Country>,
    pub extra: Table,
}

impl Coalition {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            name: side.key().to_string(),
            bullseye: None,
            nav_points: Table::new(),
            members: Vec::new(),
            countries: Vec::new(),
            extra: Table::new(),
        }
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn countries_mut(&mut self) -> &mut [Country] {
        &mut self.countries
    }

    pub fn country(&self, name: &str) -> Option<&Country> {
        self.countries.iter().find(|c| c.name == name)
    }

    pub fn country_mut(&mut self, name: &str) -> Option<&mut Country> {
        self.countries.iter_mut().find(|c| c.name == name)
    }

    /// Add a country (and its membership); an existing country of the same name is kept
    pub fn insert_country(&mut self, mut country: Country) -> &mut Country {
        if !self.members.contains(&country.id) {
            self.members.push(country.id);
        }
        let index = match self.countries.iter().position(|c| c.name == country.name) {
            Some(index) => index,
            None => {
                country.normalize_order();
                self.countries.push(country);
                self.countries.len() - 1
            }
        };
        &mut self.countries[index]
    }

    /// Detach a country and its membership
    pub fn remove_country(&mut self, name: &str) -> Option<Country> {
        let index = self.countries.iter().position(|c| c.name == name)?;
        let country = self.countries.remove(index);
        self.members.retain(|id| *id != country.id);
        Some(country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_keys() {
        assert_eq!(Side::parse("neutrals"), Some(Side::Neutrals));
        assert_eq!(Side::Red.picture_suffix(), 'R');
        assert_eq!(Side::parse("green"), None);
    }

    #[test]
    fn test_groups_by_kind_keep_order() {
        let mut country = Country::new(2, "USA");
        country.add_group(Group::new(GroupId::new(1), GroupKind::Plane, "P1", Position::default()));
        country.add_group(Group::new(GroupId::new(2), GroupKind::Vehicle, "V1", Position::default()));
        country.add_group(Group::new(GroupId::new(3), GroupKind::Plane, "P2", Position::default()));

        let planes: Vec<&str> = country.groups(GroupKind::Plane).map(|g| g.name.as_str()).collect();
        assert_eq!(planes, vec!["P1", "P2"]);

        let all: Vec<&str> = country.all_groups().map(|g| g.name.as_str()).collect();
        assert_eq!(all, vec!["V1", "P1", "P2"]);

        assert!(country.remove_group(GroupId::new(2)).is_some());
        assert!(country.group(GroupId::new(2)).is_none());
    }

    #[test]
    fn test_insert_country_tracks_membership() {
        let mut coalition = Coalition::new(Side::Blue);
        coalition.insert_country(Country::new(2, "USA"));
        coalition.insert_country(Country::new(2, "USA"));
        coalition.insert_country(Country::new(4, "UK"));

        assert_eq!(coalition.members, vec![2, 4]);
        assert_eq!(coalition.countries().len(), 2);

        let uk = coalition.remove_country("UK").unwrap();
        assert_eq!(uk.id, 4);
        assert_eq!(coalition.members, vec![2]);
        assert!(coalition.remove_country("UK").is_none());
    }
}
