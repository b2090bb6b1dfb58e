mod common;

use common::{archive, group, init_tracing, load, mission_archive, plane, reload, root_with_planes};
use sortie_core::{Category, LoadOptions, MissionLoader, MizError, Severity};
use sortie_domain::{GroupKind, Position, Side};
use sortie_table::{to_lua, Table};

#[test]
fn test_duplicate_group_id_renumbered() {
    init_tracing();
    let root = root_with_planes(vec![
        group(1, "Alpha", vec![plane(1, "Alpha-1", "010")]),
        group(1, "Bravo", vec![plane(2, "Bravo-1", "011")]),
    ]);

    let loaded = load(mission_archive(&root), LoadOptions::default());
    let renumbered = loaded.diagnostics.by_category(Category::DuplicateIdRenumbered);
    assert_eq!(renumbered.len(), 1);
    assert_eq!(renumbered[0].severity, Severity::Warn);

    let alpha = loaded.mission.find_group("Alpha").unwrap().id;
    let bravo = loaded.mission.find_group("Bravo").unwrap().id;
    assert_eq!(alpha.get(), 1);
    assert_ne!(alpha, bravo);
    assert_eq!(loaded.mission.registry().len(sortie_shared::IdKind::Group), 2);
    assert_eq!(loaded.mission.registry().len(sortie_shared::IdKind::Unit), 2);

    let again = reload(&loaded.mission);
    assert!(again.diagnostics.is_empty());
}

#[test]
fn test_duplicate_max_group_id_renumbered() {
    let max = i64::from(u32::MAX);
    let root = root_with_planes(vec![
        group(max, "Alpha", vec![plane(1, "Alpha-1", "010")]),
        group(max, "Bravo", vec![plane(2, "Bravo-1", "011")]),
    ]);

    let mut loaded = load(mission_archive(&root), LoadOptions::default());
    assert_eq!(loaded.diagnostics.by_category(Category::DuplicateIdRenumbered).len(), 1);
    assert_eq!(loaded.mission.find_group("Alpha").unwrap().id.get(), u32::MAX);
    assert_eq!(loaded.mission.find_group("Bravo").unwrap().id.get(), 1);

    let sweep = loaded
        .mission
        .create_group(Side::Blue, "USA", GroupKind::Plane, "Sweep", Position::default())
        .unwrap();
    assert_eq!(sweep.get(), 2);
    assert_eq!(loaded.mission.registry().len(sortie_shared::IdKind::Group), 3);
}

#[test]
fn test_onboard_collision_fixed_once() {
    let root = root_with_planes(vec![group(
        1,
        "CAP",
        vec![plane(1, "CAP-1", "010"), plane(2, "CAP-2", "010")],
    )]);

    let loaded = load(mission_archive(&root), LoadOptions::default());
    assert_eq!(loaded.diagnostics.count(Severity::Warn), 1);
    let group = loaded.mission.find_group("CAP").unwrap();
    assert_eq!(group.unit("CAP-1").and_then(|u| u.onboard_num()), Some("010"));
    assert_ne!(group.unit("CAP-2").and_then(|u| u.onboard_num()), Some("010"));

    let again = reload(&loaded.mission);
    assert_eq!(again.diagnostics.count(Severity::Warn), 0);
}

#[test]
fn test_sparse_units_kept_in_order() {
    let units = Table::new()
        .with(7i64, plane(3, "CAP-3", "012"))
        .with(2i64, plane(1, "CAP-1", "010"))
        .with(4i64, plane(2, "CAP-2", "011"));
    let cap = group(1, "CAP", Vec::new()).with("units", units);
    let root = root_with_planes(vec![cap]);

    let loaded = load(mission_archive(&root), LoadOptions::default());
    let names: Vec<&str> = loaded
        .mission
        .find_group("CAP")
        .unwrap()
        .units
        .iter()
        .map(|u| u.name.as_str())
        .collect();
    assert_eq!(names, vec!["CAP-1", "CAP-2", "CAP-3"]);

    let again = reload(&loaded.mission);
    assert_eq!(again.mission.find_group("CAP").unwrap().units.len(), 3);
}

#[test]
fn test_unknown_root_keys() {
    let root = root_with_planes(Vec::new()).with("cockpitTheme", "night");

    let tolerant = load(mission_archive(&root), LoadOptions::tolerant());
    assert!(tolerant.diagnostics.is_empty());
    let saved = sortie_core::container::archive_entries(&tolerant.mission).unwrap();
    let mission_text = String::from_utf8(saved[0].1.clone()).unwrap();
    assert!(mission_text.contains("cockpitTheme"));

    let dropped = load(mission_archive(&root), LoadOptions::default());
    let info = dropped.diagnostics.by_category(Category::UnknownKeyDropped);
    assert_eq!(info.len(), 1);
    assert_eq!(info[0].severity, Severity::Info);
    assert_eq!(info[0].path.as_deref(), Some("cockpitTheme"));
    assert!(dropped.mission.unknown.is_empty());
}

#[test]
fn test_broken_unit_policy() {
    let broken = Table::new().with("unitId", 2).with("name", "CAP-2");
    let root = root_with_planes(vec![group(1, "CAP", vec![plane(1, "CAP-1", "010"), broken])]);

    let lenient = load(mission_archive(&root), LoadOptions::default());
    assert_eq!(lenient.mission.find_group("CAP").unwrap().units.len(), 1);
    let skipped = lenient.diagnostics.by_category(Category::MalformedRecordSkipped);
    assert_eq!(skipped.len(), 1);

    let strict = MissionLoader::new()
        .options(LoadOptions::strict())
        .load_reader(mission_archive(&root));
    assert!(matches!(strict, Err(MizError::MalformedRecord(_))));
}

#[test]
fn test_missing_resource_file_reported() {
    let root = root_with_planes(Vec::new());
    let map = Table::new().with("ResKey_Action_3", "siren.ogg");
    let reader = archive(&[
        ("mission", to_lua("mission", &root).into_bytes()),
        ("l10n/DEFAULT/mapResource", to_lua("mapResource", &map).into_bytes()),
    ]);

    let loaded = load(reader, LoadOptions::default());
    let missing = loaded.diagnostics.by_category(Category::MissingResource);
    assert_eq!(missing.len(), 1);
    assert!(loaded.mission.resources().keys().is_empty());
}

#[test]
fn test_dictionary_and_theatre_entries() {
    let mut root = root_with_planes(Vec::new()).with("descriptionText", "DictKey_descriptionText_4");
    root.remove("theatre");
    let dictionary = Table::new().with("DictKey_descriptionText_4", "Defend Kutaisi");
    let reader = archive(&[
        ("mission", to_lua("mission", &root).into_bytes()),
        ("theatre", b"Syria".to_vec()),
        ("l10n/DEFAULT/dictionary", to_lua("dictionary", &dictionary).into_bytes()),
    ]);

    let mut loaded = load(reader, LoadOptions::default());
    let mission = &mut loaded.mission;
    assert_eq!(mission.settings.theatre, "Syria");
    let key = mission.settings.description_text.clone().unwrap();
    assert_eq!(mission.text(&key), Some("Defend Kutaisi"));

    // new strings continue after the highest key seen
    let next = mission.string("sortie", "Strike");
    assert_eq!(next.as_str(), "DictKey_sortie_5");
}

#[test]
fn test_not_an_archive() {
    let result = MissionLoader::new().load_reader(std::io::Cursor::new(b"mission = {}".to_vec()));
    assert!(matches!(result, Err(MizError::CorruptContainer(_))));
}
