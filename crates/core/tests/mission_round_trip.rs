mod common;

use common::{init_tracing, reload};
use sortie_core::{
    container::archive_entries, save_file, LoadOptions, MissionLoader, MizError, SaveOptions,
    StaticModuleCatalog,
};
use sortie_domain::{
    Drawing, DrawingCommon, FlyingData, GroupKind, LineStyle, Mission, NewUnit, PolygonDrawing,
    PolygonShape, Position, Rgba, Rule, Side, Trigger, TriggerMode, UnitRole, VehicleData,
    Waypoint, ZoneRef, ZoneShape,
};

fn two_sided_mission() -> Mission {
    let mut mission = Mission::new();
    mission.add_country(Side::Blue, 2, "USA").unwrap();
    mission.add_country(Side::Red, 0, "Russia").unwrap();

    let cap = mission
        .create_group(Side::Blue, "USA", GroupKind::Plane, "CAP", Position::new(-100.0, 200.0))
        .unwrap();
    mission
        .add_unit(
            cap,
            NewUnit::new("CAP-1", "F-16C_50", UnitRole::Flying(FlyingData::default()))
                .at(Position::new(-100.0, 200.0)),
        )
        .unwrap();
    mission
        .add_waypoint(cap, Waypoint::new(Position::new(-100.0, 200.0)).with_speed(220.0))
        .unwrap();

    let armor = mission
        .create_group(Side::Red, "Russia", GroupKind::Vehicle, "Armor", Position::new(5000.0, 7000.0))
        .unwrap();
    mission
        .add_unit(
            armor,
            NewUnit::new("Armor-1", "T-72B", UnitRole::Vehicle(VehicleData::default()))
                .at(Position::new(5000.0, 7000.0)),
        )
        .unwrap();
    mission
}

#[test]
fn test_zone_reference_survives_save_and_reload() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.miz");

    let mut mission = two_sided_mission();
    let zone = mission.add_trigger_zone(
        "Objective",
        Position::new(1250.5, -3400.25),
        ZoneShape::Circle { radius: 3000.0 },
    ).unwrap();
    mission.add_trigger(
        Trigger::new(TriggerMode::Once, "Blue reaches objective")
            .with_condition(Rule::new("c_part_of_coalition_in_zone").with("zone", ZoneRef(zone)))
            .with_action(Rule::new("a_set_flag").with("flag", sortie_table::Value::Int(1))),
    );
    save_file(&mission, &path, &SaveOptions::default()).unwrap();

    let loaded = MissionLoader::new().load_file(&path).unwrap();
    assert!(loaded.diagnostics.is_empty(), "{:?}", loaded.diagnostics);

    let reloaded = &loaded.mission;
    let trigger = &reloaded.triggers()[0];
    let zone_ref = trigger.zone_refs().next().unwrap();
    assert_eq!(zone_ref, ZoneRef(zone));

    let resolved = reloaded.resolve_zone(zone_ref).unwrap();
    assert_eq!(resolved.name, "Objective");
    assert_eq!(resolved.position, Position::new(1250.5, -3400.25));
    assert_eq!(resolved.radius(), 3000.0);

    assert_eq!(reloaded.find_group("CAP").unwrap().route.len(), 1);
    assert!(reloaded.find_group("Armor").unwrap().unit("Armor-1").is_some());
    assert_eq!(reloaded.country("Russia").map(|(side, _)| side), Some(Side::Red));
}

#[test]
fn test_ids_stay_unique_after_edits() {
    let mut mission = two_sided_mission();
    let cap = mission.find_group("CAP").map(|g| g.id).unwrap();
    mission.retire_group(cap).unwrap();

    let sweep = mission
        .create_group(Side::Blue, "USA", GroupKind::Plane, "Sweep", Position::default())
        .unwrap();
    assert!(mission.group(cap).is_none());
    assert_ne!(sweep, cap);

    let loaded = reload(&mission);
    let ids: Vec<u32> = loaded.mission.groups().map(|g| g.id.get()).collect();
    let mut unique = ids.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(ids.len(), unique.len());
    assert!(loaded.diagnostics.is_empty());
}

#[test]
fn test_resources_are_isolated_per_mission() {
    let first_dir = tempfile::tempdir().unwrap();
    let second_dir = tempfile::tempdir().unwrap();
    let first_file = first_dir.path().join("briefing.png");
    let second_file = second_dir.path().join("briefing.png");
    std::fs::write(&first_file, b"first picture").unwrap();
    std::fs::write(&second_file, b"second picture").unwrap();

    let mut first = Mission::new();
    let mut second = Mission::new();
    let first_key = first.add_picture(Side::Blue, &first_file).unwrap();
    let second_key = second.add_picture(Side::Blue, &second_file).unwrap();
    assert_eq!(first_key.as_str(), second_key.as_str());

    let first_loaded = reload(&first);
    let second_loaded = reload(&second);
    let read = |loaded: &sortie_core::Loaded| {
        let key = loaded.mission.pictures(Side::Blue)[0].clone();
        loaded.mission.resources().read(&key).unwrap()
    };
    assert_eq!(read(&first_loaded), b"first picture");
    assert_eq!(read(&second_loaded), b"second picture");

    // a key only means something in the mission that issued it
    second.add_trigger(
        Trigger::new(TriggerMode::Once, "Show")
            .with_action(Rule::new("a_out_picture").with("file", first_key)),
    );
    let result = sortie_core::save_writer(&second, std::io::Cursor::new(Vec::new()), &SaveOptions::default());
    assert!(matches!(result, Err(MizError::UnknownResourceKey(_))));
}

#[test]
fn test_polygon_shapes_round_trip() {
    let common = |name: &str| DrawingCommon::new(name, Position::new(10.0, 20.0), Rgba::new(255, 0, 0, 255));
    let circle = Drawing::Polygon(PolygonDrawing {
        common: common("SAM ring"),
        fill: Rgba::new(255, 0, 0, 64),
        thickness: 8.0,
        style: LineStyle::Dash,
        shape: PolygonShape::Circle { radius: 15000.0 },
    });
    let arrow = Drawing::Polygon(PolygonDrawing {
        common: common("Axis of advance"),
        fill: Rgba::new(0, 0, 255, 128),
        thickness: 4.0,
        style: LineStyle::Solid,
        shape: PolygonShape::Arrow {
            length: 9000.0,
            angle: 45.0,
            points: vec![Position::new(0.0, 0.0), Position::new(100.0, 50.0), Position::new(0.0, 100.0)],
        },
    });

    let mut mission = Mission::new();
    mission.add_drawing("Blue", circle.clone());
    mission.add_drawing("Blue", arrow.clone());

    let loaded = reload(&mission);
    let layer = loaded.mission.layer("Blue").unwrap();
    assert_eq!(layer.objects.len(), 2);
    assert_eq!(layer.find("SAM ring"), mission.layer("Blue").unwrap().find("SAM ring"));
    assert_eq!(layer.find("Axis of advance"), mission.layer("Blue").unwrap().find("Axis of advance"));
}

#[test]
fn test_kneeboard_entry_names() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("page1.png");
    std::fs::write(&page, b"png").unwrap();

    let mut mission = Mission::new();
    mission.add_kneeboard(None, &page).unwrap();
    mission.add_kneeboard(Some("F-16C_50"), &page).unwrap();

    let names: Vec<String> = archive_entries(&mission)
        .unwrap()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert!(names.contains(&"KNEEBOARD/IMAGES/page1.png".to_string()));
    assert!(names.contains(&"KNEEBOARD/F-16C_50/IMAGES/page1.png".to_string()));

    let loaded = reload(&mission);
    let owners: Vec<Option<&str>> = loaded
        .mission
        .resources()
        .kneeboards()
        .iter()
        .map(|k| k.owner())
        .collect();
    assert_eq!(owners.len(), 2);
    assert!(owners.contains(&None));
    assert!(owners.contains(&Some("F-16C_50")));
}

#[test]
fn test_required_modules_preserved_and_extended() {
    let mut mission = two_sided_mission();
    mission
        .required_modules
        .insert("Supercarrier".into(), "Supercarrier".into());

    let buffer = sortie_core::save_writer(&mission, std::io::Cursor::new(Vec::new()), &SaveOptions::default())
        .unwrap()
        .into_inner();
    let catalog = StaticModuleCatalog::new().with("F-16C_50", "F-16C bl.50 by Eagle Dynamics");
    let loaded = MissionLoader::new()
        .options(LoadOptions::default())
        .catalog(&catalog)
        .load_reader(std::io::Cursor::new(buffer))
        .unwrap();

    let modules: Vec<&str> = loaded.mission.required_modules.keys().map(String::as_str).collect();
    assert_eq!(modules, vec!["F-16C bl.50 by Eagle Dynamics", "Supercarrier"]);
}

#[test]
fn test_countries_without_units_preserved() {
    let mut mission = two_sided_mission();
    mission.add_country(Side::Blue, 21, "Georgia").unwrap();
    mission.add_country(Side::Neutrals, 7, "Switzerland").unwrap();

    let loaded = reload(&mission);
    let georgia = loaded.mission.country("Georgia").unwrap();
    assert_eq!(georgia.0, Side::Blue);
    assert_eq!(georgia.1.id, 21);
    assert!(!georgia.1.has_units());
    assert_eq!(loaded.mission.country("Switzerland").map(|(side, _)| side), Some(Side::Neutrals));
    assert!(loaded.mission.coalition(Side::Blue).members.contains(&21));
}
