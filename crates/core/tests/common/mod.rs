#![allow(dead_code)]

use sortie_core::{save_writer, Loaded, LoadOptions, Mission, MissionLoader, SaveOptions};
use sortie_table::{to_lua, Table};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Archive holding the given entries, ready to read
pub fn archive(entries: &[(&str, Vec<u8>)]) -> Cursor<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(bytes).unwrap();
    }
    let mut cursor = zip.finish().unwrap();
    cursor.set_position(0);
    cursor
}

/// Archive whose only entry is the given mission root
pub fn mission_archive(root: &Table) -> Cursor<Vec<u8>> {
    archive(&[("mission", to_lua("mission", root).into_bytes())])
}

pub fn load(reader: Cursor<Vec<u8>>, options: LoadOptions) -> Loaded {
    MissionLoader::new().options(options).load_reader(reader).unwrap()
}

/// Save to memory and load the result back
pub fn reload(mission: &Mission) -> Loaded {
    let buffer = save_writer(mission, Cursor::new(Vec::new()), &SaveOptions::default()).unwrap();
    load(Cursor::new(buffer.into_inner()), LoadOptions::default())
}

pub fn country(id: i64, name: &str) -> Table {
    Table::new().with("id", id).with("name", name)
}

pub fn plane(unit_id: i64, name: &str, onboard: &str) -> Table {
    Table::new()
        .with("unitId", unit_id)
        .with("name", name)
        .with("type", "F-16C_50")
        .with("x", 100.0)
        .with("y", 200.0)
        .with("skill", "High")
        .with("onboard_num", onboard)
}

pub fn group(group_id: i64, name: &str, units: Vec<Table>) -> Table {
    Table::new()
        .with("groupId", group_id)
        .with("name", name)
        .with("x", 100.0)
        .with("y", 200.0)
        .with("units", Table::from_sequence(units))
}

/// Mission root with one blue country flying the given plane groups
pub fn root_with_planes(groups: Vec<Table>) -> Table {
    let usa = country(2, "USA").with("plane", Table::new().with("group", Table::from_sequence(groups)));
    let blue = Table::new()
        .with("name", "blue")
        .with("country", Table::from_sequence(vec![usa]));
    Table::new()
        .with("version", 21)
        .with("theatre", "Caucasus")
        .with("date", Table::new().with("Day", 1).with("Month", 6).with("Year", 2011))
        .with("start_time", 28800)
        .with("coalition", Table::new().with("blue", blue))
        .with(
            "coalitions",
            Table::new().with("blue", Table::from_sequence(vec![2])),
        )
}
