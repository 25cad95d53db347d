mod common;

use malt_index::commands::{execute_dump, DumpArgs};
use malt_index::{AllocationProfile, IndexOptions, ProfileError};
use std::fs;

fn write_sample(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("malt-app-42.json");
    fs::write(&path, common::sample_profile().to_string()).unwrap();
    path
}

#[test]
fn test_load_from_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = write_sample(temp_dir.path());

    let profile = AllocationProfile::load(&path, &IndexOptions::default()).unwrap();

    assert_eq!(profile.symbols().len(), 7);
    assert_eq!(profile.stacks().len(), 4);
    assert_eq!(profile.sample_count(), 4);
    assert_eq!(profile.leaks().len(), 1);
}

#[test]
fn test_load_missing_file() {
    let result = AllocationProfile::load("/nonexistent/malt.json", &IndexOptions::default());
    assert!(matches!(result, Err(ProfileError::Io(_))));
}

#[test]
fn test_load_invalid_json() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("broken.json");
    fs::write(&path, "{\"sites\": ").unwrap();

    let result = AllocationProfile::load(&path, &IndexOptions::default());
    assert!(matches!(result, Err(ProfileError::Json(_))));
}

#[test]
fn test_symbol_alias_round_trip() {
    let profile =
        AllocationProfile::from_value(&common::sample_profile(), &IndexOptions::default()).unwrap();

    let site = profile.lookup("0x21").unwrap();
    assert_eq!(site.function, "bar");

    // bar has two sites; the alias keeps the last one
    let alias = profile.lookup(&site.function).unwrap();
    assert_eq!(alias.function, "bar");
    assert_eq!(alias.line, 88);
    assert_eq!(profile.symbols().sites_for_function("bar"), ["0x21", "0x23"]);
}

#[test]
fn test_out_of_range_name_index() {
    let mut doc = common::sample_profile();
    doc["sites"]["instr"]["0x20"]["file"] = serde_json::json!(99);

    let result = AllocationProfile::from_value(&doc, &IndexOptions::default());
    assert!(matches!(result, Err(ProfileError::OutOfRange { index: 99, .. })));
}

#[test]
fn test_dump_writes_three_csvs() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = write_sample(temp_dir.path());

    let written = execute_dump(&DumpArgs {
        input: path,
        file_filter: None,
    })
    .unwrap();

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        [
            "malt-app-42_timeline.csv",
            "malt-app-42_globalPeak.csv",
            "malt-app-42_leaks.csv"
        ]
    );

    let timeline = fs::read_to_string(&written[0]).unwrap();
    let rows: Vec<&str> = timeline.lines().collect();
    assert_eq!(rows[1], "0.25,100,4096,8192,100,\"< 10:foo < 20:bar < 30:main\"");
    assert_eq!(rows[3], "0.75,500,8192,16384,1400,\"UNKNOWN\"");

    let peaks = fs::read_to_string(&written[1]).unwrap();
    assert_eq!(
        peaks,
        "Memory(MB),location\n0.000,\"< 10:foo < 20:bar < 30:main\"\n0.000,\"UNKNOWN\"\n"
    );

    let leaks = fs::read_to_string(&written[2]).unwrap();
    assert!(leaks.starts_with("Memory(MB),count,location\n"));
    assert!(leaks.contains("< -1:malloc < 120:__gnu_cxx::new_allocator<char>::allocate"));
}
