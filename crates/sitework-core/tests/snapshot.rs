use sitework_core::dates::parse_date;
use sitework_core::snapshot::ProjectFile;
use sitework_core::unit::{ProjectId, ScheduleUnit, UnitStatus};
use tempfile::TempDir;

fn sample() -> ProjectFile {
    let project = ProjectId::new("tower");
    let phase = ScheduleUnit::phase(
        "foundation",
        &project,
        "Foundation",
        1,
        parse_date("2025-06-01").unwrap(),
        10,
    )
    .unwrap();
    let task = ScheduleUnit::task(
        "pour",
        &phase,
        "Pour slab",
        1,
        parse_date("2025-06-03").unwrap(),
        2,
    )
    .unwrap();
    ProjectFile {
        project_id: project,
        units: vec![phase, task],
    }
}

#[test]
fn write_then_load_preserves_units() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("sitework.json");
    let file = sample();
    file.write_to(&path).unwrap();

    let loaded = ProjectFile::from_path(&path).unwrap();
    assert_eq!(loaded.project_id, file.project_id);
    assert_eq!(loaded.units, file.units);
}

#[test]
fn dates_are_civil_strings() {
    let json = sample().to_string_pretty().unwrap();
    assert!(json.contains("\"planned_start_date\": \"2025-06-01\""));
    assert!(json.contains("\"status\": \"not_started\""));
}

#[test]
fn optional_fields_default_when_missing() {
    let json = r#"{
        "project_id": "tower",
        "units": [{
            "id": "a",
            "project_id": "tower",
            "name": "Site prep",
            "sequence_order": 1,
            "planned_start_date": "2025-06-01",
            "planned_duration_days": 3,
            "planned_end_date": "2025-06-03"
        }]
    }"#;
    let file = ProjectFile::from_json(json).unwrap();
    let unit = &file.units[0];
    assert!(!unit.is_task);
    assert_eq!(unit.buffer_days, 0);
    assert_eq!(unit.status, UnitStatus::NotStarted);
    assert!(unit.predecessor_unit_id.is_none());
}

#[test]
fn rejects_units_from_other_projects() {
    let json = r#"{
        "project_id": "tower",
        "units": [{
            "id": "a",
            "project_id": "bridge",
            "name": "Site prep",
            "sequence_order": 1,
            "planned_start_date": "2025-06-01",
            "planned_duration_days": 3,
            "planned_end_date": "2025-06-03"
        }]
    }"#;
    let err = ProjectFile::from_json(json).unwrap_err();
    assert!(err.to_string().contains("belongs to project bridge"));
}

#[test]
fn missing_file_is_a_snapshot_error() {
    let tmp = TempDir::new().unwrap();
    let err = ProjectFile::from_path(&tmp.path().join("nope.json")).unwrap_err();
    assert!(err.to_string().contains("Failed to read project file"));
}
