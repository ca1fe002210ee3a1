use std::sync::Arc;

use chrono::NaiveDate;
use sitework_core::snapshot::ProjectFile;
use sitework_core::unit::{ProjectId, UnitId};
use sitework_ops::engine::ScheduleEngine;
use sitework_ops::notify::NullNotifier;
use sitework_ops::ops_create::NewUnit;
use sitework_ops::ops_dates::DateEdit;
use sitework_ops::store::UnitStore;
use sitework_ops::store_file::JsonFileStore;
use tempfile::TempDir;

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, n).unwrap()
}

#[tokio::test]
async fn commands_persist_to_the_project_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("sitework.json");
    let project = ProjectId::new("tower");
    let store = Arc::new(JsonFileStore::create(&path, project.clone()).unwrap());
    let engine = ScheduleEngine::new(store).with_notifier(Arc::new(NullNotifier));

    engine
        .create_unit(NewUnit::new(&project, "Excavation", day(1), 10).with_id("A"))
        .await
        .unwrap();
    engine
        .create_unit(
            NewUnit::new(&project, "Foundation", day(1), 5)
                .with_id("B")
                .after(&UnitId::new("A")),
        )
        .await
        .unwrap();
    engine
        .update_unit_dates(&UnitId::new("A"), DateEdit::end_at(day(12)))
        .await
        .unwrap();

    let file = ProjectFile::from_path(&path).unwrap();
    assert_eq!(file.project_id, project);
    let b = file.units.iter().find(|u| u.id.as_str() == "B").unwrap();
    assert_eq!(b.planned_start_date, day(13));
    assert_eq!(b.planned_end_date, day(17));

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.fetch_units_by_project(&project).await.unwrap().len(), 2);
    assert!(reopened
        .fetch_units_by_project(&ProjectId::new("other"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn delete_rewrites_the_file_without_nested_tasks() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("sitework.json");
    let project = ProjectId::new("tower");
    let store = Arc::new(JsonFileStore::create(&path, project.clone()).unwrap());
    let engine = ScheduleEngine::new(store.clone());

    engine
        .create_unit(NewUnit::new(&project, "Shell", day(1), 5).with_id("P"))
        .await
        .unwrap();
    engine
        .create_unit(
            NewUnit::new(&project, "Walls", day(2), 2)
                .with_id("t")
                .under(&UnitId::new("P")),
        )
        .await
        .unwrap();
    engine.delete_unit(&UnitId::new("P")).await.unwrap();

    assert!(ProjectFile::from_path(&path).unwrap().units.is_empty());
    assert!(store.fetch_unit(&UnitId::new("t")).await.is_err());
}

#[test]
fn create_refuses_to_overwrite() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("sitework.json");
    JsonFileStore::create(&path, ProjectId::new("a")).unwrap();
    assert!(JsonFileStore::create(&path, ProjectId::new("b")).is_err());
}
