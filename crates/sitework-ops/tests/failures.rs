use std::sync::Arc;

use chrono::NaiveDate;
use sitework_core::unit::{ProjectId, ScheduleUnit, UnitId};
use sitework_ops::engine::ScheduleEngine;
use sitework_ops::notify::CollectingNotifier;
use sitework_ops::ops_create::NewUnit;
use sitework_ops::ops_dates::DateEdit;
use sitework_ops::store_memory::MemoryStore;
use sitework_scheduler::cascade::CascadeOptions;
use sitework_util::errors::SiteworkError;

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, n).unwrap()
}

fn id(s: &str) -> UnitId {
    UnitId::new(s)
}

fn chain(len: u32) -> Vec<ScheduleUnit> {
    let project = ProjectId::new("tower");
    (1..=len)
        .map(|i| {
            let unit =
                ScheduleUnit::phase(format!("u{i}"), &project, "step", i, day(i), 1).unwrap();
            if i == 1 {
                unit
            } else {
                unit.with_predecessor(&UnitId::new(format!("u{}", i - 1)))
            }
        })
        .collect()
}

#[tokio::test]
async fn failed_write_reports_applied_and_remaining() {
    let store = Arc::new(MemoryStore::with_units(chain(4)));
    let notifier = Arc::new(CollectingNotifier::new());
    let engine = ScheduleEngine::new(store.clone()).with_notifier(notifier.clone());
    store.fail_writes_for(&id("u3"));

    let err = engine
        .update_unit_dates(&id("u1"), DateEdit::end_at(day(3)))
        .await
        .unwrap_err();
    match err {
        SiteworkError::Persistence {
            unit,
            applied,
            remaining,
            ..
        } => {
            assert_eq!(unit, "u3");
            assert_eq!(applied, vec!["u1", "u2"]);
            assert_eq!(remaining, vec!["u3", "u4"]);
        }
        other => panic!("expected a persistence error, got {other:?}"),
    }
    assert_eq!(store.get(&id("u2")).await.unwrap().planned_start_date, day(4));
    assert_eq!(store.get(&id("u3")).await.unwrap().planned_start_date, day(3));
    assert!(notifier.batches().is_empty());

    // Retrying writes only what is still missing.
    store.clear_failures();
    engine
        .update_unit_dates(&id("u1"), DateEdit::end_at(day(3)))
        .await
        .unwrap();
    assert_eq!(store.write_log(), vec![id("u1"), id("u2"), id("u3"), id("u4")]);
    assert_eq!(store.get(&id("u4")).await.unwrap().planned_start_date, day(6));
}

#[tokio::test]
async fn failed_removal_reports_every_pending_write() {
    let mut units = chain(3);
    let project = ProjectId::new("tower");
    let parent = units[1].clone();
    units.push(ScheduleUnit::task("t", &parent, "task", 1, day(2), 1).unwrap());
    let store = Arc::new(MemoryStore::with_units(units));
    let engine = ScheduleEngine::new(store.clone());
    store.fail_writes_for(&id("u2"));

    let err = engine.delete_unit(&id("u2")).await.unwrap_err();
    match err {
        SiteworkError::Persistence {
            unit,
            applied,
            remaining,
            ..
        } => {
            assert_eq!(unit, "u2");
            assert!(applied.is_empty());
            assert_eq!(remaining, vec!["u2", "u3"]);
        }
        other => panic!("expected a persistence error, got {other:?}"),
    }
    assert!(store.get(&id("t")).await.is_some());
    assert_eq!(
        store.get(&id("u3")).await.unwrap().predecessor_unit_id,
        Some(id("u2"))
    );

    // A failed insert is reported the same way.
    store.fail_writes_for(&id("new"));
    let err = engine
        .create_unit(NewUnit::new(&project, "late", day(9), 1).with_id("new"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SiteworkError::Persistence { ref unit, ref remaining, .. }
            if unit == "new" && remaining == &vec!["new".to_string()]
    ));
    assert!(store.get(&id("new")).await.is_none());
}

#[tokio::test]
async fn stored_cycle_aborts_after_applying_earlier_steps() {
    let project = ProjectId::new("tower");
    let a = ScheduleUnit::phase("A", &project, "A", 1, day(1), 2)
        .unwrap()
        .with_predecessor(&id("B"));
    let b = ScheduleUnit::phase("B", &project, "B", 2, day(3), 2)
        .unwrap()
        .with_predecessor(&id("A"));
    let c = ScheduleUnit::phase("C", &project, "C", 3, day(3), 2)
        .unwrap()
        .with_predecessor(&id("A"));
    let store = Arc::new(MemoryStore::with_units([a, b, c]));
    let notifier = Arc::new(CollectingNotifier::new());
    let engine = ScheduleEngine::new(store.clone()).with_notifier(notifier.clone());

    let err = engine
        .update_unit_dates(&id("A"), DateEdit::end_at(day(4)))
        .await
        .unwrap_err();
    match err {
        SiteworkError::DataIntegrity { unit, message } => {
            assert_eq!(unit, "A");
            assert!(message.contains("cycle"));
        }
        other => panic!("expected a data integrity error, got {other:?}"),
    }

    assert_eq!(store.get(&id("A")).await.unwrap().planned_end_date, day(4));
    assert_eq!(store.get(&id("B")).await.unwrap().planned_start_date, day(5));
    assert_eq!(store.get(&id("C")).await.unwrap().planned_start_date, day(5));
    assert!(notifier.batches().is_empty());
}

#[tokio::test]
async fn runaway_cascade_stops_at_the_visit_budget() {
    let store = Arc::new(MemoryStore::with_units(chain(10)));
    let engine = ScheduleEngine::new(store.clone()).with_options(CascadeOptions {
        max_visits: 4,
        shift_child_tasks: true,
    });

    let err = engine
        .update_unit_dates(&id("u1"), DateEdit::end_at(day(5)))
        .await
        .unwrap_err();
    assert!(matches!(err, SiteworkError::DataIntegrity { ref unit, .. } if unit == "u5"));
    assert_eq!(store.write_log(), vec![id("u1"), id("u2"), id("u3"), id("u4")]);
    assert_eq!(store.get(&id("u5")).await.unwrap().planned_start_date, day(5));
}
