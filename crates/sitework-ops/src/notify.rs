//! Change notification collaborator.
//!
//! Delivery (SMS, email) happens outside this crate; the engine only reports
//! which units changed and how.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use sitework_core::unit::{ProjectId, UnitId};

/// What happened to a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Rescheduled,
    Shifted,
    Resequenced,
    PredecessorChanged,
    StatusChanged,
    RollupChanged,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEvent {
    pub unit_id: UnitId,
    pub kind: ChangeKind,
}

/// Receives the events of every successful command.
pub trait ChangeNotifier: Send + Sync {
    fn notify(&self, project: &ProjectId, events: &[ScheduleEvent]);
}

/// Logs each event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl ChangeNotifier for TracingNotifier {
    fn notify(&self, project: &ProjectId, events: &[ScheduleEvent]) {
        for event in events {
            tracing::info!(
                project = %project,
                unit = %event.unit_id,
                kind = ?event.kind,
                "Schedule change"
            );
        }
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl ChangeNotifier for NullNotifier {
    fn notify(&self, _project: &ProjectId, _events: &[ScheduleEvent]) {}
}

/// Keeps every batch in memory.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    batches: Mutex<Vec<(ProjectId, Vec<ScheduleEvent>)>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<(ProjectId, Vec<ScheduleEvent>)> {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All events in delivery order, across batches.
    pub fn events(&self) -> Vec<ScheduleEvent> {
        self.batches()
            .into_iter()
            .flat_map(|(_, events)| events)
            .collect()
    }
}

impl ChangeNotifier for CollectingNotifier {
    fn notify(&self, project: &ProjectId, events: &[ScheduleEvent]) {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((project.clone(), events.to_vec()));
    }
}
