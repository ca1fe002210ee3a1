//! The scheduling engine: per-project serialization, change tracking and
//! sequential persistence shared by every command.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use serde::Serialize;
use sitework_core::config::GlobalConfig;
use sitework_core::unit::{ProjectId, ScheduleUnit, UnitId, UnitPatch};
use sitework_scheduler::cascade::{self, CascadeAbort, CascadeOptions, ScheduleChange, StepKind};
use sitework_scheduler::conflict::ConflictReport;
use sitework_scheduler::resolver::{self, ResolveMode};
use sitework_scheduler::rollup;
use sitework_scheduler::working_set::WorkingSet;
use sitework_util::errors::SiteworkError;
use tokio::sync::OwnedMutexGuard;

use crate::notify::{ChangeKind, ChangeNotifier, NullNotifier, ScheduleEvent, TracingNotifier};
use crate::store::UnitStore;

/// A persisted partial update.
#[derive(Debug, Clone, Serialize)]
pub struct UnitChange {
    pub unit_id: UnitId,
    pub patch: UnitPatch,
}

/// What a command did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommandOutcome {
    /// Updates written to the store, in write order (creations excluded).
    pub changes: Vec<UnitChange>,
    /// Current state of every created or updated unit.
    pub units: Vec<ScheduleUnit>,
    pub created: Option<UnitId>,
    pub removed: Vec<UnitId>,
    /// Cascade steps in application order.
    pub cascade: Vec<ScheduleChange>,
    /// Non-fatal warnings.
    pub conflicts: ConflictReport,
    pub events: Vec<ScheduleEvent>,
}

impl CommandOutcome {
    pub fn unit(&self, id: &UnitId) -> Option<&ScheduleUnit> {
        self.units.iter().find(|u| &u.id == id)
    }

    pub fn is_noop(&self) -> bool {
        self.changes.is_empty() && self.created.is_none() && self.removed.is_empty()
    }
}

/// One async mutex per project, created on first use.
#[derive(Debug, Default)]
pub struct ProjectLocks {
    inner: Mutex<HashMap<ProjectId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `project`.
    pub async fn acquire(&self, project: &ProjectId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            map.entry(project.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Runs scheduling commands against a [`UnitStore`].
pub struct ScheduleEngine {
    store: Arc<dyn UnitStore>,
    notifier: Arc<dyn ChangeNotifier>,
    options: CascadeOptions,
    locks: ProjectLocks,
    today: fn() -> NaiveDate,
}

impl ScheduleEngine {
    pub fn new(store: Arc<dyn UnitStore>) -> Self {
        Self {
            store,
            notifier: Arc::new(TracingNotifier),
            options: CascadeOptions::default(),
            locks: ProjectLocks::new(),
            today: local_today,
        }
    }

    /// Build an engine using the cascade and notification settings of `config`.
    pub fn from_config(store: Arc<dyn UnitStore>, config: &GlobalConfig) -> Self {
        let engine = Self::new(store).with_options(CascadeOptions {
            max_visits: config.cascade.max_visits,
            shift_child_tasks: config.cascade.shift_child_tasks,
        });
        if config.notify.log_events {
            engine
        } else {
            engine.with_notifier(Arc::new(NullNotifier))
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ChangeNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_options(mut self, options: CascadeOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the clock used to stamp actual start/end dates.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn store(&self) -> &Arc<dyn UnitStore> {
        &self.store
    }

    pub fn options(&self) -> &CascadeOptions {
        &self.options
    }

    pub(crate) fn today(&self) -> NaiveDate {
        (self.today)()
    }

    /// Lock a project and take its snapshot.
    pub(crate) async fn begin(
        &self,
        project: &ProjectId,
    ) -> Result<(OwnedMutexGuard<()>, Draft), SiteworkError> {
        let guard = self.locks.acquire(project).await;
        let units = self.store.fetch_units_by_project(project).await?;
        Ok((guard, Draft::new(project.clone(), units, self.options)))
    }

    /// Lock the project owning `unit` and take its snapshot.
    pub(crate) async fn begin_for_unit(
        &self,
        unit: &UnitId,
    ) -> Result<(OwnedMutexGuard<()>, Draft), SiteworkError> {
        let project = self.store.fetch_unit(unit).await?.project_id;
        let (guard, draft) = self.begin(&project).await?;
        // The unit may have been removed while we waited for the lock.
        draft.working.require(unit)?;
        Ok((guard, draft))
    }

    /// Write a finished draft to the store and notify.
    ///
    /// Writes go out one unit at a time. A failed write stops the command;
    /// earlier writes stay and the error lists what was and was not applied.
    pub(crate) async fn commit(&self, mut draft: Draft) -> Result<CommandOutcome, SiteworkError> {
        draft.collect_conflicts();
        let mut outcome = CommandOutcome {
            conflicts: draft.conflicts.clone(),
            cascade: draft.cascade.clone(),
            ..Default::default()
        };
        let mut applied: Vec<UnitId> = Vec::new();
        let plan = draft.pending_patches();
        let planned: Vec<UnitId> = draft
            .removed_root
            .iter()
            .chain(draft.created.iter())
            .chain(plan.iter().map(|(id, _)| id))
            .cloned()
            .collect();

        if let Some(ref root) = draft.removed_root {
            match self.store.remove_unit(root).await {
                Ok(removed) => outcome.removed = removed,
                Err(e) => return Err(write_failed(root, &e, &applied, &planned)),
            }
            applied.extend(outcome.removed.iter().cloned());
        }
        if let Some(ref id) = draft.created {
            let unit = draft.working.require(id)?;
            if let Err(e) = self.store.insert_unit(unit).await {
                return Err(write_failed(id, &e, &applied, &planned));
            }
            applied.push(id.clone());
            outcome.created = Some(id.clone());
            outcome.units.push(unit.clone());
        }

        for (id, patch) in &plan {
            if let Err(e) = self.store.persist_unit_update(id, patch).await {
                return Err(write_failed(id, &e, &applied, &planned));
            }
            applied.push(id.clone());
            outcome.changes.push(UnitChange {
                unit_id: id.clone(),
                patch: patch.clone(),
            });
            if let Some(unit) = draft.working.get(id) {
                outcome.units.push(unit.clone());
            }
        }

        if let Some(abort) = draft.abort.take() {
            tracing::warn!(
                "Cascade in project {} aborted after {} writes: {abort}",
                draft.project_id,
                applied.len()
            );
            return Err(abort.into_error());
        }

        let written: HashSet<&UnitId> = applied.iter().collect();
        outcome.events = draft
            .events
            .iter()
            .filter(|e| written.contains(&e.unit_id))
            .cloned()
            .collect();
        if !outcome.events.is_empty() {
            self.notifier.notify(&draft.project_id, &outcome.events);
        }
        for conflict in outcome.conflicts.iter() {
            tracing::warn!("Schedule conflict: {conflict}");
        }
        tracing::info!(
            "Project {}: {} unit(s) written, {} conflict(s)",
            draft.project_id,
            applied.len(),
            outcome.conflicts.len()
        );
        Ok(outcome)
    }
}

/// Persistence error for a failed store write: everything written so far,
/// then the failing unit and every write planned after it.
fn write_failed(
    unit: &UnitId,
    error: &SiteworkError,
    applied: &[UnitId],
    planned: &[UnitId],
) -> SiteworkError {
    tracing::warn!("Persisting {unit} failed after {} writes: {error}", applied.len());
    let from = planned.iter().position(|u| u == unit).unwrap_or(0);
    SiteworkError::Persistence {
        unit: unit.to_string(),
        message: error.to_string(),
        applied: applied.iter().map(|u| u.to_string()).collect(),
        remaining: planned[from..].iter().map(|u| u.to_string()).collect(),
    }
}

/// Pending work of one command: the fetched snapshot, the working copy
/// being edited, and which units were touched and how.
pub(crate) struct Draft {
    pub project_id: ProjectId,
    original: WorkingSet,
    pub working: WorkingSet,
    touched: Vec<UnitId>,
    events: Vec<ScheduleEvent>,
    cascade: Vec<ScheduleChange>,
    pub conflicts: ConflictReport,
    created: Option<UnitId>,
    removed_root: Option<UnitId>,
    abort: Option<CascadeAbort>,
    options: CascadeOptions,
}

impl Draft {
    fn new(project_id: ProjectId, units: Vec<ScheduleUnit>, options: CascadeOptions) -> Self {
        let original = WorkingSet::new(units);
        Self {
            project_id,
            working: original.clone(),
            original,
            touched: Vec::new(),
            events: Vec::new(),
            cascade: Vec::new(),
            conflicts: ConflictReport::new(),
            created: None,
            removed_root: None,
            abort: None,
            options,
        }
    }

    /// Record that `id` changed in the working copy.
    pub fn touch(&mut self, id: &UnitId, kind: ChangeKind) {
        if !self.touched.contains(id) {
            self.touched.push(id.clone());
        }
        let event = ScheduleEvent {
            unit_id: id.clone(),
            kind,
        };
        if !self.events.contains(&event) {
            self.events.push(event);
        }
    }

    /// Add a unit that does not exist in the store yet.
    pub fn create(&mut self, unit: ScheduleUnit) {
        let id = unit.id.clone();
        self.working.insert(unit);
        self.created = Some(id.clone());
        self.touch(&id, ChangeKind::Created);
    }

    /// Drop `root` and the given nested units from the working copy.
    pub fn remove(&mut self, root: &UnitId, nested: &[UnitId]) {
        self.working.remove(root);
        for id in nested {
            self.working.remove(id);
            self.touch(id, ChangeKind::Deleted);
        }
        self.touch(root, ChangeKind::Deleted);
        self.removed_root = Some(root.clone());
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.is_some()
    }

    /// Cascade from `origin`, whose start moved by `shift_days`.
    pub fn cascade_from(&mut self, origin: &UnitId, shift_days: i64) -> Result<(), SiteworkError> {
        if self.is_aborted() {
            return Ok(());
        }
        let outcome = cascade::propagate(&mut self.working, origin, shift_days, &self.options)?;
        for change in &outcome.changes {
            let kind = match change.kind {
                StepKind::Retargeted => ChangeKind::Rescheduled,
                StepKind::Shifted => ChangeKind::Shifted,
            };
            self.touch(&change.unit_id, kind);
        }
        self.cascade.extend(outcome.changes);
        self.abort = outcome.aborted;
        Ok(())
    }

    /// Recompute a phase's rollup; cascade from it when its end moved.
    pub fn refresh_phase(&mut self, phase_id: &UnitId) -> Result<(), SiteworkError> {
        if self.is_aborted() {
            return Ok(());
        }
        let Some(phase) = self.working.get(phase_id) else {
            return Ok(());
        };
        let tasks = self.working.children_of(phase_id);
        let summary = rollup::rollup(phase, &tasks)?;
        let phase = self.working.require_mut(phase_id)?;
        let effect = rollup::apply(phase, &summary);
        if effect.changed() {
            self.touch(phase_id, ChangeKind::RollupChanged);
        }
        if effect.end_changed {
            self.cascade_from(phase_id, 0)?;
        }
        Ok(())
    }

    /// Refresh the phase whose rollup depends on `unit`: the unit itself if
    /// it is a phase, its parent if it is a task.
    pub fn refresh_scope_of(&mut self, unit: &UnitId) -> Result<(), SiteworkError> {
        let phase = match self.working.get(unit) {
            Some(u) if u.is_task => u.parent_unit_id.clone(),
            Some(u) => Some(u.id.clone()),
            None => None,
        };
        match phase {
            Some(phase) => self.refresh_phase(&phase),
            None => Ok(()),
        }
    }

    /// Conflict-check every touched unit against its predecessor.
    fn collect_conflicts(&mut self) {
        for id in &self.touched {
            let Some(unit) = self.working.get(id) else {
                continue;
            };
            if let Ok(resolution) = resolver::resolve(unit, &self.working, ResolveMode::Edit) {
                if let Some(conflict) = resolution.conflict {
                    self.conflicts.add(conflict);
                }
            }
        }
    }

    /// Patches for touched units that existed before this command, in touch order.
    fn pending_patches(&self) -> Vec<(UnitId, UnitPatch)> {
        self.touched
            .iter()
            .filter(|id| Some(*id) != self.created.as_ref())
            .filter_map(|id| {
                let before = self.original.get(id)?;
                let after = self.working.get(id)?;
                let patch = UnitPatch::between(before, after);
                (!patch.is_empty()).then(|| (id.clone(), patch))
            })
            .collect()
    }
}
