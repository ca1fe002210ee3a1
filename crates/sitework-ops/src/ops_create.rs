//! Operation: create a phase or task.

use chrono::NaiveDate;
use sitework_core::unit::{ProjectId, ScheduleUnit, SiblingScope, UnitId};
use sitework_scheduler::resolver::{self, ResolveMode};
use sitework_scheduler::sequence;
use sitework_util::errors::SiteworkError;

use crate::engine::{CommandOutcome, ScheduleEngine};

/// Input for [`ScheduleEngine::create_unit`].
#[derive(Debug, Clone)]
pub struct NewUnit {
    pub project_id: ProjectId,
    /// Generated when absent.
    pub id: Option<UnitId>,
    pub name: String,
    /// Set for tasks; must name a phase of the same project.
    pub parent: Option<UnitId>,
    pub start: NaiveDate,
    pub duration_days: u32,
    pub buffer_days: u32,
    /// Appended after the last sibling when absent.
    pub sequence_order: Option<u32>,
    pub predecessor: Option<UnitId>,
}

impl NewUnit {
    pub fn new(
        project_id: &ProjectId,
        name: impl Into<String>,
        start: NaiveDate,
        duration_days: u32,
    ) -> Self {
        Self {
            project_id: project_id.clone(),
            id: None,
            name: name.into(),
            parent: None,
            start,
            duration_days,
            buffer_days: 0,
            sequence_order: None,
            predecessor: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<UnitId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn under(mut self, parent: &UnitId) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub fn after(mut self, predecessor: &UnitId) -> Self {
        self.predecessor = Some(predecessor.clone());
        self
    }

    pub fn with_buffer(mut self, buffer_days: u32) -> Self {
        self.buffer_days = buffer_days;
        self
    }

    pub fn at_order(mut self, sequence_order: u32) -> Self {
        self.sequence_order = Some(sequence_order);
        self
    }
}

impl ScheduleEngine {
    /// Create a unit. With a predecessor, the start is moved to the day after
    /// the predecessor ends; a new task also refreshes its phase's rollup.
    pub async fn create_unit(&self, new: NewUnit) -> Result<CommandOutcome, SiteworkError> {
        if new.name.trim().is_empty() {
            return Err(SiteworkError::validation("unit name must not be empty"));
        }
        let (_guard, mut draft) = self.begin(&new.project_id).await?;

        let id = new.id.clone().unwrap_or_else(UnitId::generate);
        if draft.working.contains(&id) {
            return Err(SiteworkError::validation(format!("unit {id} already exists")));
        }

        let scope = match new.parent {
            Some(ref parent_id) => {
                let parent = draft.working.get(parent_id).ok_or_else(|| {
                    SiteworkError::validation(format!("unknown parent phase {parent_id}"))
                })?;
                if parent.is_task {
                    return Err(SiteworkError::validation(format!(
                        "{parent_id} is a task; tasks can only be nested under phases"
                    )));
                }
                SiblingScope::TasksOf(parent_id.clone())
            }
            None => SiblingScope::Phases,
        };

        let siblings = draft.working.siblings(&scope);
        let order = match new.sequence_order {
            Some(0) => {
                return Err(SiteworkError::validation(
                    "sequence order starts at 1",
                ))
            }
            Some(order) => {
                if let Some(taken) = siblings.iter().find(|s| s.sequence_order == order) {
                    return Err(SiteworkError::validation(format!(
                        "sequence order {order} in {scope} is already taken by {}",
                        taken.id
                    )));
                }
                order
            }
            None => sequence::next_sequence_order(&siblings),
        };

        let mut unit = match new.parent {
            Some(ref parent_id) => {
                let parent = draft.working.require(parent_id)?;
                ScheduleUnit::task(
                    id.clone(),
                    parent,
                    new.name.trim(),
                    order,
                    new.start,
                    new.duration_days,
                )?
            }
            None => ScheduleUnit::phase(
                id.clone(),
                &new.project_id,
                new.name.trim(),
                order,
                new.start,
                new.duration_days,
            )?,
        }
        .with_buffer(new.buffer_days)?;

        if let Some(ref pred_id) = new.predecessor {
            resolver::validate_predecessor(&unit, pred_id, &draft.working)?;
            unit.predecessor_unit_id = Some(pred_id.clone());
            let resolution = resolver::resolve(&unit, &draft.working, ResolveMode::Create)?;
            if let Some(start) = resolution.resolved_start_date {
                tracing::debug!("Placing {id} on {start}, after {pred_id}");
                unit.reschedule(start)?;
            }
        }

        draft.create(unit);
        draft.refresh_scope_of(&id)?;
        self.commit(draft).await
    }
}
