//! Operation: drag-reorder siblings.

use sitework_core::unit::{ProjectId, SiblingScope, UnitId};
use sitework_scheduler::resolver;
use sitework_scheduler::sequence::{self, SequenceChange};
use sitework_scheduler::working_set::WorkingSet;
use sitework_util::errors::SiteworkError;

use crate::engine::{CommandOutcome, Draft, ScheduleEngine};
use crate::notify::ChangeKind;

impl ScheduleEngine {
    /// Renumber a scope to follow `ordered_ids`, which must list every
    /// sibling exactly once. Dates never move.
    pub async fn reorder_siblings(
        &self,
        project: &ProjectId,
        scope: &SiblingScope,
        ordered_ids: &[UnitId],
    ) -> Result<CommandOutcome, SiteworkError> {
        let (_guard, draft) = self.begin(project).await?;
        check_scope(&draft.working, scope)?;
        let changes = sequence::apply_order(&draft.working.siblings(scope), ordered_ids)?;
        self.finish_reorder(draft, scope, changes).await
    }

    /// Move the sibling at `old_index` to `new_index` (zero-based timeline
    /// positions within `scope`).
    pub async fn move_sibling(
        &self,
        project: &ProjectId,
        scope: &SiblingScope,
        old_index: usize,
        new_index: usize,
    ) -> Result<CommandOutcome, SiteworkError> {
        let (_guard, draft) = self.begin(project).await?;
        check_scope(&draft.working, scope)?;
        let changes =
            sequence::move_sibling(&draft.working.siblings(scope), old_index, new_index)?;
        self.finish_reorder(draft, scope, changes).await
    }

    async fn finish_reorder(
        &self,
        mut draft: Draft,
        scope: &SiblingScope,
        changes: Vec<SequenceChange>,
    ) -> Result<CommandOutcome, SiteworkError> {
        for change in &changes {
            draft.working.require_mut(&change.unit_id)?.sequence_order = change.sequence_order;
            draft.touch(&change.unit_id, ChangeKind::Resequenced);
        }

        // New positions can invalidate links anywhere in the scope.
        let report = resolver::scan_conflicts(&draft.working);
        for conflict in report.iter() {
            let in_scope = draft
                .working
                .get(conflict.unit_id())
                .is_some_and(|u| &u.scope() == scope);
            if in_scope {
                draft.conflicts.add(conflict.clone());
            }
        }
        tracing::info!("Reordered {scope}: {} unit(s) renumbered", changes.len());
        self.commit(draft).await
    }
}

fn check_scope(set: &WorkingSet, scope: &SiblingScope) -> Result<(), SiteworkError> {
    if let SiblingScope::TasksOf(parent) = scope {
        match set.get(parent) {
            Some(unit) if unit.is_phase() => {}
            Some(_) => {
                return Err(SiteworkError::validation(format!(
                    "{parent} is a task and has no tasks of its own"
                )))
            }
            None => {
                return Err(SiteworkError::validation(format!(
                    "unknown parent phase {parent}"
                )))
            }
        }
    }
    Ok(())
}
