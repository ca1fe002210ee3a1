//! Operation: delete a unit and its tasks.

use sitework_core::unit::UnitId;
use sitework_util::errors::SiteworkError;

use crate::engine::{CommandOutcome, ScheduleEngine};
use crate::notify::ChangeKind;

impl ScheduleEngine {
    /// Remove a unit (a phase takes its tasks with it). Units that depended
    /// on anything removed lose their predecessor link; their dates stay.
    pub async fn delete_unit(&self, unit_id: &UnitId) -> Result<CommandOutcome, SiteworkError> {
        let (_guard, mut draft) = self.begin_for_unit(unit_id).await?;
        let unit = draft.working.require(unit_id)?;
        let parent = unit.parent_unit_id.clone().filter(|_| unit.is_task);
        let nested = draft.working.child_ids(unit_id);

        let orphaned: Vec<UnitId> = draft
            .working
            .iter()
            .filter(|u| &u.id != unit_id && !nested.contains(&u.id))
            .filter(|u| {
                u.predecessor_unit_id
                    .as_ref()
                    .is_some_and(|p| p == unit_id || nested.contains(p))
            })
            .map(|u| u.id.clone())
            .collect();
        for id in &orphaned {
            draft.working.require_mut(id)?.predecessor_unit_id = None;
            draft.touch(id, ChangeKind::PredecessorChanged);
        }

        draft.remove(unit_id, &nested);
        if let Some(ref phase) = parent {
            draft.refresh_phase(phase)?;
        }
        tracing::info!(
            "Deleting {unit_id} with {} task(s), unlinking {} dependent(s)",
            nested.len(),
            orphaned.len()
        );
        self.commit(draft).await
    }
}
