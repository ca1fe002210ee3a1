//! Operation: set or clear a unit's predecessor.

use sitework_core::unit::UnitId;
use sitework_scheduler::resolver;
use sitework_util::errors::SiteworkError;

use crate::engine::{CommandOutcome, ScheduleEngine};
use crate::notify::ChangeKind;

impl ScheduleEngine {
    /// Point `unit_id` at a new predecessor, or detach it with `None`.
    ///
    /// Dates are not moved; an overlap with the new predecessor comes back as
    /// a conflict.
    pub async fn reassign_predecessor(
        &self,
        unit_id: &UnitId,
        predecessor: Option<UnitId>,
    ) -> Result<CommandOutcome, SiteworkError> {
        let (_guard, mut draft) = self.begin_for_unit(unit_id).await?;

        if let Some(ref pred_id) = predecessor {
            let unit = draft.working.require(unit_id)?;
            resolver::validate_predecessor(unit, pred_id, &draft.working)?;
        }
        let unit = draft.working.require_mut(unit_id)?;
        if unit.predecessor_unit_id == predecessor {
            tracing::info!("{unit_id} already has predecessor {predecessor:?}");
        }
        unit.predecessor_unit_id = predecessor;

        draft.touch(unit_id, ChangeKind::PredecessorChanged);
        draft.refresh_scope_of(unit_id)?;
        self.commit(draft).await
    }
}
