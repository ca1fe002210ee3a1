//! Operation: move or resize a unit.

use chrono::NaiveDate;
use sitework_core::dates;
use sitework_core::unit::UnitId;
use sitework_util::errors::SiteworkError;

use crate::engine::{CommandOutcome, ScheduleEngine};
use crate::notify::ChangeKind;

/// A date edit. Unset fields keep their current value.
///
/// `end` is the resize-against-end edge: the start stays, the duration is
/// back-solved so the unit ends on that day. It cannot be combined with
/// `duration_days`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateEdit {
    pub start: Option<NaiveDate>,
    pub duration_days: Option<u32>,
    pub buffer_days: Option<u32>,
    pub end: Option<NaiveDate>,
}

impl DateEdit {
    pub fn move_to(start: NaiveDate) -> Self {
        Self {
            start: Some(start),
            ..Self::default()
        }
    }

    pub fn end_at(end: NaiveDate) -> Self {
        Self {
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl ScheduleEngine {
    /// Apply a date edit, cascade it to every dependent and refresh the
    /// affected phase rollup.
    ///
    /// Editing never re-places the start after the predecessor; a start that
    /// now overlaps it is reported as a conflict.
    pub async fn update_unit_dates(
        &self,
        unit_id: &UnitId,
        edit: DateEdit,
    ) -> Result<CommandOutcome, SiteworkError> {
        if edit.is_empty() {
            return Err(SiteworkError::validation(
                "date edit must change the start, duration, buffer or end",
            ));
        }
        if edit.end.is_some() && edit.duration_days.is_some() {
            return Err(SiteworkError::validation(
                "give either a duration or an end date, not both",
            ));
        }
        let (_guard, mut draft) = self.begin_for_unit(unit_id).await?;

        let has_tasks = !draft.working.children_of(unit_id).is_empty();
        let unit = draft.working.require_mut(unit_id)?;
        if has_tasks && (edit.duration_days.is_some() || edit.end.is_some()) {
            return Err(SiteworkError::validation(format!(
                "{unit_id} has tasks; its duration follows them and cannot be set directly"
            )));
        }

        let previous_start = unit.planned_start_date;
        let previous_end = unit.planned_end_date;
        if let Some(start) = edit.start {
            unit.planned_start_date = start;
        }
        if let Some(buffer) = edit.buffer_days {
            unit.buffer_days = buffer;
        }
        if let Some(duration) = edit.duration_days {
            unit.planned_duration_days = duration;
        }
        match edit.end {
            Some(end) => {
                if end < unit.planned_start_date {
                    return Err(SiteworkError::validation(format!(
                        "end {end} is before start {}",
                        unit.planned_start_date
                    )));
                }
                let span = dates::duration_from_end_date(unit.planned_start_date, end);
                unit.planned_duration_days = span.saturating_sub(unit.buffer_days).max(1);
                unit.planned_end_date = unit.computed_end_date()?;
                if unit.planned_end_date != end {
                    tracing::warn!(
                        "{unit_id}: buffer of {} days does not fit before {end}; ending {}",
                        unit.buffer_days,
                        unit.planned_end_date
                    );
                }
            }
            None if has_tasks => {
                let delta = dates::days_between(previous_start, unit.planned_start_date);
                unit.planned_end_date = dates::shift(previous_end, delta)?;
            }
            None => unit.planned_end_date = unit.computed_end_date()?,
        }
        let shift = dates::days_between(previous_start, unit.planned_start_date);

        draft.touch(unit_id, ChangeKind::Rescheduled);
        draft.cascade_from(unit_id, shift)?;
        draft.refresh_scope_of(unit_id)?;
        self.commit(draft).await
    }
}
