//! Operation: change a unit's status and stamp its actual dates.

use chrono::NaiveDate;
use sitework_core::unit::{ScheduleUnit, UnitId, UnitStatus};
use sitework_util::errors::SiteworkError;

use crate::engine::{CommandOutcome, ScheduleEngine};
use crate::notify::ChangeKind;

/// Explicit actual dates. Unset fields fall back to today where the status
/// needs them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActualDates {
    pub started: Option<NaiveDate>,
    pub finished: Option<NaiveDate>,
}

/// Set `status` on `unit` and stamp the actual dates it implies.
///
/// Entering `in_progress` records today as the start and clears an earlier
/// finish; entering `completed` records today as the end and fills a missing
/// start. Explicit overrides always win. Repeating the current status only
/// fills dates that are missing.
pub fn apply_status(
    unit: &mut ScheduleUnit,
    status: UnitStatus,
    overrides: ActualDates,
    today: NaiveDate,
) -> Result<(), SiteworkError> {
    let entering = unit.status != status;
    if let Some(started) = overrides.started {
        unit.actual_start_date = Some(started);
    }
    if let Some(finished) = overrides.finished {
        unit.actual_end_date = Some(finished);
    }
    match status {
        UnitStatus::InProgress => {
            if overrides.started.is_none() && (entering || unit.actual_start_date.is_none()) {
                unit.actual_start_date = Some(today);
            }
            if entering && overrides.finished.is_none() {
                unit.actual_end_date = None;
            }
        }
        UnitStatus::Completed => {
            if overrides.finished.is_none() && (entering || unit.actual_end_date.is_none()) {
                unit.actual_end_date = Some(today);
            }
            let end = unit.actual_end_date.unwrap_or(today);
            unit.actual_start_date.get_or_insert(end.min(today));
        }
        _ => {}
    }
    if let (Some(start), Some(end)) = (unit.actual_start_date, unit.actual_end_date) {
        if end < start {
            return Err(SiteworkError::validation(format!(
                "{}: actual end {end} is before actual start {start}",
                unit.id
            )));
        }
    }
    unit.status = status;
    Ok(())
}

impl ScheduleEngine {
    /// Change a unit's status; a task's phase progress is re-rolled.
    pub async fn set_status(
        &self,
        unit_id: &UnitId,
        status: UnitStatus,
        overrides: ActualDates,
    ) -> Result<CommandOutcome, SiteworkError> {
        let today = self.today();
        let (_guard, mut draft) = self.begin_for_unit(unit_id).await?;
        let unit = draft.working.require_mut(unit_id)?;
        apply_status(unit, status, overrides, today)?;

        draft.touch(unit_id, ChangeKind::StatusChanged);
        draft.refresh_scope_of(unit_id)?;
        self.commit(draft).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitework_core::unit::ProjectId;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, n).unwrap()
    }

    fn unit() -> ScheduleUnit {
        ScheduleUnit::phase("u", &ProjectId::new("p"), "Pour", 1, day(1), 3).unwrap()
    }

    #[test]
    fn in_progress_stamps_start_once() {
        let mut u = unit();
        apply_status(&mut u, UnitStatus::InProgress, ActualDates::default(), day(4)).unwrap();
        assert_eq!(u.actual_start_date, Some(day(4)));
        apply_status(&mut u, UnitStatus::InProgress, ActualDates::default(), day(9)).unwrap();
        assert_eq!(u.actual_start_date, Some(day(4)));
        assert_eq!(u.actual_end_date, None);
    }

    #[test]
    fn reopening_and_completing_again_restamps() {
        let mut u = unit();
        apply_status(&mut u, UnitStatus::Completed, ActualDates::default(), day(5)).unwrap();
        assert_eq!(u.actual_end_date, Some(day(5)));

        apply_status(&mut u, UnitStatus::InProgress, ActualDates::default(), day(7)).unwrap();
        assert_eq!(u.actual_start_date, Some(day(7)));
        assert_eq!(u.actual_end_date, None);

        apply_status(&mut u, UnitStatus::Completed, ActualDates::default(), day(9)).unwrap();
        assert_eq!(u.actual_start_date, Some(day(7)));
        assert_eq!(u.actual_end_date, Some(day(9)));

        apply_status(&mut u, UnitStatus::Completed, ActualDates::default(), day(12)).unwrap();
        assert_eq!(u.actual_end_date, Some(day(9)));
    }

    #[test]
    fn completed_fills_missing_start_and_end() {
        let mut u = unit();
        apply_status(&mut u, UnitStatus::Completed, ActualDates::default(), day(6)).unwrap();
        assert_eq!(u.status, UnitStatus::Completed);
        assert_eq!(u.actual_start_date, Some(day(6)));
        assert_eq!(u.actual_end_date, Some(day(6)));
    }

    #[test]
    fn overrides_win() {
        let mut u = unit();
        let dates = ActualDates {
            started: Some(day(2)),
            finished: Some(day(5)),
        };
        apply_status(&mut u, UnitStatus::Completed, dates, day(20)).unwrap();
        assert_eq!(u.actual_start_date, Some(day(2)));
        assert_eq!(u.actual_end_date, Some(day(5)));
    }

    #[test]
    fn finish_before_start_is_rejected() {
        let mut u = unit();
        let dates = ActualDates {
            started: Some(day(5)),
            finished: Some(day(2)),
        };
        assert!(apply_status(&mut u, UnitStatus::Completed, dates, day(20)).is_err());
        assert_eq!(u.status, UnitStatus::NotStarted);
    }
}
