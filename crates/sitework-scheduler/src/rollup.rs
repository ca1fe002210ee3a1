//! Phase rollup: derived duration, envelope dates and completion percentage
//! computed from a phase's tasks.

use chrono::NaiveDate;
use sitework_core::dates;
use sitework_core::unit::{ScheduleUnit, UnitStatus};
use sitework_util::errors::SiteworkError;

/// Derived values for a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rollup {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub derived_duration_days: u32,
    pub progress_percent: u8,
}

/// What [`apply`] changed on the phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollupEffect {
    pub dates_changed: bool,
    pub end_changed: bool,
    pub progress_changed: bool,
}

impl RollupEffect {
    pub fn changed(&self) -> bool {
        self.dates_changed || self.progress_changed
    }
}

/// Compute a phase's rollup from its tasks.
///
/// Without tasks the phase's own dates and manual duration stand. With tasks
/// the phase spans exactly the envelope of the task ranges; its manual
/// duration and buffer are ignored.
pub fn rollup(phase: &ScheduleUnit, tasks: &[&ScheduleUnit]) -> Result<Rollup, SiteworkError> {
    let (Some(start), Some(envelope_end)) = (
        tasks.iter().map(|t| t.planned_start_date).min(),
        tasks.iter().map(|t| t.planned_end_date).max(),
    ) else {
        return Ok(Rollup {
            start: phase.planned_start_date,
            end: phase.planned_end_date,
            derived_duration_days: phase.planned_duration_days,
            progress_percent: if phase.status == UnitStatus::Completed {
                100
            } else {
                0
            },
        });
    };

    let derived_duration_days = dates::duration_from_end_date(start, envelope_end);
    Ok(Rollup {
        start,
        end: envelope_end,
        derived_duration_days,
        progress_percent: weighted_progress(tasks),
    })
}

/// Completion percentage weighted by planned task duration.
///
/// Falls back to the plain completed/total ratio when every task has a zero
/// duration. Rounds half up.
pub fn weighted_progress(tasks: &[&ScheduleUnit]) -> u8 {
    if tasks.is_empty() {
        return 0;
    }
    let total: u64 = tasks.iter().map(|t| u64::from(t.planned_duration_days)).sum();
    let (done, all) = if total == 0 {
        let done = tasks
            .iter()
            .filter(|t| t.status == UnitStatus::Completed)
            .count() as u64;
        (done, tasks.len() as u64)
    } else {
        let done: u64 = tasks
            .iter()
            .filter(|t| t.status == UnitStatus::Completed)
            .map(|t| u64::from(t.planned_duration_days))
            .sum();
        (done, total)
    };
    let percent = (200 * done + all) / (2 * all);
    u8::try_from(percent.min(100)).unwrap_or(100)
}

/// Write a rollup onto the phase, reporting what moved.
pub fn apply(phase: &mut ScheduleUnit, rollup: &Rollup) -> RollupEffect {
    let effect = RollupEffect {
        dates_changed: phase.planned_start_date != rollup.start
            || phase.planned_end_date != rollup.end
            || phase.planned_duration_days != rollup.derived_duration_days,
        end_changed: phase.planned_end_date != rollup.end,
        progress_changed: phase.progress_percent != rollup.progress_percent,
    };
    phase.planned_start_date = rollup.start;
    phase.planned_end_date = rollup.end;
    phase.planned_duration_days = rollup.derived_duration_days;
    phase.progress_percent = rollup.progress_percent;
    effect
}
