//! Cascade propagation: push a unit's new end date through every unit that
//! transitively depends on it.

use std::collections::VecDeque;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use sitework_core::dates;
use sitework_core::unit::UnitId;
use sitework_util::errors::SiteworkError;

use crate::graph::ScheduleGraph;
use crate::visited::VisitedSet;
use crate::working_set::WorkingSet;

/// Default cap on units visited by one cascade walk.
pub const DEFAULT_MAX_VISITS: usize = 500;

/// Tuning for a cascade walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeOptions {
    /// Abort after visiting this many units (the origin included).
    pub max_visits: usize,
    /// Move a phase's tasks by the same delta whenever the phase moves.
    pub shift_child_tasks: bool,
}

impl Default for CascadeOptions {
    fn default() -> Self {
        Self {
            max_visits: DEFAULT_MAX_VISITS,
            shift_child_tasks: true,
        }
    }
}

/// How a cascade step changed a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Start placed on the day after the predecessor's end.
    Retargeted,
    /// Moved by its phase's delta.
    Shifted,
}

/// One applied cascade step, in application order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleChange {
    pub unit_id: UnitId,
    pub kind: StepKind,
    pub previous_start: NaiveDate,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Why a cascade stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// The unit was reached twice: the predecessor links form a cycle.
    Cycle,
    /// The visit budget ran out before the walk finished.
    BudgetExceeded { max_visits: usize },
}

/// A cascade that stopped before visiting every dependent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeAbort {
    pub unit: UnitId,
    pub reason: AbortReason,
}

impl fmt::Display for CascadeAbort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            AbortReason::Cycle => write!(
                f,
                "unit {} was reached twice; the predecessor chain forms a cycle",
                self.unit
            ),
            AbortReason::BudgetExceeded { max_visits } => write!(
                f,
                "cascade visited more than {max_visits} units before reaching {}",
                self.unit
            ),
        }
    }
}

impl CascadeAbort {
    pub fn into_error(self) -> SiteworkError {
        SiteworkError::DataIntegrity {
            unit: self.unit.to_string(),
            message: self.to_string(),
        }
    }
}

/// Result of a cascade walk.
#[derive(Debug, Clone, Default)]
pub struct CascadeOutcome {
    pub changes: Vec<ScheduleChange>,
    /// Units reached by the walk, the origin included.
    pub visited: usize,
    pub aborted: Option<CascadeAbort>,
}

impl CascadeOutcome {
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }
}

/// Propagate the origin's current end date to its dependents.
///
/// `set` must already hold the origin's new dates. `origin_shift_days` is how
/// far the origin's start moved; when the origin is a phase its tasks are
/// shifted by that amount before any dependent is visited.
///
/// Each dependent starts on the day after its predecessor ends and keeps its
/// duration and buffer. Dependents whose dates already match are left alone
/// but still walked, so a second run over an unchanged set yields no changes.
/// On a cycle or an exhausted budget the walk stops; the changes made so far
/// stay in `set` and in the outcome.
pub fn propagate(
    set: &mut WorkingSet,
    origin: &UnitId,
    origin_shift_days: i64,
    options: &CascadeOptions,
) -> Result<CascadeOutcome, SiteworkError> {
    set.require(origin)?;
    let graph = ScheduleGraph::build(set);
    let mut outcome = CascadeOutcome::default();
    let mut visited = VisitedSet::new();
    visited.visit(origin);
    outcome.visited = 1;

    if options.shift_child_tasks && origin_shift_days != 0 {
        shift_children(set, origin, origin_shift_days, &mut outcome)?;
    }

    let mut queue = VecDeque::from([origin.clone()]);
    while let Some(current) = queue.pop_front() {
        let new_start = dates::next_day(set.require(&current)?.planned_end_date)?;

        for dep_id in graph.dependents_of(&current) {
            if !visited.visit(&dep_id) {
                tracing::warn!("Cascade from {origin} reached {dep_id} twice, aborting");
                outcome.aborted = Some(CascadeAbort {
                    unit: dep_id,
                    reason: AbortReason::Cycle,
                });
                return Ok(outcome);
            }
            if outcome.visited >= options.max_visits {
                tracing::warn!(
                    "Cascade from {origin} exceeded {} visits at {dep_id}, aborting",
                    options.max_visits
                );
                outcome.aborted = Some(CascadeAbort {
                    unit: dep_id,
                    reason: AbortReason::BudgetExceeded {
                        max_visits: options.max_visits,
                    },
                });
                return Ok(outcome);
            }
            outcome.visited += 1;

            let carries_tasks = options.shift_child_tasks && !set.child_ids(&dep_id).is_empty();
            let dep = set.require_mut(&dep_id)?;
            let previous_start = dep.planned_start_date;
            let previous_end = dep.planned_end_date;
            let delta = dates::days_between(previous_start, new_start);
            if carries_tasks {
                // A phase with tasks spans its task envelope, which moves as a block.
                dep.shift_by(delta)?;
            } else {
                dep.reschedule(new_start)?;
            }
            let is_phase = dep.is_phase();
            if dep.planned_start_date != previous_start || dep.planned_end_date != previous_end {
                tracing::debug!(
                    "Cascade: {dep_id} {} -> {}",
                    dates::format_date(previous_start),
                    dates::format_date(new_start)
                );
                outcome.changes.push(ScheduleChange {
                    unit_id: dep_id.clone(),
                    kind: StepKind::Retargeted,
                    previous_start,
                    start: dep.planned_start_date,
                    end: dep.planned_end_date,
                });
            }

            if is_phase && options.shift_child_tasks && delta != 0 {
                shift_children(set, &dep_id, delta, &mut outcome)?;
            }
            queue.push_back(dep_id);
        }
    }

    Ok(outcome)
}

fn shift_children(
    set: &mut WorkingSet,
    phase: &UnitId,
    delta_days: i64,
    outcome: &mut CascadeOutcome,
) -> Result<(), SiteworkError> {
    for child_id in set.child_ids(phase) {
        let child = set.require_mut(&child_id)?;
        let previous_start = child.planned_start_date;
        child.shift_by(delta_days)?;
        outcome.changes.push(ScheduleChange {
            unit_id: child_id,
            kind: StepKind::Shifted,
            previous_start,
            start: child.planned_start_date,
            end: child.planned_end_date,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitework_core::unit::{ProjectId, ScheduleUnit};

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, n).unwrap()
    }

    fn phase(id: &str, order: u32, start: u32, duration: u32) -> ScheduleUnit {
        ScheduleUnit::phase(id, &ProjectId::new("p"), id, order, day(start), duration).unwrap()
    }

    fn id(s: &str) -> UnitId {
        UnitId::new(s)
    }

    #[test]
    fn chain_is_retargeted_in_order() {
        let a = phase("a", 1, 1, 10);
        let b = phase("b", 2, 11, 5).with_predecessor(&a.id);
        let c = phase("c", 3, 16, 2).with_predecessor(&b.id);
        let mut set = WorkingSet::new([a, b, c]);

        set.require_mut(&id("a"))
            .unwrap()
            .reschedule(day(3))
            .unwrap();
        let outcome = propagate(&mut set, &id("a"), 2, &CascadeOptions::default()).unwrap();

        assert!(outcome.is_complete());
        assert_eq!(outcome.visited, 3);
        let order: Vec<&str> = outcome.changes.iter().map(|c| c.unit_id.as_str()).collect();
        assert_eq!(order, vec!["b", "c"]);
        assert_eq!(set.get(&id("b")).unwrap().planned_start_date, day(13));
        assert_eq!(set.get(&id("c")).unwrap().planned_start_date, day(18));
        assert_eq!(set.get(&id("c")).unwrap().planned_end_date, day(19));
    }

    #[test]
    fn dependents_can_be_pulled_earlier() {
        let a = phase("a", 1, 1, 10);
        let b = phase("b", 2, 11, 5).with_predecessor(&a.id);
        let mut set = WorkingSet::new([a, b]);
        set.require_mut(&id("a")).unwrap().planned_duration_days = 4;
        let end = set.get(&id("a")).unwrap().computed_end_date().unwrap();
        set.require_mut(&id("a")).unwrap().planned_end_date = end;

        propagate(&mut set, &id("a"), 0, &CascadeOptions::default()).unwrap();
        assert_eq!(set.get(&id("b")).unwrap().planned_start_date, day(5));
    }

    #[test]
    fn second_run_changes_nothing() {
        let a = phase("a", 1, 1, 10);
        let b = phase("b", 2, 1, 5).with_predecessor(&a.id);
        let c = phase("c", 3, 1, 5).with_predecessor(&b.id);
        let mut set = WorkingSet::new([a, b, c]);

        let first = propagate(&mut set, &id("a"), 0, &CascadeOptions::default()).unwrap();
        assert_eq!(first.changes.len(), 2);
        let second = propagate(&mut set, &id("a"), 0, &CascadeOptions::default()).unwrap();
        assert!(second.changes.is_empty());
        assert_eq!(second.visited, 3);
    }

    #[test]
    fn moving_a_phase_shifts_its_tasks() {
        let a = phase("a", 1, 1, 10);
        let t = ScheduleUnit::task("t", &a, "Task", 1, day(2), 3).unwrap();
        let mut set = WorkingSet::new([a, t]);

        set.require_mut(&id("a"))
            .unwrap()
            .reschedule(day(4))
            .unwrap();
        let outcome = propagate(&mut set, &id("a"), 3, &CascadeOptions::default()).unwrap();
        assert_eq!(outcome.changes.len(), 1);
        assert_eq!(outcome.changes[0].kind, StepKind::Shifted);
        let task = set.get(&id("t")).unwrap();
        assert_eq!(task.planned_start_date, day(5));
        assert_eq!(task.planned_end_date, day(7));
    }

    #[test]
    fn cascaded_phase_with_tasks_stays_on_its_envelope() {
        let a = phase("a", 1, 1, 10);
        let mut b = phase("b", 2, 11, 3)
            .with_buffer(2)
            .unwrap()
            .with_predecessor(&a.id);
        // Rolled up: the envelope of its task, without the buffer.
        b.planned_end_date = day(13);
        let t = ScheduleUnit::task("t", &b, "Task", 1, day(11), 3).unwrap();
        let mut set = WorkingSet::new([a, b, t]);

        let a = set.require_mut(&id("a")).unwrap();
        a.planned_duration_days = 12;
        a.planned_end_date = a.computed_end_date().unwrap();
        propagate(&mut set, &id("a"), 0, &CascadeOptions::default()).unwrap();

        let b = set.get(&id("b")).unwrap();
        assert_eq!((b.planned_start_date, b.planned_end_date), (day(13), day(15)));
        let t = set.get(&id("t")).unwrap();
        assert_eq!((t.planned_start_date, t.planned_end_date), (day(13), day(15)));
    }

    #[test]
    fn child_shift_can_be_disabled() {
        let a = phase("a", 1, 1, 10);
        let t = ScheduleUnit::task("t", &a, "Task", 1, day(2), 3).unwrap();
        let mut set = WorkingSet::new([a, t]);
        let options = CascadeOptions {
            shift_child_tasks: false,
            ..Default::default()
        };
        let outcome = propagate(&mut set, &id("a"), 3, &options).unwrap();
        assert!(outcome.changes.is_empty());
        assert_eq!(set.get(&id("t")).unwrap().planned_start_date, day(2));
    }

    #[test]
    fn cycle_aborts_and_names_the_unit() {
        let a = phase("a", 1, 1, 2).with_predecessor(&id("c"));
        let b = phase("b", 2, 1, 2).with_predecessor(&id("a"));
        let c = phase("c", 3, 1, 2).with_predecessor(&id("b"));
        let mut set = WorkingSet::new([a, b, c]);

        let outcome = propagate(&mut set, &id("a"), 0, &CascadeOptions::default()).unwrap();
        let abort = outcome.aborted.clone().unwrap();
        assert_eq!(abort.unit, id("a"));
        assert_eq!(abort.reason, AbortReason::Cycle);
        // b and c were retargeted before the revisit
        assert_eq!(outcome.changes.len(), 2);
        let err = abort.into_error();
        assert!(err.to_string().contains("Data integrity error at unit a"));
    }

    #[test]
    fn self_link_aborts() {
        let a = phase("a", 1, 1, 2).with_predecessor(&id("a"));
        let mut set = WorkingSet::new([a]);
        let outcome = propagate(&mut set, &id("a"), 0, &CascadeOptions::default()).unwrap();
        assert_eq!(outcome.aborted.unwrap().reason, AbortReason::Cycle);
    }

    #[test]
    fn budget_stops_long_chains() {
        let mut units = vec![phase("u0", 1, 1, 1)];
        for i in 1..10u32 {
            let prev = UnitId::new(format!("u{}", i - 1));
            units.push(phase(&format!("u{i}"), i + 1, 1, 1).with_predecessor(&prev));
        }
        let mut set = WorkingSet::new(units);
        let options = CascadeOptions {
            max_visits: 4,
            ..Default::default()
        };
        let outcome = propagate(&mut set, &id("u0"), 0, &options).unwrap();
        assert_eq!(outcome.visited, 4);
        assert_eq!(outcome.changes.len(), 3);
        let abort = outcome.aborted.unwrap();
        assert_eq!(abort.unit, id("u4"));
        assert_eq!(abort.reason, AbortReason::BudgetExceeded { max_visits: 4 });
    }

    #[test]
    fn unknown_origin_is_not_found() {
        let mut set = WorkingSet::new([phase("a", 1, 1, 2)]);
        assert!(propagate(&mut set, &id("zzz"), 0, &CascadeOptions::default()).is_err());
    }
}
