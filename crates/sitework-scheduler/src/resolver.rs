//! Predecessor eligibility, start-date resolution and conflict checks.

use chrono::NaiveDate;
use sitework_core::dates;
use sitework_core::unit::{ScheduleUnit, SiblingScope, UnitId};
use sitework_util::errors::SiteworkError;

use crate::conflict::{ConflictReport, ScheduleConflict};
use crate::visited::VisitedSet;
use crate::working_set::WorkingSet;

/// Whether a unit is being created or edited.
///
/// Auto-placing the start after the predecessor only happens on create, so
/// editing an existing schedule never moves a start date on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    Create,
    Edit,
}

/// Outcome of resolving a unit against its predecessor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Start date the caller should apply (create mode only).
    pub resolved_start_date: Option<NaiveDate>,
    pub conflict: Option<ScheduleConflict>,
}

/// Units `unit` may depend on, in sequence order.
///
/// Tasks may depend on any sibling task under the same phase; phases only on
/// top-level phases with a strictly smaller sequence order.
pub fn eligible_predecessors<'a>(unit: &ScheduleUnit, set: &'a WorkingSet) -> Vec<&'a ScheduleUnit> {
    set.siblings(&unit.scope())
        .into_iter()
        .filter(|candidate| ineligibility(unit, candidate).is_none())
        .collect()
}

/// Why `candidate` cannot be `unit`'s predecessor, or `None` if it can.
pub fn ineligibility(unit: &ScheduleUnit, candidate: &ScheduleUnit) -> Option<String> {
    if candidate.id == unit.id {
        return Some("a unit cannot depend on itself".to_string());
    }
    if candidate.project_id != unit.project_id {
        return Some(format!("{} belongs to another project", candidate.id));
    }
    if candidate.scope() != unit.scope() {
        return Some(match unit.scope() {
            SiblingScope::TasksOf(parent) => {
                format!("a task may only depend on sibling tasks of {parent}")
            }
            SiblingScope::Phases => "a phase may only depend on another phase".to_string(),
        });
    }
    if unit.is_phase() && candidate.sequence_order >= unit.sequence_order {
        return Some(format!(
            "a phase may only depend on an earlier phase (order {} is not before {})",
            candidate.sequence_order, unit.sequence_order
        ));
    }
    None
}

/// Check that `candidate_id` may become `unit`'s predecessor.
///
/// Rejects self-references, unknown units, units outside the eligible set and
/// links that would close a predecessor cycle.
pub fn validate_predecessor<'a>(
    unit: &ScheduleUnit,
    candidate_id: &UnitId,
    set: &'a WorkingSet,
) -> Result<&'a ScheduleUnit, SiteworkError> {
    if candidate_id == &unit.id {
        return Err(SiteworkError::validation(format!(
            "{} cannot be its own predecessor",
            unit.id
        )));
    }
    let candidate = set.get(candidate_id).ok_or_else(|| {
        SiteworkError::validation(format!("unknown predecessor {candidate_id}"))
    })?;
    if let Some(reason) = ineligibility(unit, candidate) {
        return Err(SiteworkError::validation(format!(
            "{candidate_id} cannot precede {}: {reason}",
            unit.id
        )));
    }

    let mut visited = VisitedSet::new();
    let mut cursor = Some(candidate);
    while let Some(current) = cursor {
        if current.id == unit.id {
            return Err(SiteworkError::validation(format!(
                "making {candidate_id} the predecessor of {} would create a cycle",
                unit.id
            )));
        }
        if !visited.visit(&current.id) {
            tracing::warn!(
                "Predecessor chain above {} already loops at {}",
                candidate_id,
                current.id
            );
            break;
        }
        cursor = current
            .predecessor_unit_id
            .as_ref()
            .and_then(|id| set.get(id));
    }
    Ok(candidate)
}

/// A conflict if `unit` starts on or before the day `predecessor` ends.
pub fn check_conflict(unit: &ScheduleUnit, predecessor: &ScheduleUnit) -> Option<ScheduleConflict> {
    if unit.planned_start_date <= predecessor.planned_end_date {
        Some(ScheduleConflict::StartOverlap {
            unit_id: unit.id.clone(),
            unit_name: unit.name.clone(),
            start: unit.planned_start_date,
            predecessor_id: predecessor.id.clone(),
            predecessor_name: predecessor.name.clone(),
            predecessor_end: predecessor.planned_end_date,
        })
    } else {
        None
    }
}

/// Resolve `unit` against its declared predecessor.
///
/// In [`ResolveMode::Create`] the start date is placed on the day after the
/// predecessor ends; in [`ResolveMode::Edit`] only the conflict check runs.
pub fn resolve(
    unit: &ScheduleUnit,
    set: &WorkingSet,
    mode: ResolveMode,
) -> Result<Resolution, SiteworkError> {
    let Some(ref pred_id) = unit.predecessor_unit_id else {
        return Ok(Resolution::default());
    };
    let Some(pred) = set.get(pred_id) else {
        return Ok(Resolution {
            resolved_start_date: None,
            conflict: Some(ScheduleConflict::MissingPredecessor {
                unit_id: unit.id.clone(),
                unit_name: unit.name.clone(),
                predecessor_id: pred_id.clone(),
            }),
        });
    };
    match mode {
        ResolveMode::Create => Ok(Resolution {
            resolved_start_date: Some(dates::next_day(pred.planned_end_date)?),
            conflict: None,
        }),
        ResolveMode::Edit => Ok(Resolution {
            resolved_start_date: None,
            conflict: check_conflict(unit, pred),
        }),
    }
}

/// Every conflict in a project: overlaps, ineligible links and missing
/// predecessors.
pub fn scan_conflicts(set: &WorkingSet) -> ConflictReport {
    let mut report = ConflictReport::new();
    let mut units: Vec<&ScheduleUnit> = set.iter().collect();
    units.sort_by_key(|u| (u.is_task, u.parent_unit_id.clone(), u.sequence_order));
    for unit in units {
        let Some(ref pred_id) = unit.predecessor_unit_id else {
            continue;
        };
        let Some(pred) = set.get(pred_id) else {
            report.add(ScheduleConflict::MissingPredecessor {
                unit_id: unit.id.clone(),
                unit_name: unit.name.clone(),
                predecessor_id: pred_id.clone(),
            });
            continue;
        };
        if let Some(reason) = ineligibility(unit, pred) {
            report.add(ScheduleConflict::IneligiblePredecessor {
                unit_id: unit.id.clone(),
                unit_name: unit.name.clone(),
                predecessor_id: pred_id.clone(),
                reason,
            });
        }
        if let Some(conflict) = check_conflict(unit, pred) {
            report.add(conflict);
        }
    }
    report
}
