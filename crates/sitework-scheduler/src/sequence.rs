//! Sibling sequencing: renumber `sequence_order` after a drag-reorder.
//!
//! These functions never touch dates. Reordering phases can make an existing
//! predecessor link ineligible, so callers re-run
//! [`crate::resolver::scan_conflicts`] afterwards.

use std::collections::HashSet;

use serde::Serialize;
use sitework_core::unit::{ScheduleUnit, UnitId};
use sitework_util::errors::SiteworkError;

/// A sequence number that changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceChange {
    pub unit_id: UnitId,
    pub previous: u32,
    pub sequence_order: u32,
}

/// The order to give a new sibling appended at the end of its scope.
pub fn next_sequence_order(siblings: &[&ScheduleUnit]) -> u32 {
    siblings
        .iter()
        .map(|s| s.sequence_order)
        .max()
        .unwrap_or(0)
        .saturating_add(1)
}

/// Move the sibling at `old_index` to `new_index` and renumber `1..=N`.
///
/// `siblings` must be in current timeline order. Only units whose number
/// actually changes are returned.
pub fn move_sibling(
    siblings: &[&ScheduleUnit],
    old_index: usize,
    new_index: usize,
) -> Result<Vec<SequenceChange>, SiteworkError> {
    let len = siblings.len();
    if old_index >= len || new_index >= len {
        return Err(SiteworkError::validation(format!(
            "cannot move sibling {old_index} to {new_index}: scope has {len} units"
        )));
    }
    let mut ordered: Vec<&ScheduleUnit> = siblings.to_vec();
    let moved = ordered.remove(old_index);
    ordered.insert(new_index, moved);
    Ok(renumber(&ordered))
}

/// Renumber siblings to follow `ordered_ids` exactly.
///
/// `ordered_ids` must name every sibling exactly once.
pub fn apply_order(
    siblings: &[&ScheduleUnit],
    ordered_ids: &[UnitId],
) -> Result<Vec<SequenceChange>, SiteworkError> {
    let mut seen = HashSet::new();
    if let Some(dup) = ordered_ids.iter().find(|id| !seen.insert(*id)) {
        return Err(SiteworkError::validation(format!(
            "{dup} appears more than once in the new order"
        )));
    }
    if let Some(stray) = ordered_ids
        .iter()
        .find(|id| !siblings.iter().any(|s| &s.id == *id))
    {
        return Err(SiteworkError::validation(format!(
            "{stray} is not a sibling in this scope"
        )));
    }
    if let Some(missing) = siblings.iter().find(|s| !seen.contains(&s.id)) {
        return Err(SiteworkError::validation(format!(
            "new order is missing {}",
            missing.id
        )));
    }

    let ordered: Vec<&ScheduleUnit> = ordered_ids
        .iter()
        .filter_map(|id| siblings.iter().find(|s| &s.id == id).copied())
        .collect();
    Ok(renumber(&ordered))
}

fn renumber(ordered: &[&ScheduleUnit]) -> Vec<SequenceChange> {
    ordered
        .iter()
        .zip(1u32..)
        .filter(|(unit, order)| unit.sequence_order != *order)
        .map(|(unit, order)| SequenceChange {
            unit_id: unit.id.clone(),
            previous: unit.sequence_order,
            sequence_order: order,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sitework_core::unit::ProjectId;

    fn phase(id: &str, order: u32) -> ScheduleUnit {
        ScheduleUnit::phase(
            id,
            &ProjectId::new("p"),
            id,
            order,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            3,
        )
        .unwrap()
    }

    fn changes(c: &[SequenceChange]) -> Vec<(&str, u32)> {
        c.iter()
            .map(|c| (c.unit_id.as_str(), c.sequence_order))
            .collect()
    }

    #[test]
    fn move_last_to_first() {
        let (a, b, c) = (phase("a", 1), phase("b", 2), phase("c", 3));
        let out = move_sibling(&[&a, &b, &c], 2, 0).unwrap();
        assert_eq!(changes(&out), vec![("c", 1), ("a", 2), ("b", 3)]);
    }

    #[test]
    fn move_only_reports_touched_units() {
        let (a, b, c, d) = (phase("a", 1), phase("b", 2), phase("c", 3), phase("d", 4));
        let out = move_sibling(&[&a, &b, &c, &d], 1, 2).unwrap();
        assert_eq!(changes(&out), vec![("c", 2), ("b", 3)]);
    }

    #[test]
    fn gaps_are_closed() {
        let (a, b) = (phase("a", 3), phase("b", 9));
        let out = move_sibling(&[&a, &b], 0, 0).unwrap();
        assert_eq!(changes(&out), vec![("a", 1), ("b", 2)]);
    }

    #[test]
    fn move_out_of_range_is_rejected() {
        let a = phase("a", 1);
        assert!(move_sibling(&[&a], 0, 1).is_err());
    }

    #[test]
    fn apply_order_requires_a_permutation() {
        let (a, b, c) = (phase("a", 1), phase("b", 2), phase("c", 3));
        let siblings = [&a, &b, &c];
        let ids = |v: &[&str]| v.iter().map(|s| UnitId::new(*s)).collect::<Vec<_>>();

        let out = apply_order(&siblings, &ids(&["b", "c", "a"])).unwrap();
        assert_eq!(changes(&out), vec![("b", 1), ("c", 2), ("a", 3)]);

        assert!(apply_order(&siblings, &ids(&["a", "b"])).is_err());
        assert!(apply_order(&siblings, &ids(&["a", "b", "b"])).is_err());
        assert!(apply_order(&siblings, &ids(&["a", "b", "c", "x"])).is_err());
    }

    #[test]
    fn next_order_appends() {
        let (a, b) = (phase("a", 1), phase("b", 5));
        assert_eq!(next_sequence_order(&[&a, &b]), 6);
        assert_eq!(next_sequence_order(&[]), 1);
    }
}
