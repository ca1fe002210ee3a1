//! Scheduling conflict detection and reporting.
//!
//! Conflicts are warnings: they are surfaced to the caller and never block a
//! write.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use sitework_core::dates::format_date;
use sitework_core::unit::UnitId;

/// A report of all conflicts found for a command or a project scan.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ConflictReport {
    pub conflicts: Vec<ScheduleConflict>,
}

/// A single non-fatal scheduling problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleConflict {
    /// The unit starts on or before the day its predecessor ends.
    StartOverlap {
        unit_id: UnitId,
        unit_name: String,
        start: NaiveDate,
        predecessor_id: UnitId,
        predecessor_name: String,
        predecessor_end: NaiveDate,
    },
    /// The predecessor link is outside the unit's eligible set, e.g. after a
    /// reorder moved the predecessor phase behind its dependent.
    IneligiblePredecessor {
        unit_id: UnitId,
        unit_name: String,
        predecessor_id: UnitId,
        reason: String,
    },
    /// The predecessor link points at a unit that no longer exists.
    MissingPredecessor {
        unit_id: UnitId,
        unit_name: String,
        predecessor_id: UnitId,
    },
}

impl ScheduleConflict {
    pub fn unit_id(&self) -> &UnitId {
        match self {
            Self::StartOverlap { unit_id, .. }
            | Self::IneligiblePredecessor { unit_id, .. }
            | Self::MissingPredecessor { unit_id, .. } => unit_id,
        }
    }
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, conflict: ScheduleConflict) {
        if !self.conflicts.contains(&conflict) {
            self.conflicts.push(conflict);
        }
    }

    pub fn extend(&mut self, other: ConflictReport) {
        for conflict in other.conflicts {
            self.add(conflict);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduleConflict> {
        self.conflicts.iter()
    }

    /// Conflicts concerning a single unit.
    pub fn for_unit<'a>(&'a self, id: &'a UnitId) -> impl Iterator<Item = &'a ScheduleConflict> {
        self.conflicts.iter().filter(move |c| c.unit_id() == id)
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conflicts.is_empty() {
            return write!(f, "No scheduling conflicts.");
        }
        writeln!(f, "Scheduling conflicts ({}):", self.conflicts.len())?;
        for c in &self.conflicts {
            writeln!(f, "  {c}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ScheduleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartOverlap {
                unit_name,
                start,
                predecessor_name,
                predecessor_end,
                ..
            } => write!(
                f,
                "{unit_name} starts {} but {predecessor_name} ends {}",
                format_date(*start),
                format_date(*predecessor_end)
            ),
            Self::IneligiblePredecessor {
                unit_name,
                predecessor_id,
                reason,
                ..
            } => write!(
                f,
                "{unit_name} depends on {predecessor_id}, which is not eligible ({reason})"
            ),
            Self::MissingPredecessor {
                unit_name,
                predecessor_id,
                ..
            } => write!(f, "{unit_name} depends on missing unit {predecessor_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlap() -> ScheduleConflict {
        ScheduleConflict::StartOverlap {
            unit_id: UnitId::new("b"),
            unit_name: "Roofing".to_string(),
            start: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            predecessor_id: UnitId::new("a"),
            predecessor_name: "Framing".to_string(),
            predecessor_end: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
        }
    }

    #[test]
    fn empty_report() {
        let report = ConflictReport::new();
        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
        assert_eq!(report.to_string(), "No scheduling conflicts.");
    }

    #[test]
    fn report_with_conflicts() {
        let mut report = ConflictReport::new();
        report.add(overlap());
        assert_eq!(report.len(), 1);
        let s = report.to_string();
        assert!(s.contains("Roofing starts 2025-06-10 but Framing ends 2025-06-10"));
        assert_eq!(report.for_unit(&UnitId::new("b")).count(), 1);
        assert_eq!(report.for_unit(&UnitId::new("a")).count(), 0);
    }

    #[test]
    fn duplicate_conflicts_are_collapsed() {
        let mut report = ConflictReport::new();
        report.add(overlap());
        report.add(overlap());
        assert_eq!(report.len(), 1);
    }
}
