//! In-memory snapshot of one project's units.

use std::collections::BTreeMap;

use sitework_core::unit::{ScheduleUnit, SiblingScope, UnitId};
use sitework_util::errors::SiteworkError;

/// A mutable, ID-indexed copy of a project's units that scheduling
/// computations read and write.
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    units: BTreeMap<UnitId, ScheduleUnit>,
}

impl WorkingSet {
    pub fn new(units: impl IntoIterator<Item = ScheduleUnit>) -> Self {
        Self {
            units: units.into_iter().map(|u| (u.id.clone(), u)).collect(),
        }
    }

    pub fn get(&self, id: &UnitId) -> Option<&ScheduleUnit> {
        self.units.get(id)
    }

    pub fn get_mut(&mut self, id: &UnitId) -> Option<&mut ScheduleUnit> {
        self.units.get_mut(id)
    }

    pub fn require(&self, id: &UnitId) -> Result<&ScheduleUnit, SiteworkError> {
        self.units
            .get(id)
            .ok_or_else(|| SiteworkError::not_found(id.as_str()))
    }

    pub fn require_mut(&mut self, id: &UnitId) -> Result<&mut ScheduleUnit, SiteworkError> {
        self.units
            .get_mut(id)
            .ok_or_else(|| SiteworkError::not_found(id.as_str()))
    }

    pub fn contains(&self, id: &UnitId) -> bool {
        self.units.contains_key(id)
    }

    pub fn insert(&mut self, unit: ScheduleUnit) {
        self.units.insert(unit.id.clone(), unit);
    }

    pub fn remove(&mut self, id: &UnitId) -> Option<ScheduleUnit> {
        self.units.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduleUnit> {
        self.units.values()
    }

    /// Units of `scope`, ordered by `sequence_order` (ID breaks ties).
    pub fn siblings(&self, scope: &SiblingScope) -> Vec<&ScheduleUnit> {
        let mut siblings: Vec<&ScheduleUnit> = self
            .units
            .values()
            .filter(|u| &u.scope() == scope)
            .collect();
        siblings.sort_by(|a, b| {
            a.sequence_order
                .cmp(&b.sequence_order)
                .then_with(|| a.id.cmp(&b.id))
        });
        siblings
    }

    /// Tasks nested under `phase`, in sequence order.
    pub fn children_of(&self, phase: &UnitId) -> Vec<&ScheduleUnit> {
        self.siblings(&SiblingScope::TasksOf(phase.clone()))
    }

    pub fn child_ids(&self, phase: &UnitId) -> Vec<UnitId> {
        self.children_of(phase)
            .into_iter()
            .map(|u| u.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
