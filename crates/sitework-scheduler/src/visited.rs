//! Visit tracking for graph walks.

use std::collections::HashSet;

use sitework_core::unit::UnitId;

/// Tracks which units have been visited during a cascade walk
/// to stop on circular predecessor chains instead of looping.
#[derive(Debug, Default)]
pub struct VisitedSet {
    visited: HashSet<UnitId>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a unit as visited. Returns `false` if already visited.
    pub fn visit(&mut self, id: &UnitId) -> bool {
        self.visited.insert(id.clone())
    }

    pub fn contains(&self, id: &UnitId) -> bool {
        self.visited.contains(id)
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}
