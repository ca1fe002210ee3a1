//! Read-only views of a project.

use serde::Serialize;
use sitework_core::unit::{ProjectId, ScheduleUnit, SiblingScope, UnitId};
use sitework_scheduler::conflict::{ConflictReport, ScheduleConflict};
use sitework_scheduler::graph::ScheduleGraph;
use sitework_scheduler::resolver;
use sitework_scheduler::working_set::WorkingSet;
use sitework_util::errors::SiteworkError;

use crate::engine::ScheduleEngine;

/// Integrity findings beyond per-unit conflicts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectHealth {
    pub conflicts: ConflictReport,
    /// Predecessor cycles, each sorted by ID.
    pub cycles: Vec<Vec<UnitId>>,
}

impl ProjectHealth {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty() && self.cycles.is_empty()
    }
}

impl ScheduleEngine {
    /// Every unit of a project, phases first in timeline order, each
    /// phase's tasks after it.
    pub async fn snapshot(&self, project: &ProjectId) -> Result<Vec<ScheduleUnit>, SiteworkError> {
        let (_guard, draft) = self.begin(project).await?;
        Ok(timeline(&draft.working))
    }

    /// Scan a project for overlaps, ineligible links, missing predecessors
    /// and cycles.
    pub async fn conflicts(&self, project: &ProjectId) -> Result<ProjectHealth, SiteworkError> {
        let (_guard, draft) = self.begin(project).await?;
        let conflicts = resolver::scan_conflicts(&draft.working);
        let cycles = ScheduleGraph::build(&draft.working).cycles();
        for cycle in &cycles {
            tracing::warn!("Predecessor cycle: {cycle:?}");
        }
        Ok(ProjectHealth { conflicts, cycles })
    }

    /// Conflicts involving one unit.
    pub async fn conflicts_for(&self, unit: &UnitId) -> Result<Vec<ScheduleConflict>, SiteworkError> {
        let (_guard, draft) = self.begin_for_unit(unit).await?;
        Ok(resolver::scan_conflicts(&draft.working)
            .for_unit(unit)
            .cloned()
            .collect())
    }

    /// Render a project as an indented tree.
    pub async fn print_tree(&self, project: &ProjectId) -> Result<String, SiteworkError> {
        let (_guard, draft) = self.begin(project).await?;
        Ok(ScheduleGraph::build(&draft.working).print_tree(&draft.working))
    }
}

fn timeline(set: &WorkingSet) -> Vec<ScheduleUnit> {
    let mut out = Vec::with_capacity(set.len());
    for phase in set.siblings(&SiblingScope::Phases) {
        out.push(phase.clone());
        out.extend(set.children_of(&phase.id).into_iter().cloned());
    }
    // Tasks whose phase is missing still belong to the project.
    for unit in set.iter() {
        if !out.iter().any(|u| u.id == unit.id) {
            out.push(unit.clone());
        }
    }
    out
}
