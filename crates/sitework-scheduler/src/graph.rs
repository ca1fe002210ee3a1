//! Predecessor graph construction and traversal.

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use sitework_core::dates::format_date;
use sitework_core::unit::{ScheduleUnit, SiblingScope, UnitId};

use crate::working_set::WorkingSet;

/// Precedence graph over a project's units, backed by petgraph.
///
/// An edge `a -> b` means `b.predecessor_unit_id == a`. Links to units that
/// are not part of the snapshot are kept aside as dangling.
pub struct ScheduleGraph {
    graph: DiGraph<UnitId, ()>,
    index: HashMap<UnitId, NodeIndex>,
    order: HashMap<UnitId, (bool, u32)>,
    dangling: Vec<(UnitId, UnitId)>,
}

impl ScheduleGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            order: HashMap::new(),
            dangling: Vec::new(),
        }
    }

    /// Build the graph from every unit in a working set.
    pub fn build(set: &WorkingSet) -> Self {
        let mut g = Self::new();
        for unit in set.iter() {
            g.add_unit(unit);
        }
        for unit in set.iter() {
            if let Some(ref pred) = unit.predecessor_unit_id {
                match (g.find(pred), g.find(&unit.id)) {
                    (Some(from), Some(to)) => {
                        g.graph.add_edge(from, to, ());
                    }
                    _ => g.dangling.push((unit.id.clone(), pred.clone())),
                }
            }
        }
        g
    }

    /// Add or retrieve a node. If the ID already exists, returns the existing index.
    pub fn add_unit(&mut self, unit: &ScheduleUnit) -> NodeIndex {
        if let Some(&idx) = self.index.get(&unit.id) {
            return idx;
        }
        let idx = self.graph.add_node(unit.id.clone());
        self.index.insert(unit.id.clone(), idx);
        self.order
            .insert(unit.id.clone(), (unit.is_task, unit.sequence_order));
        idx
    }

    pub fn find(&self, id: &UnitId) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// Units whose predecessor is `id`, in timeline order.
    pub fn dependents_of(&self, id: &UnitId) -> Vec<UnitId> {
        let Some(idx) = self.find(id) else {
            return Vec::new();
        };
        let mut dependents: Vec<UnitId> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| self.graph[e.target()].clone())
            .collect();
        dependents.sort_by_key(|d| (self.order.get(d).copied(), d.clone()));
        dependents.dedup();
        dependents
    }

    /// Groups of units that form predecessor cycles (including self-links).
    pub fn cycles(&self) -> Vec<Vec<UnitId>> {
        let mut cycles: Vec<Vec<UnitId>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut ids: Vec<UnitId> = scc.iter().map(|&n| self.graph[n].clone()).collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// `(unit, missing predecessor)` pairs.
    pub fn dangling_links(&self) -> &[(UnitId, UnitId)] {
        &self.dangling
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render phases and their tasks as a tree with dates, progress and
    /// predecessor labels.
    pub fn print_tree(&self, set: &WorkingSet) -> String {
        let mut output = String::new();
        for phase in set.siblings(&SiblingScope::Phases) {
            output.push_str(&self.describe(set, phase));
            output.push('\n');
            let tasks = set.children_of(&phase.id);
            let count = tasks.len();
            for (i, task) in tasks.into_iter().enumerate() {
                let connector = if i == count - 1 { "└── " } else { "├── " };
                output.push_str(connector);
                output.push_str(&self.describe(set, task));
                output.push('\n');
            }
        }
        output
    }

    fn describe(&self, set: &WorkingSet, unit: &ScheduleUnit) -> String {
        let mut line = format!(
            "{} [{}] {}..{} ({}d",
            unit.name,
            unit.id,
            format_date(unit.planned_start_date),
            format_date(unit.planned_end_date),
            unit.planned_duration_days,
        );
        if unit.buffer_days > 0 {
            line.push_str(&format!(" +{}d buffer", unit.buffer_days));
        }
        if unit.is_phase() {
            line.push_str(&format!(", {}%", unit.progress_percent));
        }
        line.push_str(&format!(", {})", unit.status));
        if let Some(ref pred) = unit.predecessor_unit_id {
            let name = set.get(pred).map(|p| p.name.as_str()).unwrap_or("?");
            line.push_str(&format!(" after {name}"));
        }
        line
    }
}

impl Default for ScheduleGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sitework_core::unit::ProjectId;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, n).unwrap()
    }

    fn phase(id: &str, order: u32) -> ScheduleUnit {
        ScheduleUnit::phase(id, &ProjectId::new("p"), id, order, day(1), 3).unwrap()
    }

    #[test]
    fn dependents_follow_sequence_order() {
        let a = phase("a", 1);
        let c = phase("c", 3).with_predecessor(&a.id);
        let b = phase("b", 2).with_predecessor(&a.id);
        let set = WorkingSet::new([a, c, b]);
        let g = ScheduleGraph::build(&set);

        assert_eq!(
            g.dependents_of(&UnitId::new("a")),
            vec![UnitId::new("b"), UnitId::new("c")]
        );
        assert!(g.dependents_of(&UnitId::new("zzz")).is_empty());
    }

    #[test]
    fn detects_cycles_and_self_links() {
        let a = phase("a", 1).with_predecessor(&UnitId::new("b"));
        let b = phase("b", 2).with_predecessor(&UnitId::new("a"));
        let s = phase("s", 3).with_predecessor(&UnitId::new("s"));
        let ok = phase("ok", 4);
        let g = ScheduleGraph::build(&WorkingSet::new([a, b, s, ok]));
        assert_eq!(
            g.cycles(),
            vec![
                vec![UnitId::new("a"), UnitId::new("b")],
                vec![UnitId::new("s")]
            ]
        );
    }

    #[test]
    fn keeps_dangling_links_aside() {
        let a = phase("a", 1).with_predecessor(&UnitId::new("gone"));
        let g = ScheduleGraph::build(&WorkingSet::new([a]));
        assert_eq!(g.len(), 1);
        assert_eq!(
            g.dangling_links(),
            &[(UnitId::new("a"), UnitId::new("gone"))]
        );
        assert!(g.cycles().is_empty());
    }

    #[test]
    fn tree_nests_tasks_under_phases() {
        let a = phase("a", 1);
        let t1 = ScheduleUnit::task("t1", &a, "Dig", 1, day(1), 2).unwrap();
        let t2 = ScheduleUnit::task("t2", &a, "Pour", 2, day(3), 1)
            .unwrap()
            .with_predecessor(&t1.id);
        let b = phase("b", 2);
        let set = WorkingSet::new([a, t1, t2, b]);
        let tree = ScheduleGraph::build(&set).print_tree(&set);

        let lines: Vec<&str> = tree.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("a [a] 2025-06-01..2025-06-03"));
        assert!(lines[1].starts_with("├── Dig [t1]"));
        assert!(lines[2].starts_with("└── Pour [t2]"));
        assert!(lines[2].ends_with("after Dig"));
        assert!(lines[3].starts_with("b [b]"));
    }
}
