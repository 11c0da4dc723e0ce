//! Island detection over the bus/branch graph.
//!
//! A DC sensitivity computation needs a single connected network: every
//! island beyond the one holding the reference bus contributes a zero
//! eigenvalue to the reduced admittance matrix. Checking connectivity first
//! turns an opaque "singular matrix" into a message naming the islands.

use crate::{Branch, Bus};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use std::collections::HashMap;

/// One connected component, buses listed in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Island {
    pub island_id: usize,
    pub buses: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct IslandAnalysis {
    pub islands: Vec<Island>,
    assignment: HashMap<String, usize>,
}

impl IslandAnalysis {
    pub fn count(&self) -> usize {
        self.islands.len()
    }

    pub fn is_connected(&self) -> bool {
        self.islands.len() <= 1
    }

    /// Island id of a bus, `None` for names that are not buses.
    pub fn island_of(&self, bus: &str) -> Option<usize> {
        self.assignment.get(bus).copied()
    }
}

/// Label connected components with breadth-first search.
///
/// Branches whose endpoints are not in `buses` are ignored here; they are
/// reported by [`crate::validate_network`].
pub fn find_islands(buses: &[Bus], branches: &[Branch]) -> IslandAnalysis {
    let mut graph: UnGraph<usize, ()> = UnGraph::with_capacity(buses.len(), branches.len());
    let mut node_of: HashMap<&str, NodeIndex> = HashMap::with_capacity(buses.len());
    for (idx, bus) in buses.iter().enumerate() {
        let node = graph.add_node(idx);
        node_of.entry(bus.name.as_str()).or_insert(node);
    }
    for branch in branches {
        if let (Some(&a), Some(&b)) = (
            node_of.get(branch.from_bus.as_str()),
            node_of.get(branch.to_bus.as_str()),
        ) {
            graph.add_edge(a, b, ());
        }
    }

    let mut component: Vec<Option<usize>> = vec![None; graph.node_count()];
    let mut islands = Vec::new();
    for start in graph.node_indices() {
        if component[start.index()].is_some() {
            continue;
        }
        let island_id = islands.len();
        let mut members = Vec::new();
        let mut bfs = Bfs::new(&graph, start);
        while let Some(node) = bfs.next(&graph) {
            component[node.index()] = Some(island_id);
            members.push(graph[node]);
        }
        members.sort_unstable();
        islands.push(Island {
            island_id,
            buses: members.into_iter().map(|i| buses[i].name.clone()).collect(),
        });
    }

    let assignment = buses
        .iter()
        .zip(component)
        .filter_map(|(bus, id)| id.map(|id| (bus.name.clone(), id)))
        .collect();

    IslandAnalysis {
        islands,
        assignment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kilovolts;

    fn buses(names: &[&str]) -> Vec<Bus> {
        names.iter().map(|n| Bus::new(*n, Kilovolts(138.0))).collect()
    }

    #[test]
    fn test_connected_triangle() {
        let buses = buses(&["A", "B", "C"]);
        let branches = vec![
            Branch::new("AB", "A", "B", 0.0, 0.1),
            Branch::new("BC", "B", "C", 0.0, 0.1),
        ];
        let analysis = find_islands(&buses, &branches);
        assert!(analysis.is_connected());
        assert_eq!(analysis.islands[0].buses, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_two_islands_and_isolated_bus() {
        let buses = buses(&["A", "B", "C", "D", "E"]);
        let branches = vec![
            Branch::new("AB", "A", "B", 0.0, 0.1),
            Branch::new("CD", "C", "D", 0.0, 0.1),
            Branch::new("DX", "D", "X", 0.0, 0.1),
        ];
        let analysis = find_islands(&buses, &branches);
        assert_eq!(analysis.count(), 3);
        assert_eq!(analysis.island_of("A"), analysis.island_of("B"));
        assert_ne!(analysis.island_of("A"), analysis.island_of("C"));
        assert_eq!(analysis.islands[2].buses, vec!["E"]);
        assert_eq!(analysis.island_of("X"), None);
    }
}
