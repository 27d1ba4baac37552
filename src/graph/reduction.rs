//! Transitive reduction of an acyclic edge arena
//!
//! In a DAG the transitive reduction is unique and removing a redundant
//! edge never changes reachability, so every edge can be tested against the
//! graph as it stood before any removal.

use petgraph::algo::{has_path_connecting, DfsSpace};
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;
use tracing::debug;

use super::arena::EdgeArena;

/// Mark every edge (x, z) removed when z is reachable from another direct
/// successor of x. The arena must be acyclic. Returns the marked indices in
/// arena order.
pub fn transitive_reduction(arena: &mut EdgeArena) -> Vec<usize> {
    let graph = arena.graph_view();
    let mut space = DfsSpace::new(&graph);

    let mut redundant = Vec::new();
    for x in graph.node_indices() {
        let successors: Vec<(NodeIndex, usize)> = graph
            .edges(x)
            .map(|e| (e.target(), *e.weight()))
            .collect();

        for &(z, edge) in &successors {
            let implied = successors
                .iter()
                .any(|&(y, _)| y != z && has_path_connecting(&graph, y, z, Some(&mut space)));
            if implied {
                debug!("Edge {} -> {} is implied by a longer path", x.index(), z.index());
                redundant.push(edge);
            }
        }
    }

    redundant.sort_unstable();
    for &edge in &redundant {
        arena.mark_removed(edge);
    }
    redundant
}
