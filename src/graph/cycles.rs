//! Cycle detection and breaking
//!
//! Tarjan's strongly connected components locate the cycles among live
//! edges. Every edge inside a component lies on a cycle, so the component's
//! weakest edge is closed into one by the shortest path back to its source.
//! Each round removes one edge, so the loop is bounded by the edge count.

use std::cmp::Ordering;

use petgraph::algo::{astar, tarjan_scc};
use petgraph::stable_graph::NodeIndex;
use tracing::debug;

use super::arena::{ArenaEdge, EdgeArena};
use crate::error::{MiningError, Result};

/// Edge indices forming one cycle among live edges, if any. The cycle runs
/// through the weakest edge of the first cyclic component found.
pub fn find_cycle(arena: &EdgeArena) -> Option<Vec<usize>> {
    let graph = arena.graph_view();
    let component = tarjan_scc(&graph).into_iter().find(|scc| scc.len() > 1)?;

    let mut inside = vec![false; arena.node_count()];
    for node in &component {
        inside[node.index()] = true;
    }

    let closing = graph
        .edge_indices()
        .filter_map(|index| {
            let (from, to) = graph.edge_endpoints(index)?;
            (inside[from.index()] && inside[to.index()]).then(|| graph[index])
        })
        .max_by(|&x, &y| weakness(arena.get(x), arena.get(y)))?;

    // Shortest way back from the closing edge's target to its source
    let edge = arena.get(closing);
    let source = NodeIndex::new(edge.from);
    let (_, path) = astar(
        &graph,
        NodeIndex::new(edge.to),
        |node| node == source,
        |_| 1usize,
        |_| 0,
    )?;

    let mut cycle = vec![closing];
    for hop in path.windows(2) {
        let index = graph.find_edge(hop[0], hop[1])?;
        cycle.push(graph[index]);
    }
    Some(cycle)
}

/// Ordering where the weakest edge compares greatest: lowest confidence,
/// then lowest joint support, then highest (from, to).
fn weakness(a: &ArenaEdge, b: &ArenaEdge) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then(b.joint_support.total_cmp(&a.joint_support))
        .then((a.from, a.to).cmp(&(b.from, b.to)))
}

/// Remove weakest edges until no cycle remains. Returns the removed edges
/// in removal order.
pub fn break_cycles(arena: &mut EdgeArena) -> Result<Vec<ArenaEdge>> {
    let budget = arena.live_count();
    let mut removed = Vec::new();

    while let Some(cycle) = find_cycle(arena) {
        if removed.len() >= budget {
            return Err(MiningError::InconsistentGraph {
                details: format!(
                    "cycle breaking did not converge after {} removals",
                    removed.len()
                ),
            });
        }

        let weakest = cycle
            .iter()
            .copied()
            .max_by(|&x, &y| weakness(arena.get(x), arena.get(y)))
            .ok_or_else(|| MiningError::InconsistentGraph {
                details: "empty cycle".to_string(),
            })?;

        let edge = arena.get(weakest).clone();
        debug!(
            "Breaking cycle of {} edges at {} -> {} (confidence {:.4})",
            cycle.len(),
            edge.from,
            edge.to,
            edge.confidence
        );
        arena.mark_removed(weakest);
        removed.push(edge);
    }

    Ok(removed)
}
