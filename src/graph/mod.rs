//! Consolidation of oriented relations into the final prerequisite graph
//!
//! Relations are loaded into an edge arena, cycles are broken at their
//! weakest edge, and the acyclic result is transitively reduced so only
//! direct prerequisite links remain.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::mining::OrientedRelation;

pub mod arena;
pub mod cycles;
pub mod reduction;

pub use arena::{ArenaEdge, EdgeArena};
pub use cycles::{break_cycles, find_cycle};
pub use reduction::transitive_reduction;

/// A discovered prerequisite link: mastering `from` precedes mastering `to`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrerequisiteEdge {
    pub from: String,
    pub to: String,
}

/// Edge index pairs with the edges each pruning step removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Consolidation {
    /// Final edges as (from, to) skill indices, sorted
    pub edges: Vec<(usize, usize)>,
    pub cycle_breaks: Vec<(usize, usize)>,
    pub redundant: Vec<(usize, usize)>,
}

/// Break cycles and transitively reduce `relations` over `node_count` skills.
pub fn consolidate(node_count: usize, relations: &[OrientedRelation]) -> Result<Consolidation> {
    let mut arena = EdgeArena::from_relations(node_count, relations);

    let cycle_breaks: Vec<(usize, usize)> = break_cycles(&mut arena)?
        .into_iter()
        .map(|e| (e.from, e.to))
        .collect();
    if !cycle_breaks.is_empty() {
        info!("Removed {} edges to break cycles", cycle_breaks.len());
    }
    arena.compact();

    let mut redundant: Vec<(usize, usize)> = transitive_reduction(&mut arena)
        .into_iter()
        .map(|i| (arena.get(i).from, arena.get(i).to))
        .collect();
    redundant.sort_unstable();
    arena.compact();

    let mut edges: Vec<(usize, usize)> = arena.edges().iter().map(|e| (e.from, e.to)).collect();
    edges.sort_unstable();
    debug!(
        "Consolidated {} relations into {} edges ({} redundant)",
        relations.len(),
        edges.len(),
        redundant.len()
    );

    Ok(Consolidation {
        edges,
        cycle_breaks,
        redundant,
    })
}
