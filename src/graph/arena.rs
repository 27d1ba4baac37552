//! Index-addressed edge storage with mark-and-compact removal

use petgraph::stable_graph::{NodeIndex, StableDiGraph};

use crate::mining::OrientedRelation;

/// One directed edge between skill indices
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaEdge {
    pub from: usize,
    pub to: usize,
    pub confidence: f64,
    pub joint_support: f64,
    removed: bool,
}

/// Edges addressed by position. Removal only marks; `compact` drops marked
/// edges and renumbers the rest, so indices stay valid between compactions.
#[derive(Debug, Clone, Default)]
pub struct EdgeArena {
    node_count: usize,
    edges: Vec<ArenaEdge>,
}

impl EdgeArena {
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            edges: Vec::new(),
        }
    }

    pub fn from_relations(node_count: usize, relations: &[OrientedRelation]) -> Self {
        let mut arena = Self::new(node_count);
        for r in relations {
            arena.push(r.from, r.to, r.confidence, r.joint_support);
        }
        arena
    }

    pub fn push(&mut self, from: usize, to: usize, confidence: f64, joint_support: f64) -> usize {
        self.edges.push(ArenaEdge {
            from,
            to,
            confidence,
            joint_support,
            removed: false,
        });
        self.edges.len() - 1
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn get(&self, index: usize) -> &ArenaEdge {
        &self.edges[index]
    }

    /// Mark an edge removed. Returns false if it already was.
    pub fn mark_removed(&mut self, index: usize) -> bool {
        let edge = &mut self.edges[index];
        let was_live = !edge.removed;
        edge.removed = true;
        was_live
    }

    /// Indices of edges not marked removed
    pub fn live_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.edges.len()).filter(|&i| !self.edges[i].removed)
    }

    pub fn live_count(&self) -> usize {
        self.edges.iter().filter(|e| !e.removed).count()
    }

    /// Graph of the live edges for traversal queries. Node `i` is skill
    /// `i`; each edge weight is the arena index of the edge it mirrors.
    pub fn graph_view(&self) -> StableDiGraph<usize, usize> {
        let mut graph = StableDiGraph::with_capacity(self.node_count, self.edges.len());
        for node in 0..self.node_count {
            graph.add_node(node);
        }
        for i in self.live_indices() {
            let edge = &self.edges[i];
            graph.add_edge(NodeIndex::new(edge.from), NodeIndex::new(edge.to), i);
        }
        graph
    }

    /// Drop removed edges; returns them in their former order.
    pub fn compact(&mut self) -> Vec<ArenaEdge> {
        let (live, removed): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.edges).into_iter().partition(|e| !e.removed);
        self.edges = live;
        removed
    }

    pub fn edges(&self) -> &[ArenaEdge] {
        &self.edges
    }
}
