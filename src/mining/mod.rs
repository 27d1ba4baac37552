//! Probabilistic association-rule mining of prerequisite relations
//!
//! ## Pipeline
//! 1. Statistics: expected support, joint support and confidence per pair
//! 2. Candidates: minimum support / confidence (and optional rule
//!    probability and contrapositive) tests
//! 3. Direction: one orientation per unordered pair
//! 4. Graph: cycle breaking and transitive reduction
//!
//! Every stage takes the same explicit `MiningConfig`; nothing is global.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::MiningConfig;
use crate::error::Result;
use crate::graph::{consolidate, PrerequisiteEdge};
use crate::matrix::ProbabilityMatrix;

pub mod candidates;
pub mod direction;
pub mod statistics;
pub mod support_pmf;

pub use candidates::{select_candidates, CandidateRule};
pub use direction::{resolve_directions, OrientedRelation};
pub use statistics::{compute_statistics, skill_supports, PairwiseStatistic, SkillSupport};
pub use support_pmf::{rank_rules, rule_probability, support_distribution, RankedRule};

/// Outcome of one mining run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiningReport {
    pub edges: Vec<PrerequisiteEdge>,
    pub learner_count: usize,
    pub skill_count: usize,
    /// Ordered pairs with a defined confidence
    pub defined_pairs: usize,
    pub candidate_rules: usize,
    pub oriented_relations: usize,
    /// Edges dropped to make the graph acyclic
    pub cycle_breaks: Vec<PrerequisiteEdge>,
    /// Edges implied by longer paths
    pub redundant_edges: Vec<PrerequisiteEdge>,
}

/// Run the full pipeline on `matrix`.
pub fn mine(matrix: &ProbabilityMatrix, config: &MiningConfig) -> Result<MiningReport> {
    config.validate(matrix.learner_count())?;
    info!(
        "Mining {} learners x {} skills (min_support {}, min_confidence {}, joint {})",
        matrix.learner_count(),
        matrix.skill_count(),
        config.min_support,
        config.min_confidence,
        config.joint.as_str()
    );

    let stats = compute_statistics(matrix, config.joint, config.parallel)?;
    let defined_pairs = stats.iter().filter(|s| s.is_defined()).count();

    let candidates = select_candidates(matrix, &stats, config)?;
    let relations = resolve_directions(&candidates, config.direction_tolerance);
    let consolidation = consolidate(matrix.skill_count(), &relations)?;

    let named = |pairs: &[(usize, usize)]| -> Vec<PrerequisiteEdge> {
        pairs
            .iter()
            .map(|&(from, to)| PrerequisiteEdge {
                from: matrix.skills()[from].clone(),
                to: matrix.skills()[to].clone(),
            })
            .collect()
    };

    let report = MiningReport {
        edges: named(&consolidation.edges),
        learner_count: matrix.learner_count(),
        skill_count: matrix.skill_count(),
        defined_pairs,
        candidate_rules: candidates.len(),
        oriented_relations: relations.len(),
        cycle_breaks: named(&consolidation.cycle_breaks),
        redundant_edges: named(&consolidation.redundant),
    };

    debug!(
        "Pipeline: {} pairs -> {} candidates -> {} relations -> {} edges",
        defined_pairs,
        report.candidate_rules,
        report.oriented_relations,
        report.edges.len()
    );
    info!("Discovered {} prerequisite edges", report.edges.len());
    Ok(report)
}

/// Edges only, for callers that do not need the diagnostics.
pub fn discover_prerequisites(
    matrix: &ProbabilityMatrix,
    config: &MiningConfig,
) -> Result<Vec<PrerequisiteEdge>> {
    mine(matrix, config).map(|report| report.edges)
}
