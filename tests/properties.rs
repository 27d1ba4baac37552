//! Property tests for the mining pipeline: threshold soundness, acyclicity,
//! transitive reduction, determinism and symmetric evidence.

use std::collections::HashSet;

use proptest::prelude::*;

use prereq::config::JointConvention;
use prereq::graph::{consolidate, EdgeArena, find_cycle};
use prereq::mining::{compute_statistics, mine, OrientedRelation};
use prereq::{MiningConfig, ProbabilityMatrix};

/// Random matrix of `skills` columns; roughly one cell in ten is missing.
fn matrix_strategy(skills: usize) -> impl Strategy<Value = ProbabilityMatrix> {
    let cell = prop_oneof![1 => Just(None), 9 => (0.0_f64..=1.0).prop_map(Some)];
    prop::collection::vec(prop::collection::vec(cell, skills), 1..30).prop_map(move |rows| {
        let names = (0..skills).map(|i| format!("S{i}")).collect();
        ProbabilityMatrix::from_rows(names, rows).unwrap()
    })
}

fn config_strategy() -> impl Strategy<Value = (f64, f64, bool)> {
    (0.0_f64..1.0, 0.3_f64..1.0, any::<bool>())
}

fn build_config(matrix: &ProbabilityMatrix, (support_frac, confidence, minimum): (f64, f64, bool)) -> MiningConfig {
    let joint = if minimum { JointConvention::Minimum } else { JointConvention::Product };
    MiningConfig::new(support_frac * matrix.learner_count() as f64 * 0.5, confidence).with_joint(joint)
}

/// Nodes reachable from `from` over `edges`
fn reachable(edges: &[(usize, usize)], from: usize, n: usize) -> Vec<bool> {
    let mut seen = vec![false; n];
    let mut stack = vec![from];
    while let Some(node) = stack.pop() {
        for &(a, b) in edges {
            if a == node && !seen[b] {
                seen[b] = true;
                stack.push(b);
            }
        }
    }
    seen
}

proptest! {
    #[test]
    fn every_edge_meets_thresholds(matrix in matrix_strategy(5), params in config_strategy()) {
        let config = build_config(&matrix, params);
        let report = mine(&matrix, &config).unwrap();
        let stats = compute_statistics(&matrix, config.joint, false).unwrap();

        // Edge (from, to) comes from the rule to => from
        for edge in &report.edges {
            let prerequisite = matrix.skill_index(&edge.from).unwrap();
            let dependent = matrix.skill_index(&edge.to).unwrap();
            let stat = stats
                .iter()
                .find(|s| s.antecedent == dependent && s.consequent == prerequisite)
                .unwrap();
            prop_assert!(stat.joint_support >= config.min_support);
            prop_assert!(stat.confidence.unwrap() >= config.min_confidence);
        }
    }

    #[test]
    fn output_is_acyclic_and_reduced(matrix in matrix_strategy(6), params in config_strategy()) {
        let config = build_config(&matrix, params);
        let report = mine(&matrix, &config).unwrap();
        let n = matrix.skill_count();
        let edges: Vec<(usize, usize)> = report
            .edges
            .iter()
            .map(|e| (matrix.skill_index(&e.from).unwrap(), matrix.skill_index(&e.to).unwrap()))
            .collect();

        let mut arena = EdgeArena::new(n);
        for &(a, b) in &edges {
            arena.push(a, b, 1.0, 1.0);
        }
        prop_assert!(find_cycle(&arena).is_none());

        // No edge is implied by the remaining ones
        for (i, &(a, b)) in edges.iter().enumerate() {
            let others: Vec<(usize, usize)> = edges
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &e)| e)
                .collect();
            prop_assert!(!reachable(&others, a, n)[b], "edge {a} -> {b} is redundant");
        }
    }

    #[test]
    fn pruned_edges_keep_reachability(matrix in matrix_strategy(6), params in config_strategy()) {
        let config = build_config(&matrix, params);
        let report = mine(&matrix, &config).unwrap();
        let n = matrix.skill_count();
        let index = |e: &prereq::PrerequisiteEdge| {
            (matrix.skill_index(&e.from).unwrap(), matrix.skill_index(&e.to).unwrap())
        };
        let edges: Vec<(usize, usize)> = report.edges.iter().map(index).collect();

        for redundant in report.redundant_edges.iter().map(index) {
            prop_assert!(reachable(&edges, redundant.0, n)[redundant.1]);
        }
    }

    #[test]
    fn mining_is_deterministic(matrix in matrix_strategy(5), params in config_strategy()) {
        let config = build_config(&matrix, params);
        let first = mine(&matrix, &config).unwrap();
        let second = mine(&matrix, &config.clone().with_parallel(false)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn identical_columns_never_yield_an_edge(
        column in prop::collection::vec(0.05_f64..=1.0, 1..30),
        confidence in 0.0_f64..1.0,
    ) {
        let rows = column.iter().map(|&p| vec![Some(p), Some(p)]).collect();
        let matrix = ProbabilityMatrix::from_rows(vec!["A".into(), "B".into()], rows).unwrap();
        let report = mine(&matrix, &MiningConfig::new(0.0, confidence)).unwrap();
        prop_assert!(report.edges.is_empty());
    }

    #[test]
    fn consolidation_terminates_on_random_relations(
        raw in prop::collection::vec((0usize..8, 0usize..8, 0.0_f64..1.0), 0..40)
    ) {
        let mut seen = HashSet::new();
        let relations: Vec<OrientedRelation> = raw
            .into_iter()
            .filter(|&(a, b, _)| a != b && seen.insert((a.min(b), a.max(b))))
            .map(|(from, to, confidence)| OrientedRelation { from, to, confidence, joint_support: 1.0 })
            .collect();

        let result = consolidate(8, &relations).unwrap();
        let mut arena = EdgeArena::new(8);
        for &(a, b) in &result.edges {
            arena.push(a, b, 1.0, 1.0);
        }
        prop_assert!(find_cycle(&arena).is_none());
        prop_assert!(result.cycle_breaks.len() + result.redundant.len() + result.edges.len() == relations.len());
    }
}
