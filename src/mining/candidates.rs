//! Threshold filtering of pair statistics into candidate rules

use serde::Serialize;
use tracing::debug;

use crate::config::MiningConfig;
use crate::error::Result;
use crate::matrix::ProbabilityMatrix;

use super::statistics::{compute_statistics, PairwiseStatistic};
use super::support_pmf::pair_rule_probability;

/// A rule a => b that passed every configured test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRule {
    pub antecedent: usize,
    pub consequent: usize,
    pub joint_support: f64,
    pub confidence: f64,
    /// Present when the probabilistic test is enabled
    pub probability: Option<f64>,
}

fn passes_thresholds(stat: &PairwiseStatistic, config: &MiningConfig) -> Option<f64> {
    let confidence = stat.confidence?;
    (stat.joint_support >= config.min_support && confidence >= config.min_confidence)
        .then_some(confidence)
}

/// Emit a candidate for every ordered pair meeting the support and
/// confidence thresholds, in statistic order.
///
/// With `min_probability` set, a rule must also be likely enough to meet
/// both thresholds. With `require_complement` set, the contrapositive
/// `not b => not a` must pass the same tests on `matrix.complement()`.
pub fn select_candidates(
    matrix: &ProbabilityMatrix,
    stats: &[PairwiseStatistic],
    config: &MiningConfig,
) -> Result<Vec<CandidateRule>> {
    config.validate(matrix.learner_count())?;

    let complement_stats = if config.require_complement {
        let complement = matrix.complement();
        let stats = compute_statistics(&complement, config.joint, config.parallel)?;
        Some((complement, stats))
    } else {
        None
    };
    let skill_count = matrix.skill_count();

    let mut candidates = Vec::new();
    for stat in stats {
        let Some(confidence) = passes_thresholds(stat, config) else {
            continue;
        };

        let probability = match config.min_probability {
            Some(min_probability) => {
                let p = pair_rule_probability(matrix, config, stat.antecedent, stat.consequent);
                if p < min_probability {
                    continue;
                }
                Some(p)
            }
            None => None,
        };

        if let Some((complement, complement_stats)) = &complement_stats {
            let (a, b) = (stat.antecedent, stat.consequent);
            let index = pair_index(skill_count, b, a);
            let contrapositive = &complement_stats[index];
            if passes_thresholds(contrapositive, config).is_none() {
                debug!("Rejected {} => {}: contrapositive fails", a, b);
                continue;
            }
            if let Some(min_probability) = config.min_probability {
                if pair_rule_probability(complement, config, b, a) < min_probability {
                    debug!("Rejected {} => {}: contrapositive improbable", a, b);
                    continue;
                }
            }
        }

        candidates.push(CandidateRule {
            antecedent: stat.antecedent,
            consequent: stat.consequent,
            joint_support: stat.joint_support,
            confidence,
            probability,
        });
    }

    debug!("Selected {} candidate rules from {} pairs", candidates.len(), stats.len());
    Ok(candidates)
}

/// Position of ordered pair (a, b) in `ordered_pairs` order
fn pair_index(skill_count: usize, a: usize, b: usize) -> usize {
    a * (skill_count - 1) + if b > a { b - 1 } else { b }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JointConvention;
    use crate::error::MiningError;
    use crate::mining::statistics::ordered_pairs;

    fn two_skill_matrix(rows: &[(f64, f64)]) -> ProbabilityMatrix {
        ProbabilityMatrix::from_rows(
            vec!["A".into(), "B".into()],
            rows.iter().map(|&(a, b)| vec![Some(a), Some(b)]).collect(),
        )
        .unwrap()
    }

    fn run(m: &ProbabilityMatrix, config: &MiningConfig) -> Vec<CandidateRule> {
        let stats = compute_statistics(m, config.joint, false).unwrap();
        select_candidates(m, &stats, config).unwrap()
    }

    #[test]
    fn test_pair_index_matches_enumeration() {
        for n in 2..6 {
            for (i, (a, b)) in ordered_pairs(n).into_iter().enumerate() {
                assert_eq!(pair_index(n, a, b), i);
            }
        }
    }

    #[test]
    fn test_thresholds_filter_both_directions() {
        // B mastered by everyone, A by half: A => B is certain, B => A is a coin flip
        let m = two_skill_matrix(&[(1.0, 1.0), (1.0, 1.0), (0.0, 1.0), (0.0, 1.0)]);
        let candidates = run(&m, &MiningConfig::new(2.0, 0.8));
        assert_eq!(candidates.len(), 1);
        assert_eq!((candidates[0].antecedent, candidates[0].consequent), (0, 1));
        assert_eq!(candidates[0].confidence, 1.0);
        assert_eq!(candidates[0].probability, None);

        let candidates = run(&m, &MiningConfig::new(2.0, 0.5));
        assert_eq!(candidates.len(), 2);

        let candidates = run(&m, &MiningConfig::new(2.5, 0.5));
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_out_of_range_thresholds_rejected() {
        let m = two_skill_matrix(&[(1.0, 1.0)]);
        let stats = compute_statistics(&m, JointConvention::Product, false).unwrap();
        let err = select_candidates(&m, &stats, &MiningConfig::new(2.0, 0.5)).unwrap_err();
        assert!(matches!(err, MiningError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_probability_threshold() {
        let m = two_skill_matrix(&[(0.9, 0.9), (0.9, 0.9), (0.1, 0.9), (0.1, 0.9)]);
        let base = MiningConfig::new(1.0, 0.7);
        let without = run(&m, &base);
        assert!(without.iter().any(|c| c.antecedent == 0));

        // Counterexamples are likely enough that the rule is far from certain
        let strict = run(&m, &base.clone().with_min_probability(0.99));
        assert!(strict.is_empty());

        let lenient = run(&m, &base.with_min_probability(0.1));
        assert_eq!(lenient.len(), 1);
        let p = lenient[0].probability.unwrap();
        assert!(p >= 0.1 && p < 0.99, "unexpected rule probability {}", p);
    }

    #[test]
    fn test_complement_check() {
        // A implies B, and not-B implies not-A (nobody lacks B while having A)
        let m = two_skill_matrix(&[(1.0, 1.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0), (0.0, 0.0)]);
        let config = MiningConfig::new(1.0, 0.9).with_complement_check(true);
        let candidates = run(&m, &config);
        assert_eq!(candidates.len(), 1);
        assert_eq!((candidates[0].antecedent, candidates[0].consequent), (0, 1));

        // Not-B never occurs, so the contrapositive has no support and A => B is dropped
        let m = two_skill_matrix(&[(1.0, 1.0), (1.0, 1.0), (0.0, 1.0)]);
        let candidates = run(&m, &config);
        assert!(candidates.is_empty());
    }
}
