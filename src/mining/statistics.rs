//! Expected support and confidence for every ordered skill pair
//!
//! Supports are expectations under the belief distribution: each learner
//! contributes its probability rather than a hard 0/1 count. Learners with a
//! missing value for a skill contribute nothing to that skill.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::config::JointConvention;
use crate::error::{MiningError, Result};
use crate::matrix::ProbabilityMatrix;

/// Expected support of a single skill
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkillSupport {
    /// Sum of present probabilities
    pub expected: f64,
    /// Learners with a present value
    pub observed: usize,
}

/// Statistics for the ordered pair (antecedent, consequent)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseStatistic {
    pub antecedent: usize,
    pub consequent: usize,
    pub support_antecedent: f64,
    pub support_consequent: f64,
    pub joint_support: f64,
    /// Learners with values for both skills
    pub co_observed: usize,
    /// `joint_support / support_antecedent`; `None` when undefined
    pub confidence: Option<f64>,
}

impl PairwiseStatistic {
    pub fn is_defined(&self) -> bool {
        self.confidence.is_some()
    }
}

/// Expected support of every skill, in column order
pub fn skill_supports(matrix: &ProbabilityMatrix) -> Vec<SkillSupport> {
    (0..matrix.skill_count())
        .map(|skill| {
            matrix
                .column(skill)
                .flatten()
                .fold(SkillSupport { expected: 0.0, observed: 0 }, |acc, p| SkillSupport {
                    expected: acc.expected + p,
                    observed: acc.observed + 1,
                })
        })
        .collect()
}

/// All ordered pairs (a, b), a != b, in stable index order
pub fn ordered_pairs(skill_count: usize) -> Vec<(usize, usize)> {
    (0..skill_count)
        .flat_map(|a| (0..skill_count).filter(move |&b| b != a).map(move |b| (a, b)))
        .collect()
}

/// Compute one statistic record per ordered skill pair.
///
/// Records come back in `ordered_pairs` order regardless of `parallel`.
pub fn compute_statistics(
    matrix: &ProbabilityMatrix,
    joint: JointConvention,
    parallel: bool,
) -> Result<Vec<PairwiseStatistic>> {
    if matrix.skill_count() == 0 {
        return Err(MiningError::invalid_input("matrix has no skills"));
    }
    if matrix.learner_count() == 0 {
        return Err(MiningError::invalid_input("matrix has no learners"));
    }

    let supports = skill_supports(matrix);
    let pairs = ordered_pairs(matrix.skill_count());

    let compute = |&(a, b): &(usize, usize)| pair_statistic(matrix, &supports, joint, a, b);
    let stats: Vec<PairwiseStatistic> = if parallel {
        pairs.par_iter().map(compute).collect()
    } else {
        pairs.iter().map(compute).collect()
    };

    debug!(
        "Computed {} pair statistics ({} defined)",
        stats.len(),
        stats.iter().filter(|s| s.is_defined()).count()
    );
    Ok(stats)
}

fn pair_statistic(
    matrix: &ProbabilityMatrix,
    supports: &[SkillSupport],
    joint: JointConvention,
    a: usize,
    b: usize,
) -> PairwiseStatistic {
    let mut joint_support = 0.0;
    let mut co_observed = 0;
    for learner in 0..matrix.learner_count() {
        if let (Some(pa), Some(pb)) = (matrix.get(learner, a), matrix.get(learner, b)) {
            joint_support += joint.both(pa, pb);
            co_observed += 1;
        }
    }

    let support_antecedent = supports[a].expected;
    let confidence = if support_antecedent > 0.0 && co_observed > 0 {
        // Clamp guards the Minimum convention against rounding past 1.0
        Some((joint_support / support_antecedent).min(1.0))
    } else {
        None
    };

    PairwiseStatistic {
        antecedent: a,
        consequent: b,
        support_antecedent,
        support_consequent: supports[b].expected,
        joint_support,
        co_observed,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<Option<f64>>>) -> ProbabilityMatrix {
        let width = rows[0].len();
        let skills = (0..width).map(|i| format!("S{}", i)).collect();
        ProbabilityMatrix::from_rows(skills, rows).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_ordered_pairs_are_stable() {
        assert_eq!(
            ordered_pairs(3),
            vec![(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)]
        );
        assert!(ordered_pairs(1).is_empty());
    }

    #[test]
    fn test_product_statistics() {
        let m = matrix(vec![
            vec![Some(1.0), Some(0.5)],
            vec![Some(0.5), Some(0.5)],
        ]);
        let stats = compute_statistics(&m, JointConvention::Product, false).unwrap();
        assert_eq!(stats.len(), 2);

        let ab = &stats[0];
        assert_eq!((ab.antecedent, ab.consequent), (0, 1));
        assert!(approx(ab.support_antecedent, 1.5));
        assert!(approx(ab.support_consequent, 1.0));
        assert!(approx(ab.joint_support, 0.75));
        assert!(approx(ab.confidence.unwrap(), 0.5));

        let ba = &stats[1];
        assert!(approx(ba.joint_support, 0.75));
        assert!(approx(ba.confidence.unwrap(), 0.75));
    }

    #[test]
    fn test_minimum_statistics() {
        let m = matrix(vec![
            vec![Some(0.9), Some(0.3)],
            vec![Some(0.2), Some(0.6)],
        ]);
        let stats = compute_statistics(&m, JointConvention::Minimum, false).unwrap();
        assert!(approx(stats[0].joint_support, 0.5));
        assert!(approx(stats[0].confidence.unwrap(), 0.5 / 1.1));
        assert!(approx(stats[1].confidence.unwrap(), 0.5 / 0.9));
    }

    #[test]
    fn test_missing_values_are_excluded_not_zero() {
        let m = matrix(vec![
            vec![Some(0.8), None],
            vec![Some(0.6), Some(0.5)],
        ]);
        let supports = skill_supports(&m);
        assert!(approx(supports[0].expected, 1.4));
        assert_eq!(supports[1].observed, 1);

        let stats = compute_statistics(&m, JointConvention::Product, false).unwrap();
        assert_eq!(stats[0].co_observed, 1);
        assert!(approx(stats[0].joint_support, 0.3));
    }

    #[test]
    fn test_all_missing_skill_has_undefined_confidence() {
        let m = matrix(vec![
            vec![Some(0.8), None],
            vec![Some(0.6), None],
        ]);
        let stats = compute_statistics(&m, JointConvention::Product, false).unwrap();
        assert!(stats.iter().all(|s| s.confidence.is_none()));
    }

    #[test]
    fn test_zero_support_antecedent_is_undefined() {
        let m = matrix(vec![vec![Some(0.0), Some(0.7)]]);
        let stats = compute_statistics(&m, JointConvention::Product, false).unwrap();
        assert_eq!(stats[0].confidence, None);
        assert_eq!(stats[1].confidence, Some(0.0));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let rows = (0..25)
            .map(|i| {
                (0..5)
                    .map(|j| Some(((i * 7 + j * 3) % 11) as f64 / 10.0))
                    .collect()
            })
            .collect();
        let m = matrix(rows);
        let seq = compute_statistics(&m, JointConvention::Product, false).unwrap();
        let par = compute_statistics(&m, JointConvention::Product, true).unwrap();
        assert_eq!(seq, par);
    }
}
