//! Support distributions and rule probabilities
//!
//! Under per-learner independence the support count of a pattern is a
//! Poisson-binomial variable. Its pmf is built with the usual dynamic
//! program, one learner at a time. From the pmfs of `a AND b` and
//! `a AND NOT b` we get the probability that a rule a => b clears both the
//! support and the confidence thresholds.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::config::{JointConvention, MiningConfig};
use crate::error::Result;
use crate::matrix::ProbabilityMatrix;

use super::statistics::{compute_statistics, PairwiseStatistic};

/// Probability mass function of the support count, indexed by count.
///
/// `probabilities[i]` is the chance that learner `i` supports the pattern.
pub fn support_distribution(probabilities: &[f64]) -> Vec<f64> {
    let mut pmf = vec![0.0; probabilities.len() + 1];
    pmf[0] = 1.0;
    for (seen, &p) in probabilities.iter().enumerate() {
        // Walk downwards so pmf[k - 1] still holds the previous round
        for k in (1..=seen + 1).rev() {
            pmf[k] = p * pmf[k - 1] + (1.0 - p) * pmf[k];
        }
        pmf[0] *= 1.0 - p;
    }
    pmf
}

/// Probability that a rule reaches `min_support_count` joint support and
/// `min_confidence` confidence, given the support pmfs of `a AND b` and
/// `a AND NOT b`.
pub fn rule_probability(
    joint_pmf: &[f64],
    counter_pmf: &[f64],
    min_support_count: usize,
    min_confidence: f64,
) -> f64 {
    // conf = i / (i + j) >= c  <=>  j <= i * (1 - c) / c
    let ratio = if min_confidence > 0.0 {
        (1.0 - min_confidence) / min_confidence
    } else {
        f64::INFINITY
    };

    let mut cumulative = Vec::with_capacity(counter_pmf.len());
    let mut running = 0.0;
    for &p in counter_pmf {
        running += p;
        cumulative.push(running);
    }

    let mut probability = 0.0;
    for (i, &p_joint) in joint_pmf.iter().enumerate().skip(min_support_count) {
        if p_joint == 0.0 || cumulative.is_empty() {
            continue;
        }
        let bound = ratio * i as f64;
        let p_counter = if ratio.is_infinite() || bound >= (cumulative.len() - 1) as f64 {
            cumulative[cumulative.len() - 1]
        } else {
            cumulative[bound.floor() as usize]
        };
        probability += p_joint * p_counter;
    }
    probability.min(1.0)
}

/// Per-learner probabilities that a learner supports `a AND b` and
/// `a AND NOT b`. Learners missing either value support neither.
fn pattern_probabilities(
    matrix: &ProbabilityMatrix,
    joint: JointConvention,
    a: usize,
    b: usize,
) -> (Vec<f64>, Vec<f64>) {
    (0..matrix.learner_count())
        .map(|learner| match (matrix.get(learner, a), matrix.get(learner, b)) {
            (Some(pa), Some(pb)) => (joint.both(pa, pb), joint.only_first(pa, pb)),
            _ => (0.0, 0.0),
        })
        .unzip()
}

/// Smallest integer support count meeting `min_support`
pub fn min_support_count(min_support: f64) -> usize {
    min_support.ceil().max(0.0) as usize
}

/// P(a => b) for one ordered pair under `config`
pub fn pair_rule_probability(
    matrix: &ProbabilityMatrix,
    config: &MiningConfig,
    a: usize,
    b: usize,
) -> f64 {
    let (joint_probs, counter_probs) = pattern_probabilities(matrix, config.joint, a, b);
    let joint_pmf = support_distribution(&joint_probs);
    let counter_pmf = support_distribution(&counter_probs);
    rule_probability(
        &joint_pmf,
        &counter_pmf,
        min_support_count(config.min_support),
        config.min_confidence,
    )
}

/// A rule with its probability of meeting the thresholds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRule {
    pub antecedent: String,
    pub consequent: String,
    pub joint_support: f64,
    pub confidence: f64,
    pub probability: f64,
}

/// Rank every ordered pair with defined confidence by rule probability,
/// highest first. Ties keep pair order.
pub fn rank_rules(matrix: &ProbabilityMatrix, config: &MiningConfig) -> Result<Vec<RankedRule>> {
    config.validate(matrix.learner_count())?;
    let stats = compute_statistics(matrix, config.joint, config.parallel)?;
    let defined: Vec<&PairwiseStatistic> = stats.iter().filter(|s| s.is_defined()).collect();

    let score = |s: &&PairwiseStatistic| {
        pair_rule_probability(matrix, config, s.antecedent, s.consequent)
    };
    let probabilities: Vec<f64> = if config.parallel {
        defined.par_iter().map(score).collect()
    } else {
        defined.iter().map(score).collect()
    };

    let mut ranked: Vec<RankedRule> = defined
        .iter()
        .zip(probabilities)
        .map(|(s, probability)| RankedRule {
            antecedent: matrix.skills()[s.antecedent].clone(),
            consequent: matrix.skills()[s.consequent].clone(),
            joint_support: s.joint_support,
            confidence: s.confidence.unwrap_or_default(),
            probability,
        })
        .collect();
    ranked.sort_by(|x, y| y.probability.total_cmp(&x.probability));

    debug!("Ranked {} rules", ranked.len());
    Ok(ranked)
}
