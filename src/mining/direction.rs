//! Orientation of candidate rules
//!
//! A genuine prerequisite relation is asymmetric, so each unordered skill
//! pair keeps at most one direction: the only survivor, or the strictly
//! more confident of two. Pairs whose two confidences are within tolerance
//! are dropped.
//!
//! A rule a => b says whoever masters a also masters b, so b is the
//! prerequisite: the relation runs from the consequent to the antecedent.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::candidates::CandidateRule;

/// The single direction kept for an unordered skill pair: `from` is the
/// prerequisite of `to`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrientedRelation {
    pub from: usize,
    pub to: usize,
    pub confidence: f64,
    pub joint_support: f64,
}

impl From<&CandidateRule> for OrientedRelation {
    fn from(rule: &CandidateRule) -> Self {
        Self {
            from: rule.consequent,
            to: rule.antecedent,
            confidence: rule.confidence,
            joint_support: rule.joint_support,
        }
    }
}

/// Resolve candidates to at most one relation per unordered pair, ordered
/// by (lower index, higher index) of the pair.
pub fn resolve_directions(candidates: &[CandidateRule], tolerance: f64) -> Vec<OrientedRelation> {
    let mut groups: BTreeMap<(usize, usize), Vec<&CandidateRule>> = BTreeMap::new();
    for rule in candidates {
        let key = if rule.antecedent < rule.consequent {
            (rule.antecedent, rule.consequent)
        } else {
            (rule.consequent, rule.antecedent)
        };
        groups.entry(key).or_default().push(rule);
    }

    let mut relations = Vec::with_capacity(groups.len());
    for ((low, high), rules) in groups {
        match rules.as_slice() {
            [only] => relations.push(OrientedRelation::from(*only)),
            [first, second] => {
                let delta = first.confidence - second.confidence;
                if delta.abs() <= tolerance {
                    debug!(
                        "Dropping {} <-> {}: confidences {:.6} and {:.6} are indistinguishable",
                        low, high, first.confidence, second.confidence
                    );
                } else if delta > 0.0 {
                    relations.push(OrientedRelation::from(*first));
                } else {
                    relations.push(OrientedRelation::from(*second));
                }
            }
            // Ordered pairs are unique upstream, so a group never exceeds two
            _ => debug!("Ignoring malformed candidate group {} <-> {}", low, high),
        }
    }

    debug!("Oriented {} relations from {} candidates", relations.len(), candidates.len());
    relations
}
