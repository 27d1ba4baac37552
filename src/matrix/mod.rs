//! Learner × skill mastery probabilities
//!
//! The matrix is built once from the input table and only ever read
//! afterwards. Missing cells (a learner never evaluated on a skill) are kept
//! as `None` so they drop out of that skill's support instead of counting
//! as zero mastery.

use std::collections::HashSet;

use crate::error::{MiningError, Result};

pub mod loader;

pub use loader::{load_matrix, parse_matrix, IdColumn, LoadError, LoaderOptions};

/// Immutable, rectangular matrix of mastery beliefs
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityMatrix {
    skills: Vec<String>,
    learners: Vec<String>,
    /// Row-major, `learners.len() * skills.len()` cells
    cells: Vec<Option<f64>>,
}

impl ProbabilityMatrix {
    /// Build a matrix from per-learner rows, validating every cell.
    pub fn new(
        skills: Vec<String>,
        learners: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        if skills.is_empty() {
            return Err(MiningError::invalid_input("matrix has no skills"));
        }
        if rows.is_empty() {
            return Err(MiningError::invalid_input("matrix has no learners"));
        }
        if learners.len() != rows.len() {
            return Err(MiningError::invalid_input(format!(
                "{} learner identifiers for {} rows",
                learners.len(),
                rows.len()
            )));
        }

        let mut seen = HashSet::new();
        for skill in &skills {
            if skill.is_empty() {
                return Err(MiningError::invalid_input("empty skill identifier"));
            }
            if !seen.insert(skill.as_str()) {
                return Err(MiningError::invalid_input(format!(
                    "duplicate skill identifier '{}'",
                    skill
                )));
            }
        }

        let mut cells = Vec::with_capacity(rows.len() * skills.len());
        for (learner, row) in learners.iter().zip(rows) {
            if row.len() != skills.len() {
                return Err(MiningError::invalid_input(format!(
                    "learner '{}' has {} values, expected {}",
                    learner,
                    row.len(),
                    skills.len()
                )));
            }
            for (skill, value) in skills.iter().zip(&row) {
                if let Some(p) = value {
                    if !p.is_finite() || !(0.0..=1.0).contains(p) {
                        return Err(MiningError::invalid_input(format!(
                            "probability {} for learner '{}', skill '{}' is outside [0, 1]",
                            p, learner, skill
                        )));
                    }
                }
            }
            cells.extend(row);
        }

        Ok(Self {
            skills,
            learners,
            cells,
        })
    }

    /// Build a matrix with synthesized learner identifiers (`learner-1`, ...).
    pub fn from_rows(skills: Vec<String>, rows: Vec<Vec<Option<f64>>>) -> Result<Self> {
        let learners = (1..=rows.len()).map(|i| format!("learner-{}", i)).collect();
        Self::new(skills, learners, rows)
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    pub fn learners(&self) -> &[String] {
        &self.learners
    }

    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }

    pub fn learner_count(&self) -> usize {
        self.learners.len()
    }

    /// Position of a skill identifier in column order
    pub fn skill_index(&self, skill: &str) -> Option<usize> {
        self.skills.iter().position(|s| s == skill)
    }

    /// Belief that `learner` has mastered `skill`, `None` when not evaluated
    pub fn get(&self, learner: usize, skill: usize) -> Option<f64> {
        self.cells[learner * self.skills.len() + skill]
    }

    /// Values of one skill across learners, in learner order
    pub fn column(&self, skill: usize) -> impl Iterator<Item = Option<f64>> + '_ {
        (0..self.learners.len()).map(move |learner| self.get(learner, skill))
    }

    /// Matrix of non-mastery beliefs: every present `p` becomes `1 - p`.
    pub fn complement(&self) -> Self {
        Self {
            skills: self.skills.clone(),
            learners: self.learners.clone(),
            cells: self.cells.iter().map(|c| c.map(|p| 1.0 - p)).collect(),
        }
    }
}
