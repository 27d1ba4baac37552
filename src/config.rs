//! Mining configuration
//!
//! `MiningConfig` is the explicit parameter set handed to every pipeline
//! stage. `ConfigFile` is the on-disk TOML form, where the thresholds are
//! optional because they have no sensible default and may come from the
//! command line instead.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::MiningError;
use crate::matrix::LoaderOptions;

/// Default tolerance under which two directional confidences count as equal
pub const DEFAULT_DIRECTION_TOLERANCE: f64 = 1e-9;

/// How one learner's two skill beliefs combine into a joint-mastery belief
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JointConvention {
    /// Independent evidence: p(a) * p(b)
    #[default]
    Product,
    /// Fuzzy AND: min(p(a), p(b))
    Minimum,
}

impl JointConvention {
    /// Belief that a learner has mastered both skills
    pub fn both(&self, a: f64, b: f64) -> f64 {
        match self {
            JointConvention::Product => a * b,
            JointConvention::Minimum => a.min(b),
        }
    }

    /// Belief that a learner has mastered `a` but not `b`
    pub fn only_first(&self, a: f64, b: f64) -> f64 {
        self.both(a, 1.0 - b)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JointConvention::Product => "product",
            JointConvention::Minimum => "minimum",
        }
    }
}

impl std::str::FromStr for JointConvention {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "product" => Ok(JointConvention::Product),
            "minimum" | "min" => Ok(JointConvention::Minimum),
            other => Err(format!("unknown joint convention '{}' (product, minimum)", other)),
        }
    }
}

/// Parameters of one mining run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningConfig {
    /// Minimum expected joint support, in learners
    pub min_support: f64,
    /// Minimum confidence of the implication a => b
    pub min_confidence: f64,
    /// When set, rules must also reach this probability of meeting both thresholds
    pub min_probability: Option<f64>,
    pub joint: JointConvention,
    /// Directional confidences closer than this are treated as indistinguishable
    pub direction_tolerance: f64,
    /// Keep a => b only if not-b => not-a also holds on the complement matrix
    pub require_complement: bool,
    /// Compute pair statistics on the rayon pool
    pub parallel: bool,
}

impl MiningConfig {
    pub fn new(min_support: f64, min_confidence: f64) -> Self {
        Self {
            min_support,
            min_confidence,
            min_probability: None,
            joint: JointConvention::default(),
            direction_tolerance: DEFAULT_DIRECTION_TOLERANCE,
            require_complement: false,
            parallel: true,
        }
    }

    pub fn with_joint(mut self, joint: JointConvention) -> Self {
        self.joint = joint;
        self
    }

    pub fn with_min_probability(mut self, min_probability: f64) -> Self {
        self.min_probability = Some(min_probability);
        self
    }

    pub fn with_direction_tolerance(mut self, tolerance: f64) -> Self {
        self.direction_tolerance = tolerance;
        self
    }

    pub fn with_complement_check(mut self, enabled: bool) -> Self {
        self.require_complement = enabled;
        self
    }

    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Check every parameter against its valid range for a matrix of
    /// `learner_count` learners.
    pub fn validate(&self, learner_count: usize) -> Result<(), MiningError> {
        let max_support = learner_count as f64;
        if !self.min_support.is_finite() || self.min_support < 0.0 || self.min_support > max_support {
            return Err(MiningError::invalid_config(
                "min_support",
                self.min_support,
                format!("must be within [0, {}]", learner_count),
            ));
        }
        check_unit("min_confidence", self.min_confidence)?;
        if let Some(p) = self.min_probability {
            check_unit("min_probability", p)?;
        }
        if !self.direction_tolerance.is_finite() || self.direction_tolerance < 0.0 {
            return Err(MiningError::invalid_config(
                "direction_tolerance",
                self.direction_tolerance,
                "must be a non-negative number",
            ));
        }
        Ok(())
    }
}

fn check_unit(parameter: &str, value: f64) -> Result<(), MiningError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(MiningError::invalid_config(parameter, value, "must be within [0, 1]"))
    }
}

/// On-disk configuration (`.prereq/config.toml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub min_support: Option<f64>,
    pub min_confidence: Option<f64>,
    pub min_probability: Option<f64>,
    pub joint: JointConvention,
    pub direction_tolerance: f64,
    pub require_complement: bool,
    pub parallel: bool,
    pub loader: LoaderOptions,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            min_support: None,
            min_confidence: None,
            min_probability: None,
            joint: JointConvention::default(),
            direction_tolerance: DEFAULT_DIRECTION_TOLERANCE,
            require_complement: false,
            parallel: true,
            loader: LoaderOptions::default(),
        }
    }
}

impl ConfigFile {
    /// Turn file settings into a run configuration. Fails when a required
    /// threshold is still unset.
    pub fn to_mining_config(&self) -> Result<MiningConfig, MiningError> {
        let min_support = self.min_support.ok_or_else(|| {
            MiningError::invalid_config("min_support", "unset", "a minimum support is required")
        })?;
        let min_confidence = self.min_confidence.ok_or_else(|| {
            MiningError::invalid_config(
                "min_confidence",
                "unset",
                "a minimum confidence is required",
            )
        })?;

        Ok(MiningConfig {
            min_support,
            min_confidence,
            min_probability: self.min_probability,
            joint: self.joint,
            direction_tolerance: self.direction_tolerance,
            require_complement: self.require_complement,
            parallel: self.parallel,
        })
    }
}

/// Load configuration from file, falling back to defaults when absent
pub fn load_config(config_path: &Path) -> Result<ConfigFile> {
    if !config_path.exists() {
        return Ok(ConfigFile::default());
    }

    let content = std::fs::read_to_string(config_path)?;
    let config: ConfigFile = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &ConfigFile, config_path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(config_path, content)?;
    Ok(())
}

/// Locate the `.prereq` directory: current project first, then home
pub fn get_prereq_dir() -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let project_dir = cwd.join(".prereq");
    if project_dir.exists() {
        return Ok(project_dir);
    }

    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
    Ok(home.join(".prereq"))
}
