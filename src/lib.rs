//! prereq - prerequisite discovery between skills
//!
//! Mines directed "a is a prerequisite of b" relations from a matrix of
//! per-learner mastery probabilities, using expected (probabilistic)
//! support and confidence instead of hard counts, then prunes the result
//! to an acyclic, transitively reduced graph.
//!
//! ```no_run
//! use prereq::{discover_prerequisites, MiningConfig, ProbabilityMatrix};
//!
//! let matrix = ProbabilityMatrix::from_rows(
//!     vec!["Counting".into(), "Addition".into()],
//!     vec![vec![Some(0.9), Some(0.8)], vec![Some(0.7), Some(0.1)]],
//! )?;
//! let edges = discover_prerequisites(&matrix, &MiningConfig::new(0.5, 0.6))?;
//! // Learners who master Addition also master Counting: Counting -> Addition
//! assert_eq!((edges[0].from.as_str(), edges[0].to.as_str()), ("Counting", "Addition"));
//! # Ok::<(), prereq::MiningError>(())
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod matrix;
pub mod mining;
pub mod report;

pub use config::{JointConvention, MiningConfig};
pub use error::MiningError;
pub use graph::PrerequisiteEdge;
pub use matrix::ProbabilityMatrix;
pub use mining::{discover_prerequisites, mine, MiningReport};
