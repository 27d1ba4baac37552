//! CSV loading for probability matrices
//!
//! The first row names the skills. Each following row is one learner: an
//! optional identifier, then one probability per skill. Empty cells and the
//! configured markers count as missing. Fields may be double-quoted to hold
//! the delimiter; a doubled quote inside a quoted field is a literal quote.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ProbabilityMatrix;
use crate::error::MiningError;

/// Header names recognised as a learner identifier column
const ID_HEADERS: &[&str] = &[
    "id",
    "learner",
    "learner_id",
    "student",
    "student_id",
    "user",
    "user_id",
];

/// Errors raised while reading an input table
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed input at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error(transparent)]
    Matrix(#[from] MiningError),
}

/// Whether the first column holds learner identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdColumn {
    /// Decide from the first header cell
    #[default]
    Auto,
    Present,
    Absent,
}

/// Options for parsing an input table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    pub id_column: IdColumn,
    /// Cell values treated as missing, in addition to the empty cell
    pub missing_markers: Vec<String>,
    pub delimiter: char,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            id_column: IdColumn::Auto,
            missing_markers: vec!["NA".into(), "NaN".into(), "?".into(), "-".into()],
            delimiter: ',',
        }
    }
}

impl LoaderOptions {
    fn is_missing(&self, cell: &str) -> bool {
        cell.is_empty() || self.missing_markers.iter().any(|m| m == cell)
    }
}

/// Read a matrix from a CSV file
pub fn load_matrix(path: &Path, options: &LoaderOptions) -> Result<ProbabilityMatrix, LoadError> {
    let content = std::fs::read_to_string(path)?;
    debug!("Read {} bytes from {}", content.len(), path.display());
    parse_matrix(&content, options)
}

/// Parse a matrix from CSV text
pub fn parse_matrix(content: &str, options: &LoaderOptions) -> Result<ProbabilityMatrix, LoadError> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty());

    let (header_line, header) = lines.next().ok_or(LoadError::Malformed {
        line: 1,
        reason: "missing header row".to_string(),
    })?;
    let header = split_fields(header.trim_start_matches('\u{feff}'), options.delimiter);

    let has_id = match options.id_column {
        IdColumn::Present => true,
        IdColumn::Absent => false,
        IdColumn::Auto => header.first().is_some_and(|first| {
            first.is_empty() || ID_HEADERS.contains(&first.to_lowercase().as_str())
        }),
    };

    let skills: Vec<String> = if has_id {
        header.into_iter().skip(1).collect()
    } else {
        header
    };
    if skills.is_empty() {
        return Err(LoadError::Malformed {
            line: header_line,
            reason: "header names no skills".to_string(),
        });
    }

    let mut learners = Vec::new();
    let mut rows = Vec::new();
    for (line_no, line) in lines {
        let mut fields = split_fields(line, options.delimiter);
        let learner = if has_id {
            if fields.is_empty() {
                return Err(LoadError::Malformed {
                    line: line_no,
                    reason: "missing learner identifier".to_string(),
                });
            }
            fields.remove(0)
        } else {
            format!("learner-{}", rows.len() + 1)
        };

        if fields.len() != skills.len() {
            return Err(LoadError::Malformed {
                line: line_no,
                reason: format!("expected {} values, found {}", skills.len(), fields.len()),
            });
        }

        let row = fields
            .iter()
            .zip(&skills)
            .map(|(cell, skill)| {
                if options.is_missing(cell) {
                    return Ok(None);
                }
                cell.parse::<f64>().map(Some).map_err(|_| LoadError::Malformed {
                    line: line_no,
                    reason: format!("value '{}' for skill '{}' is not a number", cell, skill),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        learners.push(learner);
        rows.push(row);
    }

    debug!(
        "Parsed {} learners x {} skills (id column: {})",
        rows.len(),
        skills.len(),
        has_id
    );
    Ok(ProbabilityMatrix::new(skills, learners, rows)?)
}

fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            c if c == delimiter && !quoted => {
                fields.push(field.trim().to_string());
                field.clear();
            }
            c => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}
