//! Error taxonomy for the mining pipeline
//!
//! Every stage reports the first violation it observes and carries enough
//! detail (skill, learner, parameter, value) for the driver to explain it.

/// Errors raised by the mining pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MiningError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("invalid configuration: {parameter} = {value} ({reason})")]
    InvalidConfiguration {
        parameter: String,
        value: String,
        reason: String,
    },

    #[error("inconsistent graph: {details}")]
    InconsistentGraph { details: String },
}

impl MiningError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        MiningError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_config(
        parameter: &str,
        value: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        MiningError::InvalidConfiguration {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MiningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_names_parameter() {
        let err = MiningError::invalid_config("min_confidence", 1.5, "must be within [0, 1]");
        let msg = err.to_string();
        assert!(msg.contains("min_confidence"));
        assert!(msg.contains("1.5"));
    }
}
