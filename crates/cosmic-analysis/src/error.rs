//! Error types for the analysis engines.

use thiserror::Error;

/// Configuration rejected when an engine is built.
///
/// Running an engine never fails: too little data is reported through
/// [`AnomalyOutcome::Insufficient`](cosmic_model::AnomalyOutcome) and gap-free
/// input through an empty imputation report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("invalid {option} {value}: {reason}")]
    InvalidOption {
        option: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl AnalysisError {
    pub(crate) fn invalid(option: &'static str, value: impl ToString, reason: &'static str) -> Self {
        Self::InvalidOption {
            option,
            value: value.to_string(),
            reason,
        }
    }
}

/// Result type for engine construction.
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalysisError::invalid("contamination", 0.9, "must be within 0.0..=0.5");
        assert_eq!(
            err.to_string(),
            "invalid contamination 0.9: must be within 0.0..=0.5"
        );
    }
}
