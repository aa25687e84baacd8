// Error taxonomy shared by the filter engine and the aggregator
use std::fmt;
use thiserror::Error;

/// Which kind of key a failed lookup was made with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Program,
    Representative,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Program => f.write_str("program"),
            KeyKind::Representative => f.write_str("representative"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    #[error("unknown {kind} '{key}'")]
    KeyNotFound { kind: KeyKind, key: String },

    #[error("no eligible {what} to compute over")]
    EmptyInput { what: &'static str },

    #[error("division by zero computing {metric} for {representative}")]
    DivisionByZero {
        representative: String,
        metric: &'static str,
    },

    #[error("inconsistent data: {detail}")]
    DataConsistency { detail: String },
}

impl AnalyticsError {
    pub fn program_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound {
            kind: KeyKind::Program,
            key: key.into(),
        }
    }

    pub fn rep_not_found(key: impl Into<String>) -> Self {
        Self::KeyNotFound {
            kind: KeyKind::Representative,
            key: key.into(),
        }
    }

    pub fn inconsistent(detail: impl Into<String>) -> Self {
        Self::DataConsistency {
            detail: detail.into(),
        }
    }

    /// Stable machine-readable code, used by the HTTP layer
    pub fn code(&self) -> &'static str {
        match self {
            Self::KeyNotFound { .. } => "key_not_found",
            Self::EmptyInput { .. } => "empty_input",
            Self::DivisionByZero { .. } => "division_by_zero",
            Self::DataConsistency { .. } => "data_consistency",
        }
    }
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_key() {
        let err = AnalyticsError::rep_not_found("Nonexistent");
        assert_eq!(err.to_string(), "unknown representative 'Nonexistent'");
        assert_eq!(err.code(), "key_not_found");

        let err = AnalyticsError::DivisionByZero {
            representative: "Sue".to_string(),
            metric: "lead_to_enroll",
        };
        assert_eq!(
            err.to_string(),
            "division by zero computing lead_to_enroll for Sue"
        );
    }
}
