//! Error types for calibrar.

/// Result type alias for calibrar operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during multi-batch rule calibration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No batches were supplied for profiling.
    #[error("No batches supplied: profiling requires at least one batch")]
    EmptyBatchList,

    /// A batch's measurements did not match the initial rule set exactly once
    /// per rule. Signals schema drift or a non-deterministic validator.
    #[error(
        "Rule '{rule_kind}' matched {found} measurements in batch {batch_index} (expected exactly 1)"
    )]
    AmbiguousMatch {
        /// Kind of the rule that failed to match exactly once.
        rule_kind: String,
        /// Index of the offending batch in the submitted batch list.
        batch_index: usize,
        /// Number of measurements that echoed this rule's identity.
        found: usize,
    },

    /// An aggregation policy referenced an observation field that the
    /// measurement does not carry.
    #[error("Observation field '{field}' not found in measurement for rule '{rule_kind}'")]
    FieldNotFound {
        /// Kind of the rule whose measurement was inspected.
        rule_kind: String,
        /// The missing observation field.
        field: String,
    },

    /// The policy table has no entry for a rule kind.
    #[error("No aggregation policy registered for rule kind '{rule_kind}'")]
    UnknownRuleKind {
        /// The unmapped rule kind.
        rule_kind: String,
    },

    /// A numeric aggregation encountered a non-numeric observation.
    #[error("Observation field '{field}' for rule '{rule_kind}' is not numeric (got {value})")]
    NonNumericObservation {
        /// Kind of the rule whose measurement was inspected.
        rule_kind: String,
        /// The observation field that held the value.
        field: String,
        /// Display rendering of the offending value.
        value: String,
    },

    /// A measurement sink rejected an append. Non-fatal to profiling.
    #[error("Measurement sink error: {message}")]
    Sink {
        /// Description of the sink failure.
        message: String,
    },
}

impl Error {
    /// Create an ambiguous match error.
    pub fn ambiguous_match(rule_kind: impl Into<String>, batch_index: usize, found: usize) -> Self {
        Self::AmbiguousMatch {
            rule_kind: rule_kind.into(),
            batch_index,
            found,
        }
    }

    /// Create a field not found error.
    pub fn field_not_found(rule_kind: impl Into<String>, field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            rule_kind: rule_kind.into(),
            field: field.into(),
        }
    }

    /// Create an unknown rule kind error.
    pub fn unknown_rule_kind(rule_kind: impl Into<String>) -> Self {
        Self::UnknownRuleKind {
            rule_kind: rule_kind.into(),
        }
    }

    /// Create a non-numeric observation error.
    pub fn non_numeric(
        rule_kind: impl Into<String>,
        field: impl Into<String>,
        value: impl std::fmt::Display,
    ) -> Self {
        Self::NonNumericObservation {
            rule_kind: rule_kind.into(),
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Create a sink error.
    pub fn sink(message: impl Into<String>) -> Self {
        Self::Sink {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch_list() {
        let err = Error::EmptyBatchList;
        assert!(err.to_string().contains("at least one batch"));
    }

    #[test]
    fn test_ambiguous_match() {
        let err = Error::ambiguous_match("expect_column_values_to_not_be_null", 3, 0);
        let msg = err.to_string();
        assert!(msg.contains("expect_column_values_to_not_be_null"));
        assert!(msg.contains("batch 3"));
        assert!(msg.contains("matched 0"));
    }

    #[test]
    fn test_field_not_found() {
        let err = Error::field_not_found("expect_table_row_count_to_be_between", "observed_value");
        let msg = err.to_string();
        assert!(msg.contains("observed_value"));
        assert!(msg.contains("expect_table_row_count_to_be_between"));
    }

    #[test]
    fn test_unknown_rule_kind() {
        let err = Error::unknown_rule_kind("expect_something_novel");
        assert!(err.to_string().contains("expect_something_novel"));
    }

    #[test]
    fn test_non_numeric_observation() {
        let err = Error::non_numeric("expect_column_min_to_be_between", "observed_value", "\"abc\"");
        let msg = err.to_string();
        assert!(msg.contains("not numeric"));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn test_sink_error() {
        let err = Error::sink("store unavailable");
        assert!(err.to_string().contains("store unavailable"));
    }
}
