//! Aggregation policies: how each rule kind generalizes across batches.
//!
//! Every supported rule kind maps to exactly one [`AggregationStrategy`]. The
//! mapping is fixed at construction time — build a [`PolicyTable`] once and
//! pass it to the synthesizer, so tests can substitute alternate tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// How one rule kind's parameters are combined across batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationStrategy {
    /// The rule kind cannot be meaningfully generalized; no candidate rule is
    /// produced (e.g. ordered-column-list or type-list rules).
    Skip,
    /// Reduce per-batch observations to the statistical mode (ties broken by
    /// first encounter in batch order) and store it under `target_parameter`.
    SingleValue {
        /// Observation field to read from each measurement.
        source_field: String,
        /// Parameter name the mode is stored under. The `mostly` target gets
        /// the inversion treatment described in the synthesizer.
        target_parameter: String,
    },
    /// Reduce per-batch observations to their minimum and maximum, stored as
    /// `min_value` / `max_value` parameters.
    MinMaxValues {
        /// Observation field to read from each measurement.
        source_field: String,
    },
}

impl AggregationStrategy {
    /// Shorthand for a `SingleValue` strategy.
    pub fn single_value(source_field: impl Into<String>, target_parameter: impl Into<String>) -> Self {
        Self::SingleValue {
            source_field: source_field.into(),
            target_parameter: target_parameter.into(),
        }
    }

    /// Shorthand for a `MinMaxValues` strategy.
    pub fn min_max(source_field: impl Into<String>) -> Self {
        Self::MinMaxValues {
            source_field: source_field.into(),
        }
    }

    /// Human-readable strategy name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::SingleValue { .. } => "single_value",
            Self::MinMaxValues { .. } => "min_max_values",
        }
    }
}

/// Immutable mapping from rule kind to aggregation strategy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyTable {
    policies: BTreeMap<String, AggregationStrategy>,
}

impl PolicyTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The table for the rule kinds the basic single-batch profiler emits.
    ///
    /// Compliance-style rules (`expect_column_values_to_*`) generalize their
    /// `mostly` tolerance from the observed `unexpected_percent`; range-style
    /// rules generalize `min_value`/`max_value` from `observed_value`;
    /// schema-shape rules are skipped outright.
    pub fn standard() -> Self {
        Self::new()
            .with_policy(
                "expect_table_row_count_to_be_between",
                AggregationStrategy::min_max("observed_value"),
            )
            .with_policy(
                "expect_table_columns_to_match_ordered_list",
                AggregationStrategy::Skip,
            )
            .with_policy(
                "expect_column_values_to_be_in_type_list",
                AggregationStrategy::Skip,
            )
            .with_policy(
                "expect_column_values_to_not_be_null",
                AggregationStrategy::single_value("unexpected_percent", "mostly"),
            )
            .with_policy(
                "expect_column_values_to_be_in_set",
                AggregationStrategy::single_value("unexpected_percent", "mostly"),
            )
            .with_policy(
                "expect_column_values_to_not_match_regex",
                AggregationStrategy::single_value("unexpected_percent", "mostly"),
            )
            .with_policy(
                "expect_column_values_to_be_unique",
                AggregationStrategy::single_value("unexpected_percent", "mostly"),
            )
            .with_policy(
                "expect_column_unique_value_count_to_be_between",
                AggregationStrategy::min_max("observed_value"),
            )
            .with_policy(
                "expect_column_proportion_of_unique_values_to_be_between",
                AggregationStrategy::min_max("observed_value"),
            )
            .with_policy(
                "expect_column_min_to_be_between",
                AggregationStrategy::min_max("observed_value"),
            )
            .with_policy(
                "expect_column_max_to_be_between",
                AggregationStrategy::min_max("observed_value"),
            )
            .with_policy(
                "expect_column_mean_to_be_between",
                AggregationStrategy::min_max("observed_value"),
            )
            .with_policy(
                "expect_column_median_to_be_between",
                AggregationStrategy::min_max("observed_value"),
            )
    }

    /// Add or replace one rule kind's strategy, builder style.
    #[must_use]
    pub fn with_policy(mut self, rule_kind: impl Into<String>, strategy: AggregationStrategy) -> Self {
        self.policies.insert(rule_kind.into(), strategy);
        self
    }

    /// Look up the strategy for a rule kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRuleKind`] when the kind is unmapped: an
    /// unmapped kind is a configuration error, never a silent skip.
    pub fn policy(&self, rule_kind: &str) -> Result<&AggregationStrategy> {
        self.policies
            .get(rule_kind)
            .ok_or_else(|| Error::unknown_rule_kind(rule_kind))
    }

    /// Whether a rule kind is mapped.
    pub fn contains(&self, rule_kind: &str) -> bool {
        self.policies.contains_key(rule_kind)
    }

    /// Number of mapped rule kinds.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Returns true if no rule kinds are mapped.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_names() {
        assert_eq!(AggregationStrategy::Skip.name(), "skip");
        assert_eq!(
            AggregationStrategy::single_value("unexpected_percent", "mostly").name(),
            "single_value"
        );
        assert_eq!(
            AggregationStrategy::min_max("observed_value").name(),
            "min_max_values"
        );
    }

    #[test]
    fn test_standard_table_covers_profiler_kinds() {
        let table = PolicyTable::standard();
        for kind in [
            "expect_table_row_count_to_be_between",
            "expect_column_values_to_not_be_null",
            "expect_column_values_to_be_in_set",
            "expect_column_values_to_not_match_regex",
            "expect_column_unique_value_count_to_be_between",
            "expect_column_proportion_of_unique_values_to_be_between",
            "expect_column_values_to_be_unique",
        ] {
            assert!(table.contains(kind), "missing policy for {kind}");
        }
    }

    #[test]
    fn test_standard_table_skips_schema_shape_rules() {
        let table = PolicyTable::standard();
        assert_eq!(
            table
                .policy("expect_table_columns_to_match_ordered_list")
                .unwrap(),
            &AggregationStrategy::Skip
        );
        assert_eq!(
            table.policy("expect_column_values_to_be_in_type_list").unwrap(),
            &AggregationStrategy::Skip
        );
    }

    #[test]
    fn test_unknown_rule_kind_is_an_error() {
        let table = PolicyTable::standard();
        let err = table.policy("expect_column_kurtosis_to_be_between").unwrap_err();
        assert!(matches!(err, Error::UnknownRuleKind { .. }));
    }

    #[test]
    fn test_with_policy_replaces() {
        let table = PolicyTable::standard().with_policy(
            "expect_column_values_to_not_be_null",
            AggregationStrategy::Skip,
        );
        assert_eq!(
            table.policy("expect_column_values_to_not_be_null").unwrap(),
            &AggregationStrategy::Skip
        );
    }
}
