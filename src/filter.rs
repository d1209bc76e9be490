//! Inclusion filtering for synthesized rules.
//!
//! Applied after synthesis: a candidate rule only enters the output suite if
//! it clears the configured column allow-list and rule-kind allow/deny lists.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

/// Column and rule-kind admission policy.
///
/// All three lists are optional and independent; checks run in order (column
/// allow-list, kind allow-list, kind deny-list) and the first rejection wins.
#[derive(Debug, Clone, Default)]
pub struct InclusionFilter {
    column_allowlist: Option<HashSet<String>>,
    rule_kind_allowlist: Option<HashSet<String>>,
    rule_kind_denylist: Option<HashSet<String>>,
}

impl InclusionFilter {
    /// Create a filter that admits everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only admit rules whose `column` parameter (if any) is in the list.
    /// Rules without a `column` parameter are unaffected.
    #[must_use]
    pub fn allow_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_allowlist = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Only admit rules of the listed kinds.
    #[must_use]
    pub fn allow_rule_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule_kind_allowlist = Some(kinds.into_iter().map(Into::into).collect());
        self
    }

    /// Never admit rules of the listed kinds.
    #[must_use]
    pub fn deny_rule_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule_kind_denylist = Some(kinds.into_iter().map(Into::into).collect());
        self
    }

    /// Decide whether a synthesized rule may enter the output suite.
    pub fn admit(&self, rule_kind: &str, parameters: &BTreeMap<String, Value>) -> bool {
        if let Some(allowed) = &self.column_allowlist {
            if let Some(column) = parameters.get("column") {
                let in_list = column.as_str().is_some_and(|c| allowed.contains(c));
                if !in_list {
                    return false;
                }
            }
        }

        if let Some(allowed) = &self.rule_kind_allowlist {
            if !allowed.contains(rule_kind) {
                return false;
            }
        }

        if let Some(denied) = &self.rule_kind_denylist {
            if denied.contains(rule_kind) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn column_params(column: &str) -> BTreeMap<String, Value> {
        let mut params = BTreeMap::new();
        params.insert("column".to_string(), json!(column));
        params
    }

    #[test]
    fn test_default_admits_everything() {
        let filter = InclusionFilter::new();
        assert!(filter.admit("expect_column_values_to_not_be_null", &column_params("x")));
        assert!(filter.admit("expect_table_row_count_to_be_between", &BTreeMap::new()));
    }

    #[test]
    fn test_column_allowlist() {
        let filter = InclusionFilter::new().allow_columns(["x"]);
        assert!(filter.admit("expect_column_values_to_not_be_null", &column_params("x")));
        assert!(!filter.admit("expect_column_values_to_not_be_null", &column_params("y")));
        // Table-level rules carry no column and pass through.
        assert!(filter.admit("expect_table_row_count_to_be_between", &BTreeMap::new()));
    }

    #[test]
    fn test_non_string_column_is_rejected_under_allowlist() {
        let filter = InclusionFilter::new().allow_columns(["x"]);
        let mut params = BTreeMap::new();
        params.insert("column".to_string(), json!(1));
        assert!(!filter.admit("expect_column_values_to_not_be_null", &params));
    }

    #[test]
    fn test_rule_kind_allowlist() {
        let filter = InclusionFilter::new()
            .allow_rule_kinds(["expect_column_values_to_not_be_null"]);
        assert!(filter.admit("expect_column_values_to_not_be_null", &column_params("x")));
        assert!(!filter.admit("expect_column_values_to_be_unique", &column_params("x")));
    }

    #[test]
    fn test_rule_kind_denylist() {
        let filter = InclusionFilter::new()
            .deny_rule_kinds(["expect_column_values_to_not_be_null"]);
        assert!(!filter.admit("expect_column_values_to_not_be_null", &column_params("x")));
        assert!(filter.admit("expect_column_values_to_be_unique", &column_params("x")));
    }

    #[test]
    fn test_denylist_beats_allowlist() {
        let filter = InclusionFilter::new()
            .allow_rule_kinds(["expect_column_values_to_not_be_null"])
            .deny_rule_kinds(["expect_column_values_to_not_be_null"]);
        assert!(!filter.admit("expect_column_values_to_not_be_null", &column_params("x")));
    }

    #[test]
    fn test_column_check_runs_first() {
        let filter = InclusionFilter::new()
            .allow_columns(["x"])
            .allow_rule_kinds(["expect_column_values_to_not_be_null"]);
        assert!(!filter.admit("expect_column_values_to_not_be_null", &column_params("y")));
    }
}
