//! Rule and RuleSet types for calibrar.
//!
//! A [`Rule`] is one data-quality check: a kind (e.g.
//! `expect_column_values_to_not_be_null`) plus a parameter mapping. A
//! [`RuleSet`] is a named, ordered collection of rules — the unit that gets
//! validated against a batch and the unit this crate synthesizes as output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single data-quality rule.
///
/// Two rules are identical iff both the kind and the full parameter mapping
/// compare equal by value. Rules are immutable once constructed; calibration
/// only ever builds new rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// The rule kind, e.g. `expect_table_row_count_to_be_between`.
    pub rule_kind: String,
    /// Named parameters. `BTreeMap` keeps key order canonical so identity
    /// and serialized output are deterministic.
    pub parameters: BTreeMap<String, Value>,
}

impl Rule {
    /// Create a new rule from a kind and parameter mapping.
    pub fn new(rule_kind: impl Into<String>, parameters: BTreeMap<String, Value>) -> Self {
        Self {
            rule_kind: rule_kind.into(),
            parameters,
        }
    }

    /// Create a rule with no parameters.
    pub fn bare(rule_kind: impl Into<String>) -> Self {
        Self::new(rule_kind, BTreeMap::new())
    }

    /// Create a rule scoped to a single column.
    pub fn for_column(rule_kind: impl Into<String>, column: impl Into<String>) -> Self {
        let mut parameters = BTreeMap::new();
        parameters.insert("column".to_string(), Value::String(column.into()));
        Self::new(rule_kind, parameters)
    }

    /// Add or replace one parameter, builder style.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// The column this rule targets, if it has a `column` parameter.
    pub fn column(&self) -> Option<&str> {
        self.parameters.get("column").and_then(Value::as_str)
    }

    /// Content-based identity key: rule kind plus the canonical JSON of the
    /// sorted parameter mapping. Measurements echo back rule instances that
    /// are distinct objects from the ones in the initial rule set, so
    /// grouping must key on content, never on references.
    pub fn identity(&self) -> String {
        let params = serde_json::to_string(&self.parameters).unwrap_or_default();
        format!("{}:{}", self.rule_kind, params)
    }
}

/// A named, ordered collection of rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Suite name.
    pub name: String,
    /// Rules, in definition order.
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Create an empty rule set with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Create a rule set from existing rules.
    pub fn with_rules(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    /// Append a rule.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Number of rules in the set.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the set contains no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over the rules in definition order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Rules of the given kind, in definition order.
    pub fn rules_of_kind<'a>(&'a self, rule_kind: &'a str) -> impl Iterator<Item = &'a Rule> {
        self.rules.iter().filter(move |r| r.rule_kind == rule_kind)
    }

    /// All distinct rule kinds present, first-occurrence order.
    pub fn rule_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !kinds.contains(&rule.rule_kind.as_str()) {
                kinds.push(&rule.rule_kind);
            }
        }
        kinds
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_rule_identity_is_content_based() {
        let a = Rule::for_column("expect_column_values_to_not_be_null", "x");
        let b = Rule::for_column("expect_column_values_to_not_be_null", "x");
        assert_eq!(a, b);
        assert_eq!(a.identity(), b.identity());

        let c = Rule::for_column("expect_column_values_to_not_be_null", "y");
        assert_ne!(a.identity(), c.identity());
    }

    #[test]
    fn test_rule_identity_ignores_insertion_order() {
        let a = Rule::bare("expect_table_row_count_to_be_between")
            .with_parameter("min_value", 1)
            .with_parameter("max_value", 10);
        let b = Rule::bare("expect_table_row_count_to_be_between")
            .with_parameter("max_value", 10)
            .with_parameter("min_value", 1);
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn test_rule_column_accessor() {
        let rule = Rule::for_column("expect_column_values_to_be_unique", "id");
        assert_eq!(rule.column(), Some("id"));
        assert_eq!(Rule::bare("expect_table_row_count_to_be_between").column(), None);
    }

    #[test]
    fn test_rule_set_kinds_first_occurrence_order() {
        let suite = RuleSet::with_rules(
            "test_suite",
            vec![
                Rule::for_column("expect_column_values_to_not_be_null", "x"),
                Rule::for_column("expect_column_values_to_be_unique", "x"),
                Rule::for_column("expect_column_values_to_not_be_null", "y"),
            ],
        );
        assert_eq!(
            suite.rule_kinds(),
            vec![
                "expect_column_values_to_not_be_null",
                "expect_column_values_to_be_unique",
            ]
        );
    }

    #[test]
    fn test_rule_set_json_round_trip() {
        let suite = RuleSet::with_rules(
            "round_trip",
            vec![Rule::for_column("expect_column_values_to_not_be_null", "x")
                .with_parameter("mostly", 0.95)],
        );
        let encoded = serde_json::to_string(&suite).unwrap();
        let decoded: RuleSet = serde_json::from_str(&encoded).unwrap();
        assert_eq!(suite, decoded);
    }

    #[test]
    fn test_rule_serializes_to_plain_mapping() {
        let rule = Rule::for_column("expect_column_values_to_not_be_null", "x");
        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            value,
            json!({
                "rule_kind": "expect_column_values_to_not_be_null",
                "parameters": {"column": "x"}
            })
        );
    }
}
