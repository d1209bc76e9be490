//! Measurement types and the measurement sink.
//!
//! A [`Measurement`] is the outcome of evaluating one rule against one batch,
//! as reported by the external validator. Each one echoes back the rule it
//! measured, a pass/fail outcome, and a mapping of named observations such as
//! `observed_value` or `unexpected_percent`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{Error, Result},
    rule::Rule,
};

/// The result of evaluating one rule against one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// The rule this measurement was produced for, echoed back by the
    /// validator. Used for identity matching during grouping.
    pub rule: Rule,
    /// Whether the batch passed the rule.
    pub success: bool,
    /// Named numeric/categorical observations.
    pub observations: BTreeMap<String, Value>,
}

impl Measurement {
    /// Create a measurement with no observations.
    pub fn new(rule: Rule, success: bool) -> Self {
        Self {
            rule,
            success,
            observations: BTreeMap::new(),
        }
    }

    /// Add or replace one observation, builder style.
    #[must_use]
    pub fn with_observation(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.observations.insert(field.into(), value.into());
        self
    }

    /// Look up a named observation field.
    ///
    /// Only top-level fields are supported; there is no nested-path lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FieldNotFound`] if the field is absent.
    pub fn observation(&self, field: &str) -> Result<&Value> {
        self.observations
            .get(field)
            .ok_or_else(|| Error::field_not_found(self.rule.rule_kind.as_str(), field))
    }
}

/// The ordered measurements produced by validating one batch against one
/// rule set — one measurement per rule, in rule set order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchMeasurementSet {
    /// Measurements, in the validated rule set's order.
    pub measurements: Vec<Measurement>,
}

impl BatchMeasurementSet {
    /// Create a measurement set from validator output.
    pub fn new(measurements: Vec<Measurement>) -> Self {
        Self { measurements }
    }

    /// Number of measurements in the set.
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    /// Returns true if the set contains no measurements.
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Iterate over the measurements in rule set order.
    pub fn iter(&self) -> std::slice::Iter<'_, Measurement> {
        self.measurements.iter()
    }

    /// Number of failed measurements.
    pub fn failure_count(&self) -> usize {
        self.measurements.iter().filter(|m| !m.success).count()
    }
}

/// Destination for per-batch validation results.
///
/// Appending is a side effect of profiling; failures are reported by the
/// orchestrator but never abort the run.
pub trait MeasurementSink {
    /// Append one batch's measurement set.
    ///
    /// # Errors
    ///
    /// Implementations should return [`Error::Sink`] on failure; the
    /// orchestrator logs it and continues.
    fn append(&mut self, set: &BatchMeasurementSet) -> Result<()>;
}

/// An in-memory sink that keeps every appended measurement set.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    sets: Vec<BatchMeasurementSet>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All appended measurement sets, in append order.
    pub fn sets(&self) -> &[BatchMeasurementSet] {
        &self.sets
    }

    /// Number of appended measurement sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns true if nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl MeasurementSink for MemorySink {
    fn append(&mut self, set: &BatchMeasurementSet) -> Result<()> {
        self.sets.push(set.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn null_check_measurement() -> Measurement {
        let rule = Rule::for_column("expect_column_values_to_not_be_null", "x");
        Measurement::new(rule, true)
            .with_observation("unexpected_percent", 0.0)
            .with_observation("unexpected_count", 0)
    }

    #[test]
    fn test_observation_lookup() {
        let m = null_check_measurement();
        assert_eq!(m.observation("unexpected_count").unwrap(), 0);
        assert_eq!(
            m.observation("unexpected_percent").unwrap().as_f64(),
            Some(0.0)
        );
    }

    #[test]
    fn test_observation_missing_field() {
        let m = null_check_measurement();
        let err = m.observation("observed_value").unwrap_err();
        match err {
            Error::FieldNotFound { rule_kind, field } => {
                assert_eq!(rule_kind, "expect_column_values_to_not_be_null");
                assert_eq!(field, "observed_value");
            }
            other => panic!("expected FieldNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_no_nested_path_lookup() {
        let rule = Rule::bare("expect_table_row_count_to_be_between");
        let m = Measurement::new(rule, true)
            .with_observation("details", serde_json::json!({"observed_value": 6}));
        assert!(m.observation("details.observed_value").is_err());
    }

    #[test]
    fn test_failure_count() {
        let pass = null_check_measurement();
        let mut fail = null_check_measurement();
        fail.success = false;
        let set = BatchMeasurementSet::new(vec![pass, fail.clone(), fail]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.failure_count(), 2);
    }

    #[test]
    fn test_memory_sink_appends() {
        let mut sink = MemorySink::new();
        assert!(sink.is_empty());

        let set = BatchMeasurementSet::new(vec![null_check_measurement()]);
        sink.append(&set).unwrap();
        sink.append(&set).unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.sets()[0], set);
    }
}
