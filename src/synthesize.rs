//! Parameter synthesis: one rule's measurements in, generalized parameters out.
//!
//! The [`Synthesizer`] applies the aggregation strategy registered for a
//! rule's kind to the measurement list that rule produced across all batches.
//! It never mutates the original rule; parameters are cloned, adjusted, and
//! returned as a fresh mapping (or `None` for skipped kinds).

// Statistical reduction over observation values
#![allow(clippy::cast_precision_loss)]

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::{
    error::{Error, Result},
    measurement::Measurement,
    policy::{AggregationStrategy, PolicyTable},
    rule::Rule,
};

/// Observation field whose values are percentages rather than fractions.
const PERCENT_FIELD: &str = "unexpected_percent";

/// Applies aggregation policies to grouped measurements.
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    table: PolicyTable,
}

impl Synthesizer {
    /// Create a synthesizer over the given policy table.
    pub fn new(table: PolicyTable) -> Self {
        Self { table }
    }

    /// Create a synthesizer over [`PolicyTable::standard`].
    pub fn standard() -> Self {
        Self::new(PolicyTable::standard())
    }

    /// The policy table in use.
    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    /// Synthesize generalized parameters for one rule from its per-batch
    /// measurements (batch order).
    ///
    /// Returns `Ok(None)` when the rule's kind is mapped to
    /// [`AggregationStrategy::Skip`] — no candidate rule is emitted for it.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownRuleKind`] when the kind has no policy.
    /// - [`Error::EmptyBatchList`] when the measurement list is empty.
    /// - [`Error::FieldNotFound`] when a measurement lacks the source field.
    /// - [`Error::NonNumericObservation`] when a numeric reduction meets a
    ///   non-numeric value.
    pub fn synthesize(
        &self,
        rule: &Rule,
        measurements: &[Measurement],
    ) -> Result<Option<BTreeMap<String, Value>>> {
        let strategy = self.table.policy(&rule.rule_kind)?;

        if *strategy == AggregationStrategy::Skip {
            return Ok(None);
        }

        if measurements.is_empty() {
            return Err(Error::EmptyBatchList);
        }

        let mut parameters = rule.parameters.clone();

        match strategy {
            AggregationStrategy::Skip => {}
            AggregationStrategy::SingleValue {
                source_field,
                target_parameter,
            } => {
                let values = extract_all(measurements, source_field)?;
                let mode = mode_value(&values);

                if target_parameter == "mostly" {
                    apply_mostly(&mut parameters, rule, source_field, mode)?;
                } else {
                    parameters.insert(target_parameter.clone(), mode.clone());
                }
            }
            AggregationStrategy::MinMaxValues { source_field } => {
                let values = extract_all(measurements, source_field)?;
                let (min, max) = min_max(&values, &rule.rule_kind, source_field)?;
                parameters.insert("min_value".to_string(), min.clone());
                parameters.insert("max_value".to_string(), max.clone());
            }
        }

        Ok(Some(parameters))
    }
}

/// Pull the source field out of every measurement, batch order preserved.
fn extract_all<'a>(measurements: &'a [Measurement], field: &str) -> Result<Vec<&'a Value>> {
    measurements.iter().map(|m| m.observation(field)).collect()
}

/// Statistical mode: most frequent value, ties broken by the value first
/// encountered in batch order.
fn mode_value<'a>(values: &[&'a Value]) -> &'a Value {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (index, value) in values.iter().enumerate() {
        let key = value.to_string();
        let entry = counts.entry(key).or_insert((0, index));
        entry.0 += 1;
    }

    let mut best: Option<(usize, usize)> = None;
    for &(count, first_index) in counts.values() {
        let better = match best {
            None => true,
            Some((best_count, best_first)) => {
                count > best_count || (count == best_count && first_index < best_first)
            }
        };
        if better {
            best = Some((count, first_index));
        }
    }

    // values is non-empty: synthesize rejects empty measurement lists
    values[best.map_or(0, |(_, first_index)| first_index)]
}

/// Invert an unexpected-fraction mode into a `mostly` tolerance.
///
/// A mode of zero unexpected observations means "require full compliance",
/// which is the rule-evaluation default: the `mostly` key is removed rather
/// than stored as 1.0.
fn apply_mostly(
    parameters: &mut BTreeMap<String, Value>,
    rule: &Rule,
    source_field: &str,
    mode: &Value,
) -> Result<()> {
    let raw = mode
        .as_f64()
        .ok_or_else(|| Error::non_numeric(rule.rule_kind.as_str(), source_field, mode))?;

    let unexpected_fraction = if source_field == PERCENT_FIELD {
        raw / 100.0
    } else {
        raw
    };
    let mostly = 1.0 - unexpected_fraction;

    if (mostly - 1.0).abs() < f64::EPSILON {
        parameters.remove("mostly");
    } else {
        parameters.insert("mostly".to_string(), Value::from(mostly));
    }
    Ok(())
}

/// Minimum and maximum by numeric comparison, returning the original values.
fn min_max<'a>(
    values: &[&'a Value],
    rule_kind: &str,
    source_field: &str,
) -> Result<(&'a Value, &'a Value)> {
    let mut min: Option<(f64, &Value)> = None;
    let mut max: Option<(f64, &Value)> = None;

    for value in values {
        let number = value
            .as_f64()
            .ok_or_else(|| Error::non_numeric(rule_kind, source_field, value))?;
        if min.is_none_or(|(m, _)| number < m) {
            min = Some((number, value));
        }
        if max.is_none_or(|(m, _)| number > m) {
            max = Some((number, value));
        }
    }

    match (min, max) {
        (Some((_, min)), Some((_, max))) => Ok((min, max)),
        _ => Err(Error::EmptyBatchList),
    }
}
