//! Cross-batch grouping of measurements by rule identity.
//!
//! After every batch has been validated against the initial rule set, the
//! grouper partitions the resulting measurements so each distinct rule ends
//! up with one ordered list of measurements, one entry per batch.

use crate::{
    error::{Error, Result},
    measurement::{BatchMeasurementSet, Measurement},
    rule::{Rule, RuleSet},
};

/// One rule's measurements across all batches, batch order preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMeasurements {
    /// The rule these measurements belong to.
    pub rule: Rule,
    /// One measurement per batch, in batch submission order.
    pub measurements: Vec<Measurement>,
}

/// Measurements partitioned by rule identity.
///
/// Groups appear in the initial rule set's distinct-identity order. For a
/// well-formed input every batch contributes exactly one measurement per
/// group; anything else is rejected during construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupedMeasurements {
    groups: Vec<RuleMeasurements>,
}

impl GroupedMeasurements {
    /// The groups, in initial rule set order.
    pub fn groups(&self) -> &[RuleMeasurements] {
        &self.groups
    }

    /// Number of distinct rules grouped.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if no rules were grouped.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over the groups.
    pub fn iter(&self) -> std::slice::Iter<'_, RuleMeasurements> {
        self.groups.iter()
    }

    /// Look up one rule's measurements by identity.
    pub fn get(&self, rule: &Rule) -> Option<&[Measurement]> {
        let identity = rule.identity();
        self.groups
            .iter()
            .find(|g| g.rule.identity() == identity)
            .map(|g| g.measurements.as_slice())
    }
}

/// Partition per-batch measurement sets by rule identity.
///
/// For each distinct rule of `initial` (first-occurrence order), every batch
/// set must contain exactly one measurement whose echoed rule compares equal
/// to it. Identity is content based (kind plus canonical parameters), since
/// validators echo back rule instances distinct from the ones submitted.
///
/// # Errors
///
/// Returns [`Error::AmbiguousMatch`] when a batch holds zero or more than one
/// measurement for a rule — a different rule set was evaluated than was
/// requested, or the validator is non-deterministic.
pub fn group_measurements(
    initial: &RuleSet,
    batch_sets: &[BatchMeasurementSet],
) -> Result<GroupedMeasurements> {
    let mut groups: Vec<RuleMeasurements> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for rule in initial {
        let identity = rule.identity();
        if seen.contains(&identity) {
            continue;
        }
        seen.push(identity.clone());

        let mut measurements = Vec::with_capacity(batch_sets.len());
        for (batch_index, set) in batch_sets.iter().enumerate() {
            let mut matched: Option<&Measurement> = None;
            let mut found = 0usize;
            for measurement in set.iter() {
                if measurement.rule.identity() == identity {
                    found += 1;
                    matched = Some(measurement);
                }
            }
            match (found, matched) {
                (1, Some(measurement)) => measurements.push(measurement.clone()),
                _ => {
                    return Err(Error::ambiguous_match(
                        rule.rule_kind.as_str(),
                        batch_index,
                        found,
                    ))
                }
            }
        }

        groups.push(RuleMeasurements {
            rule: rule.clone(),
            measurements,
        });
    }

    Ok(GroupedMeasurements { groups })
}
