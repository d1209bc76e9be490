//! The multi-batch profiler: orchestrates validation, grouping, synthesis
//! and filtering into a bootstrapped rule set.
//!
//! The profiler owns no data access of its own. Producing the initial suite
//! and evaluating rules against a batch are collaborator traits supplied by
//! the caller; batches themselves are opaque handles.
//!
//! # Example
//!
//! ```ignore
//! use calibrar::MultiBatchProfiler;
//!
//! let profiler = MultiBatchProfiler::new(my_profiler, my_validator)
//!     .allow_columns(["x"])
//!     .deny_rule_kinds(["expect_column_values_to_be_unique"]);
//!
//! let suite = profiler.profile(&batches)?;
//! println!("Bootstrapped {} rules", suite.len());
//! ```

use crate::{
    error::{Error, Result},
    filter::InclusionFilter,
    group::group_measurements,
    measurement::{BatchMeasurementSet, MeasurementSink},
    policy::PolicyTable,
    rule::{Rule, RuleSet},
    synthesize::Synthesizer,
};

/// Name given to the synthesized output suite unless overridden.
pub const BOOTSTRAP_SUITE_NAME: &str = "bootstrapped_suite";

/// Produces the initial rule set from one representative batch.
///
/// Must be deterministic for a fixed batch.
pub trait SuiteProfiler<B> {
    /// Profile a single batch into a rule set.
    fn profile_one_batch(&self, batch: &B) -> Result<RuleSet>;
}

/// Evaluates a rule set against one batch.
///
/// Must return one measurement per input rule, each echoing that rule's
/// identity.
pub trait BatchValidator<B> {
    /// Validate a batch against a rule set.
    fn validate(&self, batch: &B, rule_set: &RuleSet) -> Result<BatchMeasurementSet>;
}

/// Generalizes an initial rule set across a list of batches.
///
/// Runs four sequential phases: obtain the initial suite from the first
/// batch, validate every batch against it, group the measurements by rule
/// identity, then synthesize and filter into a fresh output suite.
pub struct MultiBatchProfiler<P, V> {
    profiler: P,
    validator: V,
    synthesizer: Synthesizer,
    filter: InclusionFilter,
    suite_name: String,
}

impl<P, V> MultiBatchProfiler<P, V> {
    /// Create a profiler with the standard policy table and an open filter.
    pub fn new(profiler: P, validator: V) -> Self {
        Self {
            profiler,
            validator,
            synthesizer: Synthesizer::standard(),
            filter: InclusionFilter::new(),
            suite_name: BOOTSTRAP_SUITE_NAME.to_string(),
        }
    }

    /// Substitute the aggregation policy table.
    #[must_use]
    pub fn with_policy_table(mut self, table: PolicyTable) -> Self {
        self.synthesizer = Synthesizer::new(table);
        self
    }

    /// Substitute the whole inclusion filter.
    #[must_use]
    pub fn with_filter(mut self, filter: InclusionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Only admit rules whose `column` parameter is in the list.
    #[must_use]
    pub fn allow_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = self.filter.allow_columns(columns);
        self
    }

    /// Only admit rules of the listed kinds.
    #[must_use]
    pub fn allow_rule_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = self.filter.allow_rule_kinds(kinds);
        self
    }

    /// Never admit rules of the listed kinds.
    #[must_use]
    pub fn deny_rule_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = self.filter.deny_rule_kinds(kinds);
        self
    }

    /// Name the output suite.
    #[must_use]
    pub fn with_suite_name(mut self, name: impl Into<String>) -> Self {
        self.suite_name = name.into();
        self
    }

    /// Profile a batch list into a bootstrapped rule set.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyBatchList`] when `batches` is empty.
    /// - Any error from the collaborators, grouping or synthesis, unchanged.
    pub fn profile<B>(&self, batches: &[B]) -> Result<RuleSet>
    where
        P: SuiteProfiler<B>,
        V: BatchValidator<B>,
    {
        self.run(batches, None)
    }

    /// Like [`profile`](Self::profile), additionally appending every batch's
    /// measurement set to `sink`. Sink failures are logged and do not abort
    /// profiling.
    pub fn profile_with_sink<B>(
        &self,
        batches: &[B],
        sink: &mut dyn MeasurementSink,
    ) -> Result<RuleSet>
    where
        P: SuiteProfiler<B>,
        V: BatchValidator<B>,
    {
        self.run(batches, Some(sink))
    }

    fn run<B>(&self, batches: &[B], mut sink: Option<&mut dyn MeasurementSink>) -> Result<RuleSet>
    where
        P: SuiteProfiler<B>,
        V: BatchValidator<B>,
    {
        // Phase 1: initial suite from the representative (first) batch.
        let representative = batches.first().ok_or(Error::EmptyBatchList)?;
        let initial = self.profiler.profile_one_batch(representative)?;

        // Phase 2: validate every batch, including the representative one.
        let mut batch_sets = Vec::with_capacity(batches.len());
        for (batch_index, batch) in batches.iter().enumerate() {
            let set = self.validator.validate(batch, &initial)?;
            if let Some(sink) = sink.as_deref_mut() {
                if let Err(err) = sink.append(&set) {
                    log::warn!("measurement sink rejected batch {batch_index}: {err}");
                }
            }
            batch_sets.push(set);
        }

        // Phase 3: group by rule identity.
        let grouped = group_measurements(&initial, &batch_sets)?;

        // Phase 4: synthesize, filter, assemble.
        let mut suite = RuleSet::new(&self.suite_name);
        for group in grouped.iter() {
            let Some(parameters) = self.synthesizer.synthesize(&group.rule, &group.measurements)?
            else {
                continue;
            };
            if self.filter.admit(&group.rule.rule_kind, &parameters) {
                suite.push(Rule::new(&group.rule.rule_kind, parameters));
            }
        }

        Ok(suite)
    }
}
