//! calibrar - Multi-Batch Data-Quality Rule Calibration in Pure Rust
//!
//! Takes a rule set derived from one representative batch and generalizes it
//! across every batch of the same logical dataset, so suite parameters stop
//! overfitting to the single sample they were seeded from.
//!
//! # Design Principles
//!
//! 1. **Batches are opaque** - the engine never reads tabular data; profiling
//!    and validation live behind collaborator traits
//! 2. **Pure Rust** - no Python, no FFI
//! 3. **Deterministic** - canonical parameter ordering and batch-order
//!    tie-breaking make repeated runs byte-identical
//! 4. **Closed strategy set** - aggregation policies are an exhaustive enum,
//!    not string dispatch
//!
//! # Quick Start
//!
//! ```ignore
//! use calibrar::{MultiBatchProfiler, MemorySink};
//!
//! let profiler = MultiBatchProfiler::new(my_profiler, my_validator)
//!     .allow_columns(["x", "y"]);
//!
//! let mut sink = MemorySink::new();
//! let suite = profiler.profile_with_sink(&batches, &mut sink)?;
//!
//! println!("{}", serde_json::to_string_pretty(&suite)?);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow common test patterns
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::redundant_clone,
        clippy::similar_names
    )
)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::map_unwrap_or)]

pub mod error;
pub mod filter;
pub mod group;
pub mod measurement;
pub mod policy;
pub mod profiler;
pub mod rule;
pub mod synthesize;

// Re-exports for convenience
pub use error::{Error, Result};
pub use filter::InclusionFilter;
pub use group::{group_measurements, GroupedMeasurements, RuleMeasurements};
pub use measurement::{BatchMeasurementSet, Measurement, MeasurementSink, MemorySink};
pub use policy::{AggregationStrategy, PolicyTable};
pub use profiler::{
    BatchValidator, MultiBatchProfiler, SuiteProfiler, BOOTSTRAP_SUITE_NAME,
};
pub use rule::{Rule, RuleSet};
pub use synthesize::Synthesizer;
