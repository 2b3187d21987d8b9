#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Quota allocation across strata.
pub mod allocator;
/// CLI wrapper around the sampling pipeline.
pub mod cli;
/// Centralized constants used across key building, allocation, and the CLI.
pub mod constants;
/// Unit and table types for the input population.
pub mod data;
/// Stratum key normalization and building.
pub mod key;
/// Distribution summaries of a selection.
pub mod metrics;
/// Stratified sampling orchestration.
pub mod sampler;
/// CSV input/output for unit tables.
pub mod transport;
/// Shared type aliases.
pub mod types;

mod errors;

pub use allocator::allocate_quotas;
pub use data::{Unit, UnitTable};
pub use errors::SamplerError;
pub use key::{StratumKey, StratumKeyBuilder, normalize_value};
pub use metrics::{ColumnBreakdown, ValueShare, column_breakdown};
pub use sampler::{SamplePlan, stratified_sample};
pub use types::{AttrValue, ColumnName, KeyPart, UnitId};
