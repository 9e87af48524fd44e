//! The three comparator layers and the verdict aggregator.
//!
//! - [`cardinality`] - Layer 1, row counts
//! - [`normalize`] - Layer 2, canonical order
//! - [`partition`] - Layer 3, per-partition exact match
//! - [`verdict`] - state machine producing [`Outcome`]

pub mod cardinality;
pub mod normalize;
pub mod partition;
pub mod verdict;

pub use normalize::{normalize, normalize_with, ColumnMode, Normalizer};
pub use partition::{group, KeyOrigin, PartitionComparison, PartitionDiff, PartitionSource};
pub use verdict::{check, Diagnostics, MrupComparator, Outcome, Stage, Verdict};
