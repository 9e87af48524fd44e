//! Comparator configuration.
//!
//! Options only shape diagnostics and scheduling, plus the NULL placement of
//! the `wf_result` tiebreak. They never relax the exact-match rule.

use crate::window::NullsPlacement;
use serde::{Deserialize, Serialize};

/// Default number of sample rows reported per side of a partition diff.
pub const DEFAULT_MAX_SAMPLE_ROWS: usize = 5;

/// Partition count above which partitions are compared on the rayon pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// Options for one comparator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareOptions {
    /// Sample rows kept per side in each partition diff.
    pub max_sample_rows: usize,
    /// NULL placement of the `wf_result` tiebreak key.
    pub wf_result_nulls: NullsPlacement,
    /// Minimum number of partitions before comparison goes parallel.
    pub parallel_threshold: usize,
}

impl CompareOptions {
    /// Defaults used by the harness and the CLI.
    pub const fn standard() -> Self {
        Self {
            max_sample_rows: DEFAULT_MAX_SAMPLE_ROWS,
            wf_result_nulls: NullsPlacement::Last,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// More sample rows for manual triage.
    pub const fn verbose() -> Self {
        Self {
            max_sample_rows: 20,
            wf_result_nulls: NullsPlacement::Last,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Same options with a different sample size.
    pub const fn with_max_sample_rows(mut self, rows: usize) -> Self {
        self.max_sample_rows = rows;
        self
    }

    /// Same options with a different `wf_result` NULL placement.
    pub const fn with_wf_result_nulls(mut self, nulls: NullsPlacement) -> Self {
        self.wf_result_nulls = nulls;
        self
    }
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self::standard()
    }
}
