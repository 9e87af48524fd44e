//! Layer 3: per-partition grouping and exact matching.

use crate::config::CompareOptions;
use crate::model::{Cell, ResultSet, Row};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Which input table a partition key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartitionSource {
    /// Present in H(t1).
    T1,
    /// Present in H(t2).
    T2,
    /// Present in H(t1 ∪ t2) only.
    UnionOnly,
}

/// Partition keys of the two expected-side inputs.
#[derive(Debug, Clone, Default)]
pub struct KeyOrigin<'a> {
    t1: BTreeSet<&'a Cell>,
    t2: BTreeSet<&'a Cell>,
}

impl<'a> KeyOrigin<'a> {
    /// Record the partition keys of H(t1) and H(t2).
    pub fn new(t1: &'a ResultSet, t2: &'a ResultSet) -> Self {
        Self {
            t1: t1.partition_keys(),
            t2: t2.partition_keys(),
        }
    }

    /// Attribute a key to its input table.
    pub fn source(&self, key: &Cell) -> PartitionSource {
        if self.t1.contains(key) {
            PartitionSource::T1
        } else if self.t2.contains(key) {
            PartitionSource::T2
        } else {
            PartitionSource::UnionOnly
        }
    }
}

/// One partition whose rows differ between the two sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionDiff {
    /// Partition key.
    pub key: Cell,
    /// Input table the key came from, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PartitionSource>,
    /// Row count on the expected side.
    pub expected_rows: usize,
    /// Row count on the actual side.
    pub actual_rows: usize,
    /// Position of the first differing row within the partition.
    pub first_divergence: usize,
    /// Expected rows from `first_divergence` on, truncated.
    pub expected_sample: Vec<Row>,
    /// Actual rows from `first_divergence` on, truncated.
    pub actual_sample: Vec<Row>,
}

/// Result of comparing every partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionComparison {
    /// True iff no partition differs.
    pub all_match: bool,
    /// Number of distinct keys examined.
    pub partitions_compared: usize,
    /// Differing partitions in structural key order.
    pub diffs: Vec<PartitionDiff>,
}

/// Group rows by partition key, keeping their order within each group.
pub fn group(rows: &ResultSet) -> BTreeMap<&Cell, Vec<&Row>> {
    let mut groups: BTreeMap<&Cell, Vec<&Row>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.partition_key()).or_default().push(row);
    }
    groups
}

/// Compare two normalized result sets partition by partition.
pub fn compare(
    expected: &ResultSet,
    actual: &ResultSet,
    options: &CompareOptions,
) -> PartitionComparison {
    compare_partitions(expected, actual, None, options)
}

/// Like [`compare`], attributing each diff to its input table.
pub fn compare_attributed(
    expected: &ResultSet,
    actual: &ResultSet,
    origin: &KeyOrigin<'_>,
    options: &CompareOptions,
) -> PartitionComparison {
    compare_partitions(expected, actual, Some(origin), options)
}

fn compare_partitions(
    expected: &ResultSet,
    actual: &ResultSet,
    origin: Option<&KeyOrigin<'_>>,
    options: &CompareOptions,
) -> PartitionComparison {
    let expected_groups = group(expected);
    let actual_groups = group(actual);
    let keys: Vec<&Cell> = expected_groups
        .keys()
        .chain(actual_groups.keys())
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let empty: Vec<&Row> = Vec::new();
    let diff_for = |key: &&Cell| {
        let e = expected_groups.get(*key).unwrap_or(&empty);
        let a = actual_groups.get(*key).unwrap_or(&empty);
        diff_partition(key, e, a, options.max_sample_rows).map(|mut diff| {
            diff.source = origin.map(|o| o.source(key));
            diff
        })
    };

    let parallel = cfg!(feature = "parallel") && keys.len() >= options.parallel_threshold;
    debug!(partitions = keys.len(), parallel, "comparing partitions");

    #[cfg(feature = "parallel")]
    let diffs: Vec<PartitionDiff> = if parallel {
        keys.par_iter().filter_map(diff_for).collect()
    } else {
        keys.iter().filter_map(diff_for).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let diffs: Vec<PartitionDiff> = keys.iter().filter_map(diff_for).collect();

    PartitionComparison {
        all_match: diffs.is_empty(),
        partitions_compared: keys.len(),
        diffs,
    }
}

fn diff_partition(
    key: &Cell,
    expected: &[&Row],
    actual: &[&Row],
    max_samples: usize,
) -> Option<PartitionDiff> {
    let first_divergence = expected
        .iter()
        .zip(actual)
        .position(|(e, a)| e != a)
        .unwrap_or_else(|| expected.len().min(actual.len()));

    if expected.len() == actual.len() && first_divergence == expected.len() {
        return None;
    }

    trace!(key = %key, first_divergence, "partition differs");
    let sample = |rows: &[&Row]| -> Vec<Row> {
        rows.iter()
            .skip(first_divergence)
            .take(max_samples)
            .map(|r| (*r).clone())
            .collect()
    };

    Some(PartitionDiff {
        key: key.clone(),
        source: None,
        expected_rows: expected.len(),
        actual_rows: actual.len(),
        first_divergence,
        expected_sample: sample(expected),
        actual_sample: sample(actual),
    })
}
