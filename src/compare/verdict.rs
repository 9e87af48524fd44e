//! Verdict aggregation over the three comparator layers.
//!
//! ```text
//! INIT -> CARDINALITY_CHECKED -> FAIL_CARDINALITY
//!                             -> NORMALIZED -> PARTITION_COMPARED -> PASS | FAIL_PARTITION_MISMATCH
//! ```

use super::cardinality;
use super::normalize::Normalizer;
use super::partition::{compare, compare_attributed, KeyOrigin, PartitionComparison, PartitionDiff};
use crate::config::CompareOptions;
use crate::error::{ErrorCode, OracleResult};
use crate::model::{validate_disjoint, validate_same_shape, Cell, ResultSet};
use crate::window::OrderSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Final decision of one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// H(t1 ∪ t2) equals H(t1) ∪ H(t2).
    #[default]
    Pass,
    /// Row counts differ.
    FailCardinality,
    /// Counts agree but at least one partition differs.
    FailPartitionMismatch,
}

impl Verdict {
    /// Returns true for [`Verdict::Pass`].
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::FailCardinality => "FAIL_CARDINALITY",
            Verdict::FailPartitionMismatch => "FAIL_PARTITION_MISMATCH",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = ErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PASS" => Ok(Verdict::Pass),
            "FAIL_CARDINALITY" => Ok(Verdict::FailCardinality),
            "FAIL_PARTITION_MISMATCH" => Ok(Verdict::FailPartitionMismatch),
            _ => Err(ErrorCode::E100_InvalidCase(format!("unknown verdict '{}'", s))),
        }
    }
}

/// Comparator state machine stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// Inputs validated, nothing compared yet.
    Init,
    /// Layer 1 done.
    CardinalityChecked,
    /// Layer 2 done.
    Normalized,
    /// Layer 3 done.
    PartitionCompared,
}

/// Evidence attached to a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Rows in H(t1), when the expected side was given as two tables.
    pub t1_rows: Option<usize>,
    /// Rows in H(t2), when the expected side was given as two tables.
    pub t2_rows: Option<usize>,
    /// Rows on the expected side.
    pub expected_rows: usize,
    /// Rows on the actual side, H(t1 ∪ t2).
    pub actual_rows: usize,
    /// Last stage reached.
    pub stage: Stage,
    /// Distinct partition keys examined.
    pub partitions_compared: usize,
    /// Differing partitions in structural key order.
    pub mismatches: Vec<PartitionDiff>,
    /// Columns compared by textual form because they mix numbers and text.
    pub mixed_type_columns: Vec<String>,
}

/// Verdict plus diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// The decision.
    pub verdict: Verdict,
    /// Supporting evidence.
    pub diagnostics: Diagnostics,
}

impl Outcome {
    /// Returns true for a pass.
    pub fn is_pass(&self) -> bool {
        self.verdict.is_pass()
    }

    /// Keys of the differing partitions.
    pub fn mismatched_keys(&self) -> Vec<&Cell> {
        self.diagnostics.mismatches.iter().map(|d| &d.key).collect()
    }
}

/// Three-layer MRUP comparator.
///
/// Holds only options. Each call is independent and reads its inputs without
/// retaining them.
#[derive(Debug, Clone, Copy, Default)]
pub struct MrupComparator {
    options: CompareOptions,
}

impl MrupComparator {
    /// Create a comparator.
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Check H(t1 ∪ t2) = H(t1) ∪ H(t2).
    ///
    /// Input contract violations are errors: differing column counts (E203),
    /// an ORDER BY column outside the schema (E300), or a partition key shared
    /// by `t1` and `t2` (E400). Mismatches are verdicts.
    pub fn check(
        &self,
        t1: &ResultSet,
        t2: &ResultSet,
        union: &ResultSet,
        spec: &OrderSpec,
    ) -> OracleResult<Outcome> {
        validate_same_shape(t1.schema(), t2.schema())?;
        validate_same_shape(t1.schema(), union.schema())?;
        spec.validate(t1.schema())?;
        validate_disjoint(t1.partition_keys(), t2.partition_keys())?;

        let expected = t1.concat(t2)?;
        let origin = KeyOrigin::new(t1, t2);
        let mut outcome = self.evaluate(&expected, union, spec, Some(&origin))?;
        outcome.diagnostics.t1_rows = Some(t1.len());
        outcome.diagnostics.t2_rows = Some(t2.len());
        Ok(outcome)
    }

    /// Compare an already combined expected side against the actual side.
    ///
    /// No disjointness check and no source attribution.
    pub fn check_combined(
        &self,
        expected: &ResultSet,
        actual: &ResultSet,
        spec: &OrderSpec,
    ) -> OracleResult<Outcome> {
        validate_same_shape(expected.schema(), actual.schema())?;
        spec.validate(expected.schema())?;
        self.evaluate(expected, actual, spec, None)
    }

    fn evaluate(
        &self,
        expected: &ResultSet,
        actual: &ResultSet,
        spec: &OrderSpec,
        origin: Option<&KeyOrigin<'_>>,
    ) -> OracleResult<Outcome> {
        let mut diagnostics = Diagnostics {
            t1_rows: None,
            t2_rows: None,
            expected_rows: expected.len(),
            actual_rows: actual.len(),
            stage: Stage::Init,
            partitions_compared: 0,
            mismatches: Vec::new(),
            mixed_type_columns: Vec::new(),
        };
        debug!(stage = ?diagnostics.stage, expected = expected.len(), actual = actual.len());

        let counts_match = cardinality::check(expected.len(), actual.len());
        diagnostics.stage = Stage::CardinalityChecked;
        debug!(stage = ?diagnostics.stage, counts_match);
        if !counts_match {
            warn!(
                expected = expected.len(),
                actual = actual.len(),
                "verdict FAIL_CARDINALITY"
            );
            return Ok(Outcome {
                verdict: Verdict::FailCardinality,
                diagnostics,
            });
        }

        let normalizer = Normalizer::new(spec, &self.options, &[expected, actual])?;
        let schema = expected.schema();
        diagnostics.mixed_type_columns = normalizer
            .mixed_type_columns()
            .into_iter()
            .map(|i| schema.name(i).map(str::to_string).unwrap_or_else(|| format!("#{}", i)))
            .collect();
        if !diagnostics.mixed_type_columns.is_empty() {
            warn!(
                columns = ?diagnostics.mixed_type_columns,
                "numbers and text in one column, comparing by textual form"
            );
        }
        let expected = normalizer.normalize(expected)?;
        let actual = normalizer.normalize(actual)?;
        diagnostics.stage = Stage::Normalized;
        debug!(stage = ?diagnostics.stage);

        let PartitionComparison {
            all_match,
            partitions_compared,
            diffs,
        } = match origin {
            Some(origin) => compare_attributed(&expected, &actual, origin, &self.options),
            None => compare(&expected, &actual, &self.options),
        };
        diagnostics.stage = Stage::PartitionCompared;
        diagnostics.partitions_compared = partitions_compared;
        diagnostics.mismatches = diffs;
        debug!(stage = ?diagnostics.stage, partitions_compared);

        let verdict = if all_match {
            debug!("verdict PASS");
            Verdict::Pass
        } else {
            warn!(
                mismatches = diagnostics.mismatches.len(),
                first_key = ?diagnostics.mismatches.first().map(|d| d.key.to_string()),
                "verdict FAIL_PARTITION_MISMATCH"
            );
            Verdict::FailPartitionMismatch
        };

        Ok(Outcome {
            verdict,
            diagnostics,
        })
    }
}

/// Check with default options.
pub fn check(
    t1: &ResultSet,
    t2: &ResultSet,
    union: &ResultSet,
    spec: &OrderSpec,
) -> OracleResult<Outcome> {
    MrupComparator::default().check(t1, t2, union, spec)
}
