//! Reproduction bundle for cases whose verdict differs from the expectation.

use super::case::CaseQueries;
use crate::compare::{Outcome, Verdict};
use crate::error::{ErrorCode, OracleResult};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

/// Everything needed to reproduce one disagreement outside the harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReproBundle {
    /// Case identifier.
    pub test_id: String,
    /// Window clause text.
    pub window: String,
    /// Window function, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    /// Query text, when known.
    pub queries: CaseQueries,
    /// Verdict the case expected.
    pub expected: Verdict,
    /// Verdict and diagnostics the comparator produced.
    pub outcome: Outcome,
}

impl ReproBundle {
    /// Create a new repro bundle.
    pub fn new(
        test_id: String,
        window: String,
        function: Option<String>,
        queries: CaseQueries,
        expected: Verdict,
        outcome: Outcome,
    ) -> Self {
        Self {
            test_id,
            window,
            function,
            queries,
            expected,
            outcome,
        }
    }

    /// Format as an SQL-commented plain-text report.
    pub fn to_report(&self) -> String {
        let d = &self.outcome.diagnostics;
        let mut out = String::new();

        let _ = writeln!(out, "-- MRUP comparison report");
        let _ = writeln!(out, "-- H(t1 UNION ALL t2) != H(t1) UNION ALL H(t2)");
        let _ = writeln!(out, "-- Case: {}", self.test_id);
        let _ = writeln!(out, "-- Window: {}", self.window);
        if let Some(function) = &self.function {
            let _ = writeln!(out, "-- Function: {}", function);
        }
        let _ = writeln!(out, "-- Expected verdict: {}", self.expected);
        let _ = writeln!(out, "-- Actual verdict: {}", self.outcome.verdict);
        let _ = writeln!(out);

        for (label, query) in [
            ("Q1 (window function on t1)", &self.queries.t1),
            ("Q2 (window function on t2)", &self.queries.t2),
            ("Q_union (window function on t1 UNION ALL t2)", &self.queries.union),
        ] {
            if let Some(sql) = query {
                let _ = writeln!(out, "-- {}", label);
                let _ = writeln!(out, "{};", sql.trim_end().trim_end_matches(';'));
                let _ = writeln!(out);
            }
        }

        let _ = write!(out, "-- Rows:");
        if let (Some(t1), Some(t2)) = (d.t1_rows, d.t2_rows) {
            let _ = write!(out, " t1={} t2={}", t1, t2);
        }
        let _ = writeln!(
            out,
            " expected={} actual={}",
            d.expected_rows, d.actual_rows
        );
        if !d.mixed_type_columns.is_empty() {
            let _ = writeln!(
                out,
                "-- Mixed-type columns (compared as text): {}",
                d.mixed_type_columns.join(", ")
            );
        }

        for diff in &d.mismatches {
            let source = diff
                .source
                .map(|s| format!(" ({:?})", s))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "-- Partition {}{}: expected {} rows, actual {} rows, first divergence at row {}",
                diff.key, source, diff.expected_rows, diff.actual_rows, diff.first_divergence
            );
            for row in &diff.expected_sample {
                let _ = writeln!(out, "--   expected: {}", row);
            }
            for row in &diff.actual_sample {
                let _ = writeln!(out, "--   actual:   {}", row);
            }
        }

        out
    }

    /// Format as pretty-printed JSON.
    pub fn to_json(&self) -> OracleResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ErrorCode::E101_Io(format!("cannot encode repro bundle: {}", e)))
    }

    /// Write the bundle to `path`: JSON for a `.json` extension, the text
    /// report otherwise.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> OracleResult<()> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let body = if is_json {
            self.to_json()?
        } else {
            self.to_report()
        };
        std::fs::write(path, body)
            .map_err(|e| ErrorCode::E101_Io(format!("{}: {}", path.display(), e)))
    }
}
