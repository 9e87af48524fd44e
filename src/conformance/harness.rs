//! Case harness: runs MRUP cases and checks verdicts against expectations.

use super::case::MrupCase;
use super::repro::ReproBundle;
use crate::compare::{MrupComparator, Outcome, Verdict};
use crate::config::CompareOptions;
use crate::error::OracleResult;
use crate::window::{verify_constraints, violations};
use serde::Serialize;
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Result of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestResult {
    /// The comparator produced the expected verdict.
    Pass,
    /// The comparator produced a different verdict.
    Fail {
        /// Verdict the case expected.
        expected: Verdict,
        /// Verdict the comparator produced.
        actual: Verdict,
        /// Reproduction bundle.
        repro: Box<ReproBundle>,
    },
    /// The case could not be judged: invalid input or an unsound window.
    Inconclusive {
        /// Why.
        message: String,
    },
}

impl TestResult {
    /// Returns true if this is a passing result.
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Returns true if this is a failing result.
    pub fn is_fail(&self) -> bool {
        matches!(self, Self::Fail { .. })
    }

    /// Returns true if the case could not be judged.
    pub fn is_inconclusive(&self) -> bool {
        matches!(self, Self::Inconclusive { .. })
    }
}

/// A case identifier with its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseResult {
    /// Case identifier.
    pub id: String,
    /// Result.
    pub result: TestResult,
}

/// Results from running a batch of cases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    /// Cases whose verdict matched the expectation.
    pub passed: usize,
    /// Cases whose verdict differed.
    pub failed: usize,
    /// Cases that could not be judged.
    pub inconclusive: usize,
    /// Per-case results in input order.
    pub details: Vec<CaseResult>,
}

impl BatchResult {
    /// Create a new empty batch result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one case result.
    pub fn record(&mut self, case: CaseResult) {
        match &case.result {
            TestResult::Pass => self.passed += 1,
            TestResult::Fail { .. } => self.failed += 1,
            TestResult::Inconclusive { .. } => self.inconclusive += 1,
        }
        self.details.push(case);
    }

    /// Total number of cases.
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.inconclusive
    }

    /// Returns true if every case matched its expectation.
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.inconclusive == 0
    }

    /// Failing cases only.
    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.details.iter().filter(|c| c.result.is_fail())
    }

    /// One-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} inconclusive (total: {})",
            self.passed,
            self.failed,
            self.inconclusive,
            self.total()
        )
    }
}

impl FromIterator<CaseResult> for BatchResult {
    fn from_iter<I: IntoIterator<Item = CaseResult>>(iter: I) -> Self {
        let mut batch = Self::new();
        for case in iter {
            batch.record(case);
        }
        batch
    }
}

/// Runs [`MrupCase`]s through an [`MrupComparator`].
#[derive(Debug, Clone, Default)]
pub struct MrupHarness {
    comparator: MrupComparator,
    orderable: Option<Vec<String>>,
}

impl MrupHarness {
    /// Create a harness with the given options.
    pub fn new(options: CompareOptions) -> Self {
        Self {
            comparator: MrupComparator::new(options),
            orderable: None,
        }
    }

    /// Restrict ORDER BY to these columns when checking window constraints.
    ///
    /// Without this, each case allows the columns between its partition key
    /// and `wf_result`.
    pub fn with_orderable_columns(mut self, columns: Vec<String>) -> Self {
        self.orderable = Some(columns);
        self
    }

    /// Options in use.
    pub fn options(&self) -> &CompareOptions {
        self.comparator.options()
    }

    /// Compare a case without judging it against its expectation.
    pub fn evaluate(&self, case: &MrupCase) -> OracleResult<Outcome> {
        let inputs = case.inputs()?;
        self.comparator
            .check(&inputs.t1, &inputs.t2, &inputs.union, &inputs.spec)
    }

    /// Run one case.
    pub fn run_case(&self, case: &MrupCase) -> CaseResult {
        let result = self.judge(case);
        match &result {
            TestResult::Pass => debug!(case = %case.id, "case passed"),
            TestResult::Fail {
                expected, actual, ..
            } => warn!(case = %case.id, %expected, %actual, "case failed"),
            TestResult::Inconclusive { message } => {
                warn!(case = %case.id, %message, "case inconclusive")
            }
        }
        CaseResult {
            id: case.id.clone(),
            result,
        }
    }

    fn judge(&self, case: &MrupCase) -> TestResult {
        let schema = match case.schema() {
            Ok(schema) => schema,
            Err(e) => return inconclusive(e),
        };
        let window = case.window_clause(&schema);

        if let Some(function) = &case.function {
            let orderable = self
                .orderable
                .as_deref()
                .unwrap_or_else(|| schema.orderable_columns());
            match verify_constraints(function, &window, Some(orderable)) {
                Ok(checks) => {
                    let failed = violations(&checks);
                    if !failed.is_empty() {
                        let ids: Vec<&str> = failed.iter().map(|c| c.id()).collect();
                        return TestResult::Inconclusive {
                            message: format!("unsound window: {}", ids.join(", ")),
                        };
                    }
                }
                Err(e) => return inconclusive(e),
            }
        }

        let outcome = match self.evaluate(case) {
            Ok(outcome) => outcome,
            Err(e) => return inconclusive(e),
        };

        if outcome.verdict == case.expect {
            return TestResult::Pass;
        }
        let actual = outcome.verdict;
        TestResult::Fail {
            expected: case.expect,
            actual,
            repro: Box::new(ReproBundle::new(
                case.id.clone(),
                window,
                case.function.clone(),
                case.queries.clone(),
                case.expect,
                outcome,
            )),
        }
    }

    /// Run a batch of cases. Results keep input order.
    pub fn run_batch(&self, cases: &[MrupCase]) -> BatchResult {
        #[cfg(feature = "parallel")]
        let results: Vec<CaseResult> = cases.par_iter().map(|c| self.run_case(c)).collect();
        #[cfg(not(feature = "parallel"))]
        let results: Vec<CaseResult> = cases.iter().map(|c| self.run_case(c)).collect();

        let batch: BatchResult = results.into_iter().collect();
        info!(summary = %batch.summary(), "batch finished");
        batch
    }
}

fn inconclusive(error: crate::error::ErrorCode) -> TestResult {
    TestResult::Inconclusive {
        message: format!("{} (code {})", error, error.code()),
    }
}
