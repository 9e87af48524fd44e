//! Soundness preconditions for MRUP window specifications.
//!
//! The relation H(t1 ∪ t2) = H(t1) ∪ H(t2) only holds when every window is
//! confined to one partition and the function is deterministic. These checks
//! flag window specifications for which a mismatch would not indicate an
//! engine bug.

use super::clause::{parse_shape, FrameUnit};
use crate::error::OracleResult;
use serde::Serialize;
use std::fmt;

/// Ranking functions, which must not carry a frame clause.
pub const RANKING_FUNCTIONS: [&str; 3] = ["ROW_NUMBER", "RANK", "DENSE_RANK"];

/// Functions whose output is fully determined by the partition contents.
pub const DETERMINISTIC_FUNCTIONS: [&str; 8] = [
    "ROW_NUMBER",
    "RANK",
    "DENSE_RANK",
    "SUM",
    "AVG",
    "COUNT",
    "MIN",
    "MAX",
];

/// A single window precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Constraint {
    /// C0: PARTITION BY is present.
    PartitionPresent,
    /// C1: PARTITION BY uses exactly one column.
    SinglePartitionColumn,
    /// C2: ORDER BY only references orderable columns.
    OrderableColumns,
    /// C3: ranking functions carry no frame.
    RankingWithoutFrame,
    /// C4: RANGE frames have a single ORDER BY column.
    RangeSingleOrderKey,
    /// C5: the function is deterministic.
    Deterministic,
}

impl Constraint {
    /// All constraints in check order.
    pub const ALL: [Self; 6] = [
        Self::PartitionPresent,
        Self::SinglePartitionColumn,
        Self::OrderableColumns,
        Self::RankingWithoutFrame,
        Self::RangeSingleOrderKey,
        Self::Deterministic,
    ];

    /// Short identifier used in reports.
    pub fn id(&self) -> &'static str {
        match self {
            Self::PartitionPresent => "C0",
            Self::SinglePartitionColumn => "C1",
            Self::OrderableColumns => "C2",
            Self::RankingWithoutFrame => "C3",
            Self::RangeSingleOrderKey => "C4",
            Self::Deterministic => "C5",
        }
    }

    /// Human-readable statement of the constraint.
    pub fn description(&self) -> &'static str {
        match self {
            Self::PartitionPresent => "PARTITION BY is mandatory",
            Self::SinglePartitionColumn => "PARTITION BY uses a single column",
            Self::OrderableColumns => "ORDER BY only uses orderable columns",
            Self::RankingWithoutFrame => "No FRAME for ranking functions",
            Self::RangeSingleOrderKey => "RANGE only with single ORDER BY",
            Self::Deterministic => "Only deterministic functions",
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id(), self.description())
    }
}

/// Outcome of one constraint check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintCheck {
    /// Which constraint was checked.
    pub constraint: Constraint,
    /// Whether it holds.
    pub passed: bool,
}

/// Extract the bare function name from `SUM`, `sum(salary)` and the like.
pub fn function_name(function: &str) -> String {
    function
        .split('(')
        .next()
        .unwrap_or(function)
        .trim()
        .to_ascii_uppercase()
}

/// Check every window precondition.
///
/// `orderable` restricts the columns ORDER BY may use. With `None`, ORDER BY
/// may use anything except a PARTITION BY column.
pub fn verify_constraints(
    function: &str,
    clause: &str,
    orderable: Option<&[String]>,
) -> OracleResult<Vec<ConstraintCheck>> {
    let shape = parse_shape(clause)?;
    let function = function_name(function);
    let is_ranking = RANKING_FUNCTIONS.contains(&function.as_str());

    let checks = Constraint::ALL
        .iter()
        .map(|&constraint| {
            let passed = match constraint {
                Constraint::PartitionPresent => !shape.partition_by.is_empty(),
                Constraint::SinglePartitionColumn => shape.partition_by.len() <= 1,
                Constraint::OrderableColumns => match orderable {
                    Some(allowed) => shape.order_by.iter().all(|term| {
                        allowed.iter().any(|a| a.eq_ignore_ascii_case(&term.column))
                    }),
                    // No schema: only the partition column is known to be off limits.
                    None => shape.order_by.iter().all(|term| {
                        !shape
                            .partition_by
                            .iter()
                            .any(|p| p.eq_ignore_ascii_case(&term.column))
                    }),
                },
                Constraint::RankingWithoutFrame => !is_ranking || shape.frame.is_none(),
                Constraint::RangeSingleOrderKey => {
                    shape.frame != Some(FrameUnit::Range) || shape.order_by.len() <= 1
                }
                Constraint::Deterministic => DETERMINISTIC_FUNCTIONS.contains(&function.as_str()),
            };
            ConstraintCheck { constraint, passed }
        })
        .collect();

    Ok(checks)
}

/// Returns the constraints that failed, in check order.
pub fn violations(checks: &[ConstraintCheck]) -> Vec<Constraint> {
    checks
        .iter()
        .filter(|c| !c.passed)
        .map(|c| c.constraint)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_window() {
        let checks = verify_constraints(
            "SUM(salary)",
            "OVER (PARTITION BY dept ORDER BY salary ROWS BETWEEN 1 PRECEDING AND CURRENT ROW)",
            None,
        )
        .unwrap();
        assert_eq!(checks.len(), 6);
        assert!(violations(&checks).is_empty());
    }

    #[test]
    fn test_missing_partition() {
        let checks = verify_constraints("COUNT", "OVER (ORDER BY salary)", None).unwrap();
        assert_eq!(violations(&checks), vec![Constraint::PartitionPresent]);
    }

    #[test]
    fn test_ranking_with_frame() {
        let checks = verify_constraints(
            "ROW_NUMBER",
            "OVER (PARTITION BY dept ORDER BY age ROWS UNBOUNDED PRECEDING)",
            None,
        )
        .unwrap();
        assert_eq!(violations(&checks), vec![Constraint::RankingWithoutFrame]);
    }

    #[test]
    fn test_range_with_two_keys() {
        let checks = verify_constraints(
            "MAX",
            "OVER (PARTITION BY dept ORDER BY salary, age RANGE BETWEEN 1 PRECEDING AND 1 FOLLOWING)",
            None,
        )
        .unwrap();
        assert_eq!(violations(&checks), vec![Constraint::RangeSingleOrderKey]);
    }

    #[test]
    fn test_nondeterministic_and_orderable() {
        let allowed = vec!["salary".to_string(), "age".to_string()];
        let checks = verify_constraints(
            "NTH_VALUE(salary, 2)",
            "OVER (PARTITION BY dept ORDER BY name)",
            Some(&allowed),
        )
        .unwrap();
        assert_eq!(
            violations(&checks),
            vec![Constraint::OrderableColumns, Constraint::Deterministic]
        );
    }

    #[test]
    fn test_order_by_partition_column() {
        let checks =
            verify_constraints("SUM", "OVER (PARTITION BY dept ORDER BY DEPT)", None).unwrap();
        assert_eq!(violations(&checks), vec![Constraint::OrderableColumns]);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Constraint::PartitionPresent.to_string(),
            "[C0] PARTITION BY is mandatory"
        );
        assert_eq!(function_name("dense_rank()"), "DENSE_RANK");
    }
}
