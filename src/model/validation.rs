//! Schema and row-shape validation.

use super::cell::Cell;
use super::types::{Row, Schema};
use crate::error::{ErrorCode, OracleResult};
use std::collections::HashSet;

/// Minimum column count: partition key plus `wf_result`.
pub const MIN_COLUMNS: usize = 2;

/// Validate column names: at least two, no duplicates (case-insensitive).
pub fn validate_columns(columns: &[String]) -> OracleResult<()> {
    if columns.len() < MIN_COLUMNS {
        return Err(ErrorCode::E200_SchemaTooNarrow(columns.len() as u64));
    }
    let mut seen = HashSet::with_capacity(columns.len());
    for column in columns {
        if !seen.insert(column.to_ascii_lowercase()) {
            return Err(ErrorCode::E201_DuplicateColumn(column.clone()));
        }
    }
    Ok(())
}

/// Validate that every row has exactly the schema's arity.
pub fn validate_rows(schema: &Schema, rows: &[Row]) -> OracleResult<()> {
    let expected = schema.len();
    for (index, row) in rows.iter().enumerate() {
        if row.len() != expected {
            return Err(ErrorCode::E202_RowArity(
                index as u64,
                expected as u64,
                row.len() as u64,
            ));
        }
    }
    Ok(())
}

/// Validate that two sides declare the same column count.
pub fn validate_same_shape(expected: &Schema, actual: &Schema) -> OracleResult<()> {
    if expected.len() != actual.len() {
        return Err(ErrorCode::E203_SchemaMismatch(
            expected.len() as u64,
            actual.len() as u64,
        ));
    }
    Ok(())
}

/// Validate that two partition key sets are disjoint.
///
/// Returns the first shared key in structural order as the error payload.
pub fn validate_disjoint<'a, A, B>(left: A, right: B) -> OracleResult<()>
where
    A: IntoIterator<Item = &'a Cell>,
    B: IntoIterator<Item = &'a Cell>,
{
    let left: std::collections::BTreeSet<&Cell> = left.into_iter().collect();
    let shared = right.into_iter().filter(|k| left.contains(k)).min();
    match shared {
        Some(key) => Err(ErrorCode::E400_PartitionOverlap(key.textual().into_owned())),
        None => Ok(()),
    }
}
