//! Layer 1: row-count check.

/// Returns true iff both sides have the same number of rows.
///
/// Necessary but not sufficient for a pass.
#[inline]
pub fn check(expected: usize, actual: usize) -> bool {
    expected == actual
}
