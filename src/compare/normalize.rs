//! Layer 2: canonical row order.
//!
//! Rows are sorted by the composite key
//!
//! 1. partition column, ascending, NULL first
//! 2. each ORDER BY term in clause order, with absolute NULL placement
//! 3. `wf_result`, ascending, NULL placement from [`CompareOptions`]
//! 4. the whole row in structural order
//!
//! The last key only ties rows that are identical, so the output does not
//! depend on the input order.
//!
//! Whether a column compares numerically or by textual form is decided once
//! per column: a column that holds both numbers and text is compared
//! lexically everywhere. Deciding per pair would not be transitive
//! (`9 < 10` but `"10" < "10a" < "9"`).

use crate::config::CompareOptions;
use crate::error::OracleResult;
use crate::model::cell::cmp_numbers;
use crate::model::{Cell, ResultSet, Row};
use crate::window::{Direction, NullsPlacement, OrderSpec};
use std::cmp::Ordering;

/// How non-null cells of one column are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnMode {
    /// Numbers numerically, text by bytes. The column holds one kind only.
    Typed,
    /// Textual form of every cell. The column mixes numbers and text.
    Lexical,
}

/// Decide the comparison mode of each column over all `sides`.
///
/// Pass every result set that will be compared against each other so that
/// equal partitions sort identically on both sides.
pub fn column_modes(sides: &[&ResultSet]) -> Vec<ColumnMode> {
    let width = sides.iter().map(|s| s.schema().len()).max().unwrap_or(0);
    let mut numbers = vec![false; width];
    let mut texts = vec![false; width];

    for row in sides.iter().flat_map(|s| s.iter()) {
        for (i, cell) in row.cells().iter().enumerate() {
            match cell {
                Cell::Number(_) => numbers[i] = true,
                Cell::Text(_) => texts[i] = true,
                Cell::Null => {}
            }
        }
    }

    numbers
        .iter()
        .zip(&texts)
        .map(|(&n, &t)| {
            if n && t {
                ColumnMode::Lexical
            } else {
                ColumnMode::Typed
            }
        })
        .collect()
}

/// Sorts result sets into canonical order for one [`OrderSpec`].
#[derive(Debug, Clone)]
pub struct Normalizer<'s> {
    spec: &'s OrderSpec,
    wf_result_nulls: NullsPlacement,
    modes: Vec<ColumnMode>,
}

impl<'s> Normalizer<'s> {
    /// Build a normalizer whose column modes cover every result set in `sides`.
    ///
    /// Fails with E300 if an ORDER BY column lies outside any side's schema.
    pub fn new(
        spec: &'s OrderSpec,
        options: &CompareOptions,
        sides: &[&ResultSet],
    ) -> OracleResult<Self> {
        for side in sides {
            spec.validate(side.schema())?;
        }
        Ok(Self {
            spec,
            wf_result_nulls: options.wf_result_nulls,
            modes: column_modes(sides),
        })
    }

    /// Indices of columns that fell back to lexical comparison.
    pub fn mixed_type_columns(&self) -> Vec<usize> {
        self.modes
            .iter()
            .enumerate()
            .filter(|(_, m)| **m == ColumnMode::Lexical)
            .map(|(i, _)| i)
            .collect()
    }

    /// Return a new result set in canonical order. The input is untouched.
    pub fn normalize(&self, input: &ResultSet) -> OracleResult<ResultSet> {
        self.spec.validate(input.schema())?;
        let mut rows: Vec<Row> = input.rows().to_vec();
        rows.sort_by(|a, b| self.compare_rows(a, b));
        Ok(ResultSet::from_validated(input.schema().clone(), rows))
    }

    // Every key column is inside the row; `normalize` validated the width.
    fn compare_rows(&self, a: &Row, b: &Row) -> Ordering {
        let ordering = compare_nullable(
            a.partition_key(),
            b.partition_key(),
            NullsPlacement::First,
            Direction::Asc,
            self.mode(0),
        );
        if ordering != Ordering::Equal {
            return ordering;
        }

        for key in self.spec.keys() {
            let (x, y) = (&a.cells()[key.column], &b.cells()[key.column]);
            let ordering =
                compare_nullable(x, y, key.nulls, key.direction, self.mode(key.column));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }

        let last = a.len().saturating_sub(1);
        let ordering = compare_nullable(
            a.wf_result(),
            b.wf_result(),
            self.wf_result_nulls,
            Direction::Asc,
            self.mode(last),
        );
        if ordering != Ordering::Equal {
            return ordering;
        }

        a.cmp(b)
    }

    fn mode(&self, column: usize) -> ColumnMode {
        self.modes.get(column).copied().unwrap_or(ColumnMode::Typed)
    }
}

fn compare_nullable(
    a: &Cell,
    b: &Cell,
    nulls: NullsPlacement,
    direction: Direction,
    mode: ColumnMode,
) -> Ordering {
    let null_first = nulls == NullsPlacement::First;
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) if null_first => Ordering::Less,
        (true, false) => Ordering::Greater,
        (false, true) if null_first => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = compare_values(a, b, mode);
            match direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            }
        }
    }
}

fn compare_values(a: &Cell, b: &Cell, mode: ColumnMode) -> Ordering {
    match (mode, a, b) {
        (ColumnMode::Typed, Cell::Number(x), Cell::Number(y)) => cmp_numbers(*x, *y),
        (ColumnMode::Typed, Cell::Text(x), Cell::Text(y)) => x.cmp(y),
        _ => a.textual().cmp(&b.textual()),
    }
}

/// Normalize with default options. Column modes come from `rows` alone.
pub fn normalize(rows: &ResultSet, spec: &OrderSpec) -> OracleResult<ResultSet> {
    normalize_with(rows, spec, &CompareOptions::default())
}

/// Normalize with explicit options.
pub fn normalize_with(
    rows: &ResultSet,
    spec: &OrderSpec,
    options: &CompareOptions,
) -> OracleResult<ResultSet> {
    Normalizer::new(spec, options, &[rows])?.normalize(rows)
}
