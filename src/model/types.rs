//! Result model types: Schema, Row, ResultSet.

use super::cell::Cell;
use super::validation::{validate_columns, validate_rows, validate_same_shape};
use crate::error::OracleResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Column layout shared by every result set in one comparison.
///
/// Column 0 is the partition key and the last column is `wf_result`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Schema {
    columns: Vec<String>,
}

impl Schema {
    /// Create a schema from column names.
    pub fn new<I, S>(columns: I) -> OracleResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        validate_columns(&columns)?;
        Ok(Self { columns })
    }

    /// Create a schema of `count` columns named `c0`, `c1`, ...
    pub fn anonymous(count: usize) -> OracleResult<Self> {
        Self::new((0..count).map(|i| format!("c{}", i)))
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false for a validated schema; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Resolve a column name (case-insensitive).
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Name of the column at `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    /// Index of the partition key column.
    pub fn partition_column(&self) -> usize {
        0
    }

    /// Index of the window function output column.
    pub fn wf_result_column(&self) -> usize {
        self.columns.len() - 1
    }

    /// Columns a window may order by: everything between the partition key
    /// and `wf_result`.
    pub fn orderable_columns(&self) -> &[String] {
        let end = self.columns.len().saturating_sub(1);
        self.columns.get(1..end).unwrap_or_default()
    }
}

impl TryFrom<Vec<String>> for Schema {
    type Error = crate::error::ErrorCode;

    fn try_from(columns: Vec<String>) -> Result<Self, Self::Error> {
        Schema::new(columns)
    }
}

impl From<Schema> for Vec<String> {
    fn from(schema: Schema) -> Self {
        schema.columns
    }
}

/// One result tuple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(pub Vec<Cell>);

impl Row {
    /// Create a row from cells.
    pub fn new(cells: Vec<Cell>) -> Self {
        Row(cells)
    }

    /// Create a row by classifying raw text tokens.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Row(tokens
            .into_iter()
            .map(|t| Cell::classify(t.as_ref()))
            .collect())
    }

    /// Cells in column order.
    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cell at `index`.
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.0.get(index)
    }

    /// The partition key (column 0).
    ///
    /// # Panics
    ///
    /// Panics on an empty row. Rows inside a [`ResultSet`] always have at
    /// least two cells.
    pub fn partition_key(&self) -> &Cell {
        &self.0[0]
    }

    /// The window function output (last column).
    ///
    /// # Panics
    ///
    /// Panics on an empty row.
    pub fn wf_result(&self) -> &Cell {
        &self.0[self.0.len() - 1]
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, cell) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", cell)?;
        }
        f.write_str(")")
    }
}

/// An immutable, schema-checked sequence of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    schema: Schema,
    rows: Vec<Row>,
}

impl ResultSet {
    /// Build a result set, rejecting rows whose arity differs from the schema.
    pub fn new(schema: Schema, rows: Vec<Row>) -> OracleResult<Self> {
        validate_rows(&schema, &rows)?;
        Ok(Self { schema, rows })
    }

    /// Build a result set from raw text tokens.
    pub fn from_text_rows<R, I, S>(schema: Schema, rows: R) -> OracleResult<Self>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows.into_iter().map(Row::from_tokens).collect();
        Self::new(schema, rows)
    }

    /// An empty result set.
    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Rows already validated against `schema`.
    pub(crate) fn from_validated(schema: Schema, rows: Vec<Row>) -> Self {
        Self { schema, rows }
    }

    /// Schema shared by every row.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Rows in their current order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over rows.
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Concatenate two result sets over the same schema shape.
    ///
    /// This is how the expected side H(t1) ∪ H(t2) is formed.
    pub fn concat(&self, other: &ResultSet) -> OracleResult<ResultSet> {
        validate_same_shape(&self.schema, &other.schema)?;
        let mut rows = Vec::with_capacity(self.rows.len() + other.rows.len());
        rows.extend(self.rows.iter().cloned());
        rows.extend(other.rows.iter().cloned());
        Ok(Self::from_validated(self.schema.clone(), rows))
    }

    /// Distinct partition keys in structural order.
    pub fn partition_keys(&self) -> BTreeSet<&Cell> {
        self.rows.iter().map(Row::partition_key).collect()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
