//! Order specification derived from a window's PARTITION BY / ORDER BY.

use crate::error::{ErrorCode, OracleResult};
use crate::model::Schema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sort direction of one ORDER BY term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Ascending (the SQL default).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// Where NULLs sort relative to non-null values.
///
/// Placement is absolute: `First` puts NULLs first under both ASC and DESC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NullsPlacement {
    /// NULLS FIRST.
    First,
    /// NULLS LAST (the default when the clause says nothing).
    #[default]
    Last,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "ASC"),
            Self::Desc => write!(f, "DESC"),
        }
    }
}

impl fmt::Display for NullsPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "NULLS FIRST"),
            Self::Last => write!(f, "NULLS LAST"),
        }
    }
}

impl FromStr for Direction {
    type Err = ErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            other => Err(ErrorCode::E302_MalformedWindow(format!(
                "unknown direction '{}'",
                other
            ))),
        }
    }
}

impl FromStr for NullsPlacement {
    type Err = ErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        match upper.strip_prefix("NULLS ").unwrap_or(&upper).trim() {
            "FIRST" => Ok(Self::First),
            "LAST" => Ok(Self::Last),
            _ => Err(ErrorCode::E302_MalformedWindow(format!(
                "unknown null placement '{}'",
                s
            ))),
        }
    }
}

/// One ORDER BY term resolved to a column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    /// Column index in the result schema.
    pub column: usize,
    /// Sort direction.
    #[serde(default)]
    pub direction: Direction,
    /// NULL placement.
    #[serde(default)]
    pub nulls: NullsPlacement,
}

impl SortKey {
    /// Ascending key with the default null placement.
    pub fn asc(column: usize) -> Self {
        Self {
            column,
            direction: Direction::Asc,
            nulls: NullsPlacement::default(),
        }
    }

    /// Descending key with the default null placement.
    pub fn desc(column: usize) -> Self {
        Self {
            column,
            direction: Direction::Desc,
            nulls: NullsPlacement::default(),
        }
    }

    /// Same key with NULLS FIRST.
    pub fn nulls_first(mut self) -> Self {
        self.nulls = NullsPlacement::First;
        self
    }

    /// Same key with NULLS LAST.
    pub fn nulls_last(mut self) -> Self {
        self.nulls = NullsPlacement::Last;
        self
    }
}

/// Partition column (always column 0) plus the ORDER BY terms in clause order.
///
/// Built once per window specification and shared read-only by both sides
/// of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderSpec {
    keys: Vec<SortKey>,
}

impl OrderSpec {
    /// Create a spec from ORDER BY keys.
    pub fn new(keys: Vec<SortKey>) -> Self {
        Self { keys }
    }

    /// A window with PARTITION BY and no ORDER BY.
    pub fn partition_only() -> Self {
        Self::default()
    }

    /// ORDER BY keys in clause order.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Index of the partition column.
    pub fn partition_column(&self) -> usize {
        0
    }

    /// Check that every key resolves inside a schema of `width` columns.
    pub fn validate_width(&self, width: usize) -> OracleResult<()> {
        for key in &self.keys {
            if key.column >= width {
                return Err(ErrorCode::E300_UnresolvedOrderColumn(
                    key.column as u64,
                    width as u64,
                ));
            }
        }
        Ok(())
    }

    /// Check that every key resolves inside `schema`.
    pub fn validate(&self, schema: &Schema) -> OracleResult<()> {
        self.validate_width(schema.len())
    }

    /// Render as SQL using the schema's column names.
    ///
    /// Returns an empty string for a partition-only spec.
    pub fn to_sql(&self, schema: &Schema) -> String {
        if self.keys.is_empty() {
            return String::new();
        }
        let terms: Vec<String> = self
            .keys
            .iter()
            .map(|k| {
                let name = schema
                    .name(k.column)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{}", k.column));
                format!("{} {} {}", name, k.direction, k.nulls)
            })
            .collect();
        format!("ORDER BY {}", terms.join(", "))
    }
}
