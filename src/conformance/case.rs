//! MRUP case files.
//!
//! A case holds the three captured window results for one window
//! specification plus the verdict the case expects.

use crate::compare::Verdict;
use crate::error::{ErrorCode, OracleResult};
use crate::model::{Cell, ResultSet, Row, Schema};
use crate::window::OrderSpec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// SQL text of the three queries, when the producer recorded it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseQueries {
    /// Q1, the window query over t1.
    pub t1: Option<String>,
    /// Q2, the window query over t2.
    pub t2: Option<String>,
    /// Q_union, the window query over `t1 UNION ALL t2`.
    pub union: Option<String>,
}

impl CaseQueries {
    /// Returns true if no query text is known.
    pub fn is_empty(&self) -> bool {
        self.t1.is_none() && self.t2.is_none() && self.union.is_none()
    }
}

/// One comparison case as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MrupCase {
    /// Case identifier.
    pub id: String,
    /// Column names; first is the partition key, last is `wf_result`.
    pub columns: Vec<String>,
    /// Window clause text, e.g. `OVER (PARTITION BY dept ORDER BY salary)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,
    /// Resolved ORDER BY keys, as an alternative to `window`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderSpec>,
    /// Window function, checked against the soundness constraints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    /// H(t1).
    pub t1: Vec<Vec<Cell>>,
    /// H(t2).
    pub t2: Vec<Vec<Cell>>,
    /// H(t1 ∪ t2).
    pub union: Vec<Vec<Cell>>,
    /// Verdict the case expects.
    #[serde(default)]
    pub expect: Verdict,
    /// Query text for reports.
    #[serde(default, skip_serializing_if = "CaseQueries::is_empty")]
    pub queries: CaseQueries,
}

/// Validated comparator inputs of a case.
#[derive(Debug, Clone)]
pub struct CaseInputs {
    /// H(t1).
    pub t1: ResultSet,
    /// H(t2).
    pub t2: ResultSet,
    /// H(t1 ∪ t2).
    pub union: ResultSet,
    /// Order specification.
    pub spec: OrderSpec,
}

impl MrupCase {
    /// Parse a case from JSON text.
    pub fn from_json(text: &str) -> OracleResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a case file.
    pub fn load<P: AsRef<Path>>(path: P) -> OracleResult<Self> {
        let text = fs::read_to_string(path.as_ref()).map_err(|e| {
            ErrorCode::E101_Io(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_json(&text)
    }

    /// The case schema.
    pub fn schema(&self) -> OracleResult<Schema> {
        Schema::new(self.columns.iter())
    }

    /// Resolve the order specification from `window` or `order_by`.
    pub fn order_spec(&self, schema: &Schema) -> OracleResult<OrderSpec> {
        match (&self.window, &self.order_by) {
            (Some(clause), None) => OrderSpec::from_window_clause(clause, schema),
            (None, Some(spec)) => {
                spec.validate(schema)?;
                Ok(spec.clone())
            }
            (Some(_), Some(_)) => Err(ErrorCode::E100_InvalidCase(format!(
                "case '{}' gives both window and order_by",
                self.id
            ))),
            (None, None) => Err(ErrorCode::E100_InvalidCase(format!(
                "case '{}' gives neither window nor order_by",
                self.id
            ))),
        }
    }

    /// Window clause text, rebuilt from `order_by` when no clause was given.
    pub fn window_clause(&self, schema: &Schema) -> String {
        if let Some(clause) = &self.window {
            return clause.clone();
        }
        let partition = schema.name(schema.partition_column()).unwrap_or("c0");
        let order = self
            .order_by
            .as_ref()
            .map(|spec| spec.to_sql(schema))
            .unwrap_or_default();
        if order.is_empty() {
            format!("OVER (PARTITION BY {})", partition)
        } else {
            format!("OVER (PARTITION BY {} {})", partition, order)
        }
    }

    /// Build and validate the comparator inputs.
    pub fn inputs(&self) -> OracleResult<CaseInputs> {
        let schema = self.schema()?;
        let spec = self.order_spec(&schema)?;
        let build = |rows: &[Vec<Cell>]| {
            ResultSet::new(
                schema.clone(),
                rows.iter().map(|cells| Row::new(cells.clone())).collect(),
            )
        };
        Ok(CaseInputs {
            t1: build(&self.t1)?,
            t2: build(&self.t2)?,
            union: build(&self.union)?,
            spec,
        })
    }
}
