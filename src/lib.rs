//! MRUP Oracle - decision core of the MRUP metamorphic test oracle for SQL
//! window functions.
//!
//! MRUP checks that a window function H distributes over a union of two
//! partition-disjoint tables: H(t1 ∪ t2) = H(t1) ∪ H(t2). Given the three
//! captured results, this crate decides whether they agree.
//!
//! # Architecture
//!
//! - [`model`] - typed cells, rows, schemas and result sets
//! - [`window`] - order specifications, window clause reader, soundness constraints
//! - [`compare`] - the three comparator layers and the verdict aggregator
//! - [`conformance`] - case files, corpus runner and repro bundles
//! - [`config`] - comparator options
//! - [`error`] - error codes for input contract violations
//!
//! # Example
//!
//! ```
//! use mrup_oracle::{check, OrderSpec, ResultSet, Schema, SortKey, Verdict};
//!
//! let schema = Schema::new(["dept", "salary", "wf_result"]).unwrap();
//! let t1 = ResultSet::from_text_rows(schema.clone(), [["eng", "1", "10"], ["eng", "2", "20"]]).unwrap();
//! let t2 = ResultSet::from_text_rows(schema.clone(), [["sales", "5", "50"]]).unwrap();
//! let union = ResultSet::from_text_rows(
//!     schema,
//!     [["sales", "5", "50"], ["eng", "2", "20"], ["eng", "1", "10"]],
//! )
//! .unwrap();
//!
//! let spec = OrderSpec::new(vec![SortKey::asc(1)]);
//! let outcome = check(&t1, &t2, &union, &spec).unwrap();
//! assert_eq!(outcome.verdict, Verdict::Pass);
//! ```

// Comparator code must avoid unwrap/expect/panic in library code.
// Tests are checked separately with `cargo test`.
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

pub mod compare;
pub mod config;
pub mod conformance;
pub mod error;
pub mod model;
pub mod window;

// Re-export commonly used types
pub use compare::{check, Diagnostics, MrupComparator, Outcome, PartitionDiff, Verdict};
pub use config::CompareOptions;
pub use conformance::{BatchResult, CorpusRunner, MrupCase, MrupHarness, TestResult};
pub use error::{ErrorCode, OracleResult};
pub use model::{Cell, ResultSet, Row, Schema};
pub use window::{Direction, NullsPlacement, OrderSpec, SortKey};
