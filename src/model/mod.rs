//! Result model: typed cells, rows, schemas and result sets.
//!
//! Every comparison input is classified and shape-checked here, once, before
//! any comparator layer sees it. Downstream code can index rows by schema
//! position without re-validating.

pub mod cell;
pub mod types;
pub mod validation;

pub use cell::{Cell, NULL_TOKENS};
pub use types::{ResultSet, Row, Schema};
pub use validation::{validate_disjoint, validate_same_shape};
