//! Window specification handling.
//!
//! - [`spec`] - [`OrderSpec`] and its sort keys
//! - [`clause`] - reading `OVER (...)` text into an [`OrderSpec`]
//! - [`constraints`] - MRUP soundness preconditions (C0-C5)

pub mod clause;
pub mod constraints;
pub mod spec;

pub use clause::{parse_shape, FrameUnit, OrderTerm, WindowShape};
pub use constraints::{verify_constraints, violations, Constraint, ConstraintCheck};
pub use spec::{Direction, NullsPlacement, OrderSpec, SortKey};
