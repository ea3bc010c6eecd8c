//! Public solve operations.
//!
//! - [`solve_field`]: Solve a batch and return the renamed outputs
//! - [`solve_field_report`]: Solve a batch and return the full [`SolveReport`](crate::SolveReport)

mod solve;

pub use solve::*;
