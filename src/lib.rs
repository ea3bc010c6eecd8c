// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod processing;
pub mod commands;

// Public exports for external consumers
pub use crate::core::{DEFAULT_SUFFIX, JobOutcome, JobStatus, ScaleBounds, SolveReport, SolveRequest, SolverConfig, SolverPolicy};
pub use processing::{FieldSolver, JobLauncher, ProcessLauncher, WorkGroup};
pub use utils::{SolverError, SolverResult};
pub use commands::*;
