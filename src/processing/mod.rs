//! The solve pipeline.
//!
//! - [`CommandTemplate`]: policy flags plus request hints, shared by all groups
//! - [`partition`]: contiguous split of the batch into [`WorkGroup`]s
//! - [`ProcessPool`]: bounded concurrent execution of the groups
//! - [`ResultCollector`]: renames solved outputs and prunes WCS files
//! - [`FieldSolver`]: drives the four steps above

mod collector;
mod command;
mod partition;
pub mod pool;
mod solver;

pub use collector::ResultCollector;
pub use command::CommandTemplate;
pub use partition::{WorkGroup, partition, section_sizes};
pub use pool::{JobLauncher, ProcessLauncher, ProcessPool, host_parallelism};
pub use solver::FieldSolver;
