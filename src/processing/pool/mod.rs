mod launcher;
mod process_pool;

pub use launcher::{JobLauncher, ProcessLauncher};
pub use process_pool::{ProcessPool, host_parallelism};
