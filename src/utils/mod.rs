pub mod error;
pub mod fs;

pub use error::{SolverError, SolverResult};
pub use fs::{file_stem, files_with_extension, get_extension};
