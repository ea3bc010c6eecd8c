//! Core types and configuration.
//!
//! This module contains the fundamental types used throughout the crate:
//! - [`SolveRequest`]: A validated batch of images plus solve hints
//! - [`SolverConfig`]: Executable, working directory, timeout and policy flags
//! - [`JobOutcome`]: How one external solver job ended
//! - [`SolveReport`]: Collected outputs and failed images of a batch

mod config;
mod request;
mod types;

pub use config::{SolverConfig, SolverPolicy};
pub use request::{DEFAULT_SUFFIX, ImageArg, ScaleBounds, SolveParams, SolveRequest, SolveRequestBuilder};
pub use types::{JobOutcome, JobStatus, SolveReport};
