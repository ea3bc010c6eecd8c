//! Core types for job outcomes and batch results.

use serde::Serialize;

/// How a single solver job ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum JobStatus {
    /// The process ran to completion. `code` is `None` when it was killed by a signal.
    Exited { code: Option<i32> },
    /// The process could not be started
    SpawnFailed { message: String },
    /// The process outlived the configured timeout and was killed
    TimedOut,
}

impl JobStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Exited { code: Some(0) })
    }
}

/// Outcome of one work group, as reported by its worker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOutcome {
    /// Position of the group in partition order
    pub group_index: usize,
    /// Images handed to this job
    pub images: Vec<String>,
    pub status: JobStatus,
    /// Wall clock time from spawn to termination in milliseconds
    pub elapsed_ms: u64,
}

/// Result of a full batch.
///
/// `outputs` follows directory enumeration order, not input order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveReport {
    /// Renamed solved images, relative to the working directory
    pub outputs: Vec<String>,
    /// Input images for which no solved output was found
    pub failed: Vec<String>,
    /// One entry per work group, in partition order
    pub jobs: Vec<JobOutcome>,
}
