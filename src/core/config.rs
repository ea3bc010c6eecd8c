//! Solver configuration.
//!
//! Everything here can be loaded from a JSON file; missing fields fall back to
//! the defaults below. Host parallelism is deliberately absent: it is queried
//! at runtime.

use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::utils::{SolverError, SolverResult};

/// Policy flags passed to every solve-field invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverPolicy {
    /// Skip plot generation (`-p`)
    pub no_plots: bool,
    /// Overwrite existing outputs (`-O`)
    pub overwrite: bool,
    /// Verify existing WCS headers; `false` emits `--no-verify`
    pub verify: bool,
    /// Remove bad lines from source lists; `false` emits `--no-remove-lines`
    pub remove_lines: bool,
    /// Index depth ranges searched, e.g. `"20,30,40"`
    pub depth: String,
    /// Sort sources by brightness and background-subtracted flux (`--resort`)
    pub resort: bool,
    /// Downsample factor applied before source extraction
    pub downsample: Option<u32>,
    /// Keep the source list in a temp file (`--temp-axy`)
    pub temp_axy: bool,
}

impl Default for SolverPolicy {
    fn default() -> Self {
        Self {
            no_plots: true,
            overwrite: true,
            verify: false,
            remove_lines: false,
            depth: "20,30,40".to_string(),
            resort: true,
            downsample: Some(2),
            temp_axy: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Solver executable, resolved through `PATH` unless absolute
    pub executable: String,
    /// Directory the solver runs in and the collector scans
    pub work_dir: PathBuf,
    /// Per-job wall clock limit; `None` waits indefinitely
    pub job_timeout_secs: Option<u64>,
    /// Extension of the solver's primary output
    pub solved_extension: String,
    /// Extension of the auxiliary WCS output
    pub wcs_extension: String,
    /// Extension given to renamed outputs
    pub image_extension: String,
    pub policy: SolverPolicy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            executable: "solve-field".to_string(),
            work_dir: PathBuf::from("."),
            job_timeout_secs: None,
            solved_extension: "new".to_string(),
            wcs_extension: "wcs".to_string(),
            image_extension: "fits".to_string(),
            policy: SolverPolicy::default(),
        }
    }
}

impl SolverConfig {
    /// Loads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> SolverResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SolverError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn job_timeout(&self) -> Option<Duration> {
        self.job_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> SolverResult<()> {
        if self.executable.trim().is_empty() {
            return Err(SolverError::config("executable cannot be empty"));
        }
        if self.job_timeout_secs == Some(0) {
            return Err(SolverError::config("job_timeout_secs must be greater than 0"));
        }
        for (name, ext) in [
            ("solved_extension", &self.solved_extension),
            ("wcs_extension", &self.wcs_extension),
            ("image_extension", &self.image_extension),
        ] {
            if ext.is_empty() || ext.contains('.') || ext.contains('/') {
                return Err(SolverError::config(format!(
                    "{} must be a bare extension, got '{}'",
                    name, ext
                )));
            }
        }
        if self.solved_extension.eq_ignore_ascii_case(&self.wcs_extension) {
            return Err(SolverError::config("solved_extension and wcs_extension must differ"));
        }
        if self.policy.downsample == Some(0) {
            return Err(SolverError::config("downsample must be at least 1"));
        }
        Ok(())
    }
}
