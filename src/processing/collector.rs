//! Post-batch scan of the working directory.
//!
//! Outputs are discovered by extension after every job has terminated, so a
//! solved file is picked up no matter which job produced it.

use std::collections::HashSet;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info, warn};
use crate::core::SolverConfig;
use crate::utils::{SolverError, SolverResult, file_stem, files_with_extension};

#[derive(Debug, Clone)]
pub struct ResultCollector {
    work_dir: PathBuf,
    solved_extension: String,
    wcs_extension: String,
    image_extension: String,
}

impl ResultCollector {
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            work_dir: config.work_dir.clone(),
            solved_extension: config.solved_extension.clone(),
            wcs_extension: config.wcs_extension.clone(),
            image_extension: config.image_extension.clone(),
        }
    }

    /// Name a solved artifact or input image ends up with, e.g. `m31.new` -> `m31_ast.fits`.
    pub fn output_name(&self, source: &str, suffix: &str) -> String {
        format!("{}{}.{}", file_stem(source), suffix, self.image_extension)
    }

    /// Renames every solved artifact and, unless `keep_wcs`, deletes WCS files.
    ///
    /// Returns the new names in directory enumeration order. Running it again
    /// on a directory with no solved artifacts left returns an empty list.
    pub async fn collect(&self, suffix: &str, keep_wcs: bool) -> SolverResult<Vec<String>> {
        let outputs = self.rename_solved(suffix).await?;
        if !keep_wcs {
            self.remove_wcs().await?;
        }
        info!("Collected {} solved images", outputs.len());
        Ok(outputs)
    }

    pub async fn rename_solved(&self, suffix: &str) -> SolverResult<Vec<String>> {
        let solved = files_with_extension(&self.work_dir, &self.solved_extension).await?;
        let mut outputs = Vec::with_capacity(solved.len());

        for artifact in solved {
            let target = self.output_name(&artifact.to_string_lossy(), suffix);
            let target_path = self.work_dir.join(&target);
            fs::rename(&artifact, &target_path)
                .await
                .map_err(|e| SolverError::filesystem(&artifact, e))?;
            debug!("Renamed {} -> {}", artifact.display(), target_path.display());
            outputs.push(target);
        }
        Ok(outputs)
    }

    /// Deletes every WCS file in the working directory, whichever job wrote it.
    pub async fn remove_wcs(&self) -> SolverResult<usize> {
        let wcs_files = files_with_extension(&self.work_dir, &self.wcs_extension).await?;
        let count = wcs_files.len();
        for wcs in wcs_files {
            fs::remove_file(&wcs)
                .await
                .map_err(|e| SolverError::filesystem(&wcs, e))?;
        }
        if count > 0 {
            debug!("Removed {} .{} files", count, self.wcs_extension);
        }
        Ok(count)
    }

    /// Input images that have no matching entry in `outputs`, in input order.
    pub fn missing(&self, images: &[String], outputs: &[String], suffix: &str) -> Vec<String> {
        let produced: HashSet<&str> = outputs.iter().map(String::as_str).collect();
        let missing: Vec<String> = images
            .iter()
            .filter(|image| !produced.contains(self.output_name(image, suffix).as_str()))
            .cloned()
            .collect();
        for image in &missing {
            warn!("No solution produced for {}", image);
        }
        missing
    }
}
