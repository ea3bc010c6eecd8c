//! Batch orchestration: build, partition, dispatch, collect.

use serde_json::Value;
use tracing::{debug, info};
use crate::core::{SolveReport, SolveRequest, SolverConfig};
use crate::utils::SolverResult;
use super::collector::ResultCollector;
use super::command::CommandTemplate;
use super::partition::{WorkGroup, partition};
use super::pool::{JobLauncher, ProcessLauncher, ProcessPool, host_parallelism};

/// Solves batches of images with one solver process per core.
#[derive(Debug, Clone)]
pub struct FieldSolver<L = ProcessLauncher> {
    config: SolverConfig,
    launcher: L,
    parallelism: usize,
}

impl FieldSolver<ProcessLauncher> {
    /// Creates a solver that runs the configured executable as child processes.
    pub fn new(config: SolverConfig) -> SolverResult<Self> {
        let launcher = ProcessLauncher::new(config.work_dir.clone(), config.job_timeout());
        Self::with_launcher(config, launcher)
    }
}

impl<L: JobLauncher + Clone> FieldSolver<L> {
    pub fn with_launcher(config: SolverConfig, launcher: L) -> SolverResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            launcher,
            parallelism: host_parallelism(),
        })
    }

    /// Overrides the queried host parallelism. Used for both the partition
    /// count and the pool size.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Work groups a request would be split into, without running anything.
    pub fn plan(&self, request: &SolveRequest) -> Vec<WorkGroup> {
        let template = CommandTemplate::build(&self.config.executable, &self.config.policy, request);
        partition(&template, request.images(), self.parallelism)
    }

    /// Runs the whole batch and collects its outputs.
    ///
    /// Returns once every job has terminated and the working directory has
    /// been reconciled. Failed jobs only show up in `failed` and `jobs`.
    pub async fn solve(&self, request: &SolveRequest) -> SolverResult<SolveReport> {
        let groups = self.plan(request);
        info!(
            "Solving {} images in {} jobs ({} workers)",
            request.images().len(),
            groups.len(),
            self.parallelism
        );

        let pool = ProcessPool::new_with_size(self.launcher.clone(), self.parallelism);
        let jobs = pool.run_all(groups).await?;

        let collector = ResultCollector::new(&self.config);
        let outputs = collector.collect(request.suffix(), request.wcs_output()).await?;
        let failed = collector.missing(request.images(), &outputs, request.suffix());
        debug!("Batch done: {} outputs, {} failed", outputs.len(), failed.len());

        Ok(SolveReport { outputs, failed, jobs })
    }

    /// Validates a loosely typed request and solves it.
    ///
    /// Nothing is launched when validation fails.
    pub async fn solve_json(&self, params: &Value) -> SolverResult<SolveReport> {
        let request = SolveRequest::from_json(params)?;
        self.solve(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{JobOutcome, JobStatus};
    use crate::utils::SolverError;
    use serde_json::json;
    use std::future::Future;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Writes `<stem>.new` and `<stem>.wcs` for every image not named `bad*`.
    #[derive(Clone)]
    struct FakeSolve {
        dir: PathBuf,
        launches: Arc<AtomicUsize>,
    }

    impl FakeSolve {
        fn new(dir: &Path) -> Self {
            Self {
                dir: dir.to_path_buf(),
                launches: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl JobLauncher for FakeSolve {
        fn run(&self, group: WorkGroup) -> impl Future<Output = JobOutcome> + Send {
            async move {
                self.launches.fetch_add(1, Ordering::SeqCst);
                let mut code = 0;
                for image in group.images() {
                    if image.starts_with("bad") {
                        code = 1;
                        continue;
                    }
                    let stem = crate::utils::file_stem(image);
                    tokio::fs::write(self.dir.join(format!("{}.new", stem)), b"solved").await.unwrap();
                    tokio::fs::write(self.dir.join(format!("{}.wcs", stem)), b"wcs").await.unwrap();
                }
                JobOutcome {
                    group_index: group.index(),
                    images: group.images().to_vec(),
                    status: JobStatus::Exited { code: Some(code) },
                    elapsed_ms: 0,
                }
            }
        }
    }

    fn solver(dir: &Path, parallelism: usize) -> (FieldSolver<FakeSolve>, Arc<AtomicUsize>) {
        let config = SolverConfig {
            work_dir: dir.to_path_buf(),
            ..SolverConfig::default()
        };
        let launcher = FakeSolve::new(dir);
        let launches = Arc::clone(&launcher.launches);
        let solver = FieldSolver::with_launcher(config, launcher)
            .unwrap()
            .with_parallelism(parallelism);
        (solver, launches)
    }

    #[tokio::test]
    async fn two_images_on_two_workers() {
        let dir = tempfile::tempdir().unwrap();
        let (solver, launches) = solver(dir.path(), 2);
        let request = SolveRequest::batch(["a.fits", "b.fits"]).suffix("_ast").build().unwrap();

        let groups = solver.plan(&request);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].images(), ["a.fits"]);
        assert_eq!(groups[1].images(), ["b.fits"]);

        let report = solver.solve(&request).await.unwrap();
        let mut outputs = report.outputs.clone();
        outputs.sort();
        assert_eq!(outputs, vec!["a_ast.fits".to_string(), "b_ast.fits".to_string()]);
        assert!(report.failed.is_empty());
        assert_eq!(launches.load(Ordering::SeqCst), 2);
        assert!(!dir.path().join("a.wcs").exists());
    }

    #[tokio::test]
    async fn failed_middle_image_is_omitted_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let (solver, _) = solver(dir.path(), 3);
        let request = SolveRequest::batch(["a.fits", "bad.fits", "c.fits"]).build().unwrap();

        let report = solver.solve(&request).await.unwrap();

        let mut outputs = report.outputs.clone();
        outputs.sort();
        assert_eq!(outputs, vec!["a_ast.fits".to_string(), "c_ast.fits".to_string()]);
        assert_eq!(report.failed, vec!["bad.fits".to_string()]);
        assert_eq!(report.jobs.len(), 3);
        assert!(!report.jobs[1].status.is_success());
    }

    #[tokio::test]
    async fn single_image_on_eight_workers_launches_once() {
        let dir = tempfile::tempdir().unwrap();
        let (solver, launches) = solver(dir.path(), 8);
        let request = SolveRequest::builder("m42.fits").wcs_output(true).build().unwrap();

        let report = solver.solve(&request).await.unwrap();

        assert_eq!(report.jobs.len(), 1);
        assert_eq!(launches.load(Ordering::SeqCst), 1);
        assert_eq!(report.outputs, vec!["m42_ast.fits".to_string()]);
        assert!(dir.path().join("m42.wcs").exists());
    }

    #[tokio::test]
    async fn malformed_requests_never_launch() {
        let dir = tempfile::tempdir().unwrap();
        let (solver, launches) = solver(dir.path(), 4);

        for params in [
            json!({ "name": 1 }),
            json!({ "name": "a.fits", "ra": 208.9 }),
            json!({ "name": "a.fits", "dec": false }),
            json!({ "name": "a.fits", "radius": "wide" }),
            json!({ "name": "a.fits", "scale": [0.6] }),
            json!({ "name": "a.fits", "suffix": ["_x"] }),
        ] {
            let err = solver.solve_json(&params).await.unwrap_err();
            assert!(matches!(err, SolverError::InvalidParameter(_)), "{}", params);
        }
        assert_eq!(launches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let config = SolverConfig {
            executable: " ".to_string(),
            ..SolverConfig::default()
        };
        let result = FieldSolver::with_launcher(config, FakeSolve::new(dir.path()));
        assert!(matches!(result, Err(SolverError::Config(_))));
    }
}
