use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};
use crate::core::{JobOutcome, JobStatus};
use crate::processing::WorkGroup;

/// Runs one work group to termination.
///
/// Implementations never fail: a job that cannot be started or exits badly is
/// reported through its [`JobStatus`].
pub trait JobLauncher: Send + Sync + 'static {
    fn run(&self, group: WorkGroup) -> impl Future<Output = JobOutcome> + Send;
}

/// Launches the solver as a child process of this one.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    work_dir: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessLauncher {
    pub fn new(work_dir: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            work_dir: work_dir.into(),
            timeout,
        }
    }

    async fn run_child(&self, group: &WorkGroup) -> JobStatus {
        let mut command = Command::new(group.program());
        command
            .args(group.args())
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        debug!("Spawning job {}: {} {}", group.index(), group.program(), group.args().join(" "));
        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to spawn {} for job {}: {}", group.program(), group.index(), e);
                return JobStatus::SpawnFailed { message: e.to_string() };
            }
        };

        let waited = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(waited) => waited,
                Err(_) => {
                    warn!("Job {} exceeded {:?}, killing it", group.index(), limit);
                    if let Err(e) = child.kill().await {
                        warn!("Failed to kill job {}: {}", group.index(), e);
                    }
                    return JobStatus::TimedOut;
                }
            },
            None => child.wait().await,
        };

        match waited {
            Ok(status) => JobStatus::Exited { code: status.code() },
            Err(e) => {
                warn!("Lost track of job {}: {}", group.index(), e);
                JobStatus::SpawnFailed { message: e.to_string() }
            }
        }
    }
}

impl JobLauncher for ProcessLauncher {
    fn run(&self, group: WorkGroup) -> impl Future<Output = JobOutcome> + Send {
        async move {
            let started = Instant::now();
            let status = self.run_child(&group).await;
            if let JobStatus::Exited { code } = &status {
                if *code != Some(0) {
                    warn!("Job {} exited with status {:?}", group.index(), code);
                }
            }
            JobOutcome {
                group_index: group.index(),
                images: group.images().to_vec(),
                status,
                elapsed_ms: started.elapsed().as_millis() as u64,
            }
        }
    }
}
