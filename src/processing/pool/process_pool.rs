use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use crate::core::JobOutcome;
use crate::processing::WorkGroup;
use crate::utils::{SolverError, SolverResult};
use super::launcher::JobLauncher;

/// Number of processing units the host reports.
pub fn host_parallelism() -> usize {
    num_cpus::get().max(1)
}

/// Bounded set of concurrently running solver jobs.
///
/// A pool serves exactly one batch: [`ProcessPool::run_all`] consumes it, so
/// nothing can be submitted once the batch has been enqueued.
pub struct ProcessPool<L> {
    semaphore: Arc<Semaphore>,
    launcher: Arc<L>,
    max_size: usize,
    active_count: Arc<AtomicUsize>,
}

impl<L: JobLauncher> ProcessPool<L> {
    pub fn new_with_size(launcher: L, size: usize) -> Self {
        let size = size.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(size)),
            launcher: Arc::new(launcher),
            max_size: size,
            active_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn get_max_size(&self) -> usize {
        self.max_size
    }

    /// Runs every group and waits until all of them have terminated.
    ///
    /// Job failures do not cancel siblings and are only visible in the returned
    /// outcomes, which follow group order. Dropping the returned future aborts
    /// every job still queued or running.
    pub async fn run_all(self, groups: Vec<WorkGroup>) -> SolverResult<Vec<JobOutcome>> {
        let total = groups.len();
        info!("Dispatching {} jobs on {} workers", total, self.max_size);

        // Tasks in a JoinSet are aborted when it drops, which drops each
        // launcher future and, with it, its child process.
        let mut jobs = JoinSet::new();
        for group in groups {
            let semaphore = Arc::clone(&self.semaphore);
            let launcher = Arc::clone(&self.launcher);
            let active_count = Arc::clone(&self.active_count);
            let max_size = self.max_size;

            jobs.spawn(async move {
                let _permit = semaphore.acquire_owned().await?;
                let active = active_count.fetch_add(1, Ordering::SeqCst) + 1;
                debug!(
                    "Job {} started - Active: {}/{}, images: {}",
                    group.index(), active, max_size, group.images().len()
                );

                let outcome = launcher.run(group).await;

                active_count.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, SolverError>(outcome)
            });
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(joined) = jobs.join_next().await {
            outcomes.push(joined??);
        }
        outcomes.sort_by_key(|o| o.group_index);

        let failed = outcomes.iter().filter(|o| !o.status.is_success()).count();
        if failed > 0 {
            warn!("{} of {} jobs did not finish cleanly", failed, total);
        } else {
            debug!("All {} jobs finished cleanly", total);
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{JobStatus, SolveRequest, SolverPolicy};
    use crate::processing::{CommandTemplate, partition};
    use crate::processing::pool::ProcessLauncher;
    use std::future::Future;
    use std::time::Duration;

    /// Sleeps briefly and records how many jobs overlapped.
    #[derive(Default)]
    struct OverlapLauncher {
        running: AtomicUsize,
        peak: AtomicUsize,
        launched: AtomicUsize,
    }

    impl JobLauncher for OverlapLauncher {
        fn run(&self, group: WorkGroup) -> impl Future<Output = JobOutcome> + Send {
            async move {
                self.launched.fetch_add(1, Ordering::SeqCst);
                let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                self.running.fetch_sub(1, Ordering::SeqCst);
                let status = if group.index() == 1 {
                    JobStatus::Exited { code: Some(2) }
                } else {
                    JobStatus::Exited { code: Some(0) }
                };
                JobOutcome {
                    group_index: group.index(),
                    images: group.images().to_vec(),
                    status,
                    elapsed_ms: 20,
                }
            }
        }
    }

    fn groups(n: usize, parts: usize, program: &str) -> Vec<WorkGroup> {
        let images: Vec<String> = (0..n).map(|i| format!("{}.fits", i)).collect();
        let request = SolveRequest::batch(images.clone()).build().unwrap();
        let template = CommandTemplate::build(program, &SolverPolicy::default(), &request);
        partition(&template, &images, parts)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrency_never_exceeds_pool_size() {
        let pool = ProcessPool::new_with_size(OverlapLauncher::default(), 2);
        let launcher = Arc::clone(&pool.launcher);

        let outcomes = pool.run_all(groups(6, 6, "solve-field")).await.unwrap();

        assert_eq!(outcomes.len(), 6);
        assert_eq!(launcher.launched.load(Ordering::SeqCst), 6);
        assert!(launcher.peak.load(Ordering::SeqCst) <= 2);
        let order: Vec<usize> = outcomes.iter().map(|o| o.group_index).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn a_failing_job_does_not_stop_its_siblings() {
        let pool = ProcessPool::new_with_size(OverlapLauncher::default(), 3);
        let outcomes = pool.run_all(groups(3, 3, "solve-field")).await.unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].status.is_success());
        assert_eq!(outcomes[1].status, JobStatus::Exited { code: Some(2) });
        assert!(outcomes[2].status.is_success());
    }

    #[tokio::test]
    async fn missing_executable_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = ProcessLauncher::new(dir.path(), None);
        let pool = ProcessPool::new_with_size(launcher, 2);

        let outcomes = pool
            .run_all(groups(2, 2, "field-solver-test-no-such-binary"))
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        for outcome in outcomes {
            assert!(matches!(outcome.status, JobStatus::SpawnFailed { .. }));
        }
    }

    /// Never finishes on its own; flags when its future is dropped.
    #[derive(Default)]
    struct HangingLauncher {
        dropped: Arc<AtomicUsize>,
    }

    struct DropFlag(Arc<AtomicUsize>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl JobLauncher for HangingLauncher {
        fn run(&self, _group: WorkGroup) -> impl Future<Output = JobOutcome> + Send {
            let flag = DropFlag(Arc::clone(&self.dropped));
            async move {
                let _flag = flag;
                std::future::pending::<JobOutcome>().await
            }
        }
    }

    #[tokio::test]
    async fn dropping_the_batch_aborts_running_jobs() {
        let launcher = HangingLauncher::default();
        let dropped = Arc::clone(&launcher.dropped);
        let pool = ProcessPool::new_with_size(launcher, 3);

        let result = tokio::time::timeout(
            Duration::from_millis(50),
            pool.run_all(groups(3, 3, "solve-field")),
        )
        .await;
        assert!(result.is_err());

        for _ in 0..50 {
            if dropped.load(Ordering::SeqCst) == 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(dropped.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn pool_size_is_at_least_one() {
        let pool = ProcessPool::new_with_size(OverlapLauncher::default(), 0);
        assert_eq!(pool.get_max_size(), 1);
        assert!(host_parallelism() >= 1);
    }
}
