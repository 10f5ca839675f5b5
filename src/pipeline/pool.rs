// file: src/pipeline/pool.rs
// description: bounded best-effort fan-out shared by the extraction and conversion stages
// reference: tokio blocking tasks driven through futures::StreamExt::buffer_unordered

use crate::error::Result;
use crate::models::{Stage, StageReport, TaskFailure};
use crate::pipeline::progress::ProgressTracker;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info};

/// An independent unit of work identified by a stable key.
pub trait WorkItem: Send + 'static {
    fn key(&self) -> String;

    fn weight(&self) -> u64 {
        0
    }
}

#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: usize,
    show_progress: bool,
    colored: bool,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            show_progress: false,
            colored: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool, colored: bool) -> Self {
        self.show_progress = show_progress;
        self.colored = colored;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs `task` once per item on the blocking pool, at most `workers` at a time.
    ///
    /// A failing or panicking task is logged and recorded; it never stops its
    /// siblings. Returns once every submitted task has finished.
    pub async fn run<I, T, F>(&self, stage: Stage, items: Vec<I>, task: F) -> StageReport<T>
    where
        I: WorkItem,
        T: Send + 'static,
        F: Fn(I) -> Result<T> + Send + Sync + 'static,
    {
        let mut report = StageReport::empty(stage);
        if items.is_empty() {
            info!("No work items for {} stage", stage);
            return report;
        }

        info!(
            "Dispatching {} {} tasks across {} workers",
            items.len(),
            stage,
            self.workers
        );

        let progress =
            ProgressTracker::with_options(stage, items.len(), self.show_progress, self.colored);
        let task = Arc::new(task);

        let mut outcomes = stream::iter(items.into_iter().map(|item| {
            let task = Arc::clone(&task);

            async move {
                let key = item.key();
                let weight = item.weight();
                let outcome = tokio::task::spawn_blocking(move || (*task)(item)).await;
                (key, weight, outcome)
            }
        }))
        .buffer_unordered(self.workers);

        while let Some((key, weight, outcome)) = outcomes.next().await {
            match outcome {
                Ok(Ok(output)) => {
                    debug!("Finished {} task: {}", stage, key);
                    progress.set_message(key);
                    progress.inc_succeeded(weight);
                    report.bytes_processed += weight;
                    report.outputs.push(output);
                }
                Ok(Err(e)) => {
                    error!("Error during {} of '{}': {}", stage, key, e);
                    progress.inc_failed();
                    report.failures.push(TaskFailure {
                        key,
                        error: e.to_string(),
                    });
                }
                Err(e) => {
                    error!("{} task for '{}' panicked: {}", stage, key, e);
                    progress.inc_failed();
                    report.failures.push(TaskFailure {
                        key,
                        error: format!("worker task failed: {}", e),
                    });
                }
            }
        }

        report.elapsed = progress.elapsed();
        progress.finish();

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Job(u64);

    impl WorkItem for Job {
        fn key(&self) -> String {
            format!("job-{}", self.0)
        }

        fn weight(&self) -> u64 {
            self.0
        }
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_siblings() {
        let pool = WorkerPool::new(4);
        let jobs = (1..=10).map(Job).collect();

        let report = pool
            .run(Stage::Conversion, jobs, |job: Job| {
                if job.0 == 7 {
                    Err(PipelineError::Validation("seven".to_string()))
                } else {
                    Ok(job.0 * 2)
                }
            })
            .await;

        assert_eq!(report.succeeded(), 9);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures[0].key, "job-7");
        assert_eq!(report.bytes_processed, 55 - 7);
    }

    #[tokio::test]
    async fn test_panicking_task_is_contained() {
        let pool = WorkerPool::new(2);
        let jobs = vec![Job(1), Job(2), Job(3)];

        let report = pool
            .run(Stage::Extraction, jobs, |job: Job| {
                if job.0 == 2 {
                    panic!("boom");
                }
                Ok(job.0)
            })
            .await;

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures[0].key, "job-2");
    }

    #[tokio::test]
    async fn test_every_item_runs_exactly_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::new(3);
        let jobs = (0..25).map(Job).collect();

        let seen = Arc::clone(&counter);
        let report = pool
            .run(Stage::Conversion, jobs, move |job: Job| {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(job.0)
            })
            .await;

        assert_eq!(counter.load(Ordering::SeqCst), 25);
        let mut outputs = report.outputs.clone();
        outputs.sort_unstable();
        assert_eq!(outputs, (0..25).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_empty_input_reports_nothing() {
        let pool = WorkerPool::new(2);
        let report = pool
            .run(Stage::Extraction, Vec::<Job>::new(), |job: Job| Ok(job.0))
            .await;

        assert_eq!(report.total(), 0);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_in_flight_tasks_never_exceed_workers() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::new(3);
        let jobs = (0..20).map(Job).collect();

        let (running, high_water) = (Arc::clone(&in_flight), Arc::clone(&peak));
        let report = pool
            .run(Stage::Extraction, jobs, move |job: Job| {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                high_water.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(std::time::Duration::from_millis(10));
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(job.0)
            })
            .await;

        assert_eq!(report.succeeded(), 20);
        let peak = peak.load(Ordering::SeqCst);
        assert!(peak >= 1);
        assert!(peak <= pool.workers(), "peak {} exceeded pool size", peak);
    }
}
