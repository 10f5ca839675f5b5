// file: src/pipeline/progress.rs
// description: progress tracking for a single best-effort stage
// reference: uses indicatif for progress bars and tracks processing metrics

use crate::models::Stage;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[cfg(test)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub succeeded: usize,
    pub failed: usize,
    pub bytes_processed: u64,
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    succeeded: Arc<AtomicUsize>,
    failed: Arc<AtomicUsize>,
    bytes_processed: Arc<AtomicU64>,
    start_time: Instant,
}

impl ProgressTracker {
    #[cfg(test)]
    pub fn hidden(stage: Stage, total: usize) -> Self {
        Self::with_options(stage, total, false, false)
    }

    pub fn with_options(stage: Stage, total: usize, visible: bool, colored: bool) -> Self {
        let multi_progress = if visible {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        let main_bar = create_progress_bar(&multi_progress, total as u64, colored);
        main_bar.set_prefix(stage.to_string());
        let detail_bar = create_detail_bar(&multi_progress);

        Self {
            main_bar,
            detail_bar,
            succeeded: Arc::new(AtomicUsize::new(0)),
            failed: Arc::new(AtomicUsize::new(0)),
            bytes_processed: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_succeeded(&self, bytes: u64) {
        self.succeeded.fetch_add(1, Ordering::SeqCst);
        self.bytes_processed.fetch_add(bytes, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
        self.main_bar.inc(1);
        self.update_detail_bar();
    }

    pub fn set_message(&self, message: String) {
        self.main_bar.set_message(message);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("done");
        self.detail_bar.finish_and_clear();
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            succeeded: self.succeeded.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            bytes_processed: self.bytes_processed.load(Ordering::SeqCst),
        }
    }

    fn update_detail_bar(&self) {
        let succeeded = self.succeeded.load(Ordering::SeqCst);
        let failed = self.failed.load(Ordering::SeqCst);
        let bytes = self.bytes_processed.load(Ordering::SeqCst);

        let message = format!(
            "Succeeded: {} | Failed: {} | Bytes: {}",
            succeeded, failed, bytes
        );

        self.detail_bar.set_message(message);
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    let style = if colored {
        ProgressStyle::default_bar()
            .template(
                "{prefix:>10.bold} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            )
            .map(|style| style.progress_chars("█▓▒░"))
    } else {
        ProgressStyle::default_bar()
            .template("{prefix:>10} {spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta}) {msg}")
            .map(|style| style.progress_chars("=>-"))
    };

    if let Ok(style) = style {
        bar.set_style(style);
    }
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    if let Ok(style) = ProgressStyle::default_bar().template("{msg}") {
        bar.set_style(style);
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_tracker_increment() {
        let tracker = ProgressTracker::hidden(Stage::Conversion, 100);

        tracker.inc_succeeded(1024);

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.succeeded, 1);
        assert_eq!(snapshot.bytes_processed, 1024);
    }

    #[test]
    fn test_progress_tracker_failures() {
        let tracker = ProgressTracker::hidden(Stage::Extraction, 100);

        tracker.inc_failed();
        tracker.inc_failed();

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.failed, 2);
        assert_eq!(snapshot.succeeded, 0);
    }
}
