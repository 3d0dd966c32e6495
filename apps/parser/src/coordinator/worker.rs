use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::errors::ExtractError;
use crate::extract::Extractor;
use crate::models::{ParseTask, StructuredContent};
use crate::scoring::confidence_score;
use crate::store::TaskStore;

/// A queued task together with the extractor resolved for it at submit time.
pub(crate) struct ParseJob {
    pub task: ParseTask,
    pub extractor: Arc<dyn Extractor>,
}

/// Drains the shared queue until it is closed and empty.
pub(crate) async fn worker_loop(
    worker: usize,
    jobs: async_channel::Receiver<ParseJob>,
    store: Arc<dyn TaskStore>,
    timeout: Duration,
) {
    debug!(worker, "Parse worker started");
    while let Ok(job) = jobs.recv().await {
        run_job(job, store.as_ref(), timeout).await;
    }
    debug!(worker, "Parse worker stopped");
}

/// Takes one task from `pending` to a terminal state, persisting each step.
/// Nothing is returned to the submitter; the outcome lives in the store.
pub(crate) async fn run_job(job: ParseJob, store: &dyn TaskStore, timeout: Duration) -> ParseTask {
    let ParseJob {
        mut task,
        extractor,
    } = job;

    if !task.start_processing() {
        warn!(task_id = %task.id, status = %task.status, "Task is not pending, skipping");
        return task;
    }
    persist(store, &task).await;
    info!(task_id = %task.id, file_type = %task.file_type, "Processing parse task");

    let started = Instant::now();
    match extract(Arc::clone(&extractor), &task, timeout).await {
        Ok(mut content) => {
            let elapsed = started.elapsed();
            let metadata = &mut content.metadata;
            metadata.parse_duration = format!("{elapsed:?}");
            metadata.file_size = tokio::fs::metadata(&task.file_path)
                .await
                .map(|m| m.len())
                .unwrap_or_default();
            if metadata.parser_version.is_empty() {
                metadata.parser_version = match extractor.version() {
                    "" => env!("CARGO_PKG_VERSION"),
                    v => v,
                }
                .to_string();
            }
            content.metadata.confidence_score = confidence_score(&content);

            info!(
                task_id = %task.id,
                confidence = content.metadata.confidence_score,
                duration = ?elapsed,
                "Parse task completed"
            );
            task.complete(content);
        }
        Err(err) => {
            warn!(task_id = %task.id, error = %err, "Parse task failed");
            task.fail(err.to_string());
        }
    }

    persist(store, &task).await;
    task
}

/// Runs the extractor on the blocking pool. On timeout the blocking call is
/// left to finish on its own; its result is discarded.
async fn extract(
    extractor: Arc<dyn Extractor>,
    task: &ParseTask,
    timeout: Duration,
) -> Result<StructuredContent, ExtractError> {
    let path = PathBuf::from(&task.file_path);
    let options = task.options.clone();
    let handle = tokio::task::spawn_blocking(move || extractor.parse(&path, &options));

    match tokio::time::timeout(timeout, handle).await {
        Err(_) => Err(ExtractError::Timeout(timeout)),
        Ok(Err(join_err)) => Err(ExtractError::Aborted(join_err.to_string())),
        Ok(Ok(result)) => result,
    }
}

async fn persist(store: &dyn TaskStore, task: &ParseTask) {
    if let Err(e) = store.update_task(task).await {
        error!(task_id = %task.id, status = %task.status, error = %e, "Failed to persist task update");
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::Path;

    use super::*;
    use crate::extract::TextExtractor;
    use crate::models::{ParseOptions, TaskStatus};
    use crate::store::InMemoryTaskStore;

    struct PanickingExtractor;

    impl Extractor for PanickingExtractor {
        fn parse(
            &self,
            _path: &Path,
            _options: &ParseOptions,
        ) -> Result<StructuredContent, ExtractError> {
            panic!("decoder blew up");
        }

        fn supported_types(&self) -> &'static [&'static str] {
            &["boom"]
        }

        fn version(&self) -> &'static str {
            ""
        }
    }

    /// Returns empty content and leaves the version for the worker to stamp.
    struct UnstampedExtractor;

    impl Extractor for UnstampedExtractor {
        fn parse(
            &self,
            _path: &Path,
            _options: &ParseOptions,
        ) -> Result<StructuredContent, ExtractError> {
            Ok(StructuredContent::default())
        }

        fn supported_types(&self) -> &'static [&'static str] {
            &["stub"]
        }

        fn version(&self) -> &'static str {
            "stub-2"
        }
    }

    async fn pending_in_store(store: &InMemoryTaskStore, path: &Path) -> ParseTask {
        let task = ParseTask::new(
            path.to_string_lossy(),
            "txt",
            "resume-1",
            "user-1",
            ParseOptions::default(),
        );
        store.create_task(task).await.unwrap()
    }

    #[tokio::test]
    async fn test_successful_job_fills_metadata() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all("张三\nzhangsan@example.com\n".as_bytes()).unwrap();
        file.flush().unwrap();

        let store = InMemoryTaskStore::new();
        let task = pending_in_store(&store, file.path()).await;
        let job = ParseJob {
            task,
            extractor: Arc::new(TextExtractor::new()),
        };

        let done = run_job(job, &store, Duration::from_secs(5)).await;
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.progress, 100);

        let stored = store.get_task(done.id).await.unwrap();
        assert_eq!(stored, done);
        let metadata = &stored.result.unwrap().metadata;
        assert_eq!(metadata.confidence_score, 35);
        assert_eq!(metadata.file_size, "张三\nzhangsan@example.com\n".len() as u64);
        assert_eq!(metadata.parser_version, "text-1.0.0");
        assert!(!metadata.parse_duration.is_empty());
    }

    #[tokio::test]
    async fn test_empty_version_is_stamped_from_extractor() {
        let store = InMemoryTaskStore::new();
        let task = pending_in_store(&store, Path::new("/nonexistent/cv.stub")).await;
        let job = ParseJob {
            task,
            extractor: Arc::new(UnstampedExtractor),
        };

        let done = run_job(job, &store, Duration::from_secs(5)).await;
        assert_eq!(done.status, TaskStatus::Completed);
        let metadata = done.result.unwrap().metadata;
        assert_eq!(metadata.parser_version, "stub-2");
        assert_eq!(metadata.file_size, 0);
    }

    #[tokio::test]
    async fn test_panicking_extractor_fails_task() {
        let store = InMemoryTaskStore::new();
        let task = pending_in_store(&store, Path::new("/tmp/whatever.boom")).await;
        let job = ParseJob {
            task,
            extractor: Arc::new(PanickingExtractor),
        };

        let done = run_job(job, &store, Duration::from_secs(5)).await;
        assert_eq!(done.status, TaskStatus::Failed);
        assert_eq!(done.progress, 0);
        assert!(done
            .error_message
            .as_deref()
            .unwrap()
            .starts_with("extraction aborted"));
    }

    #[tokio::test]
    async fn test_non_pending_task_is_left_alone() {
        let store = InMemoryTaskStore::new();
        let mut task = pending_in_store(&store, Path::new("/tmp/x.txt")).await;
        task.start_processing();
        task.fail("earlier failure");
        store.update_task(&task).await.unwrap();

        let job = ParseJob {
            task: task.clone(),
            extractor: Arc::new(TextExtractor::new()),
        };
        let after = run_job(job, &store, Duration::from_secs(5)).await;
        assert_eq!(after, task);
        assert_eq!(store.get_task(task.id).await.unwrap(), task);
    }
}
