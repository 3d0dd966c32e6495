//! Task Coordinator: accepts parse requests, persists them as `pending`
//! tasks and drives each one to `completed` or `failed` on a bounded pool of
//! worker tasks.
//!
//! `submit` returns as soon as the task is stored and queued. When the queue is
//! full it waits for room. Each task is owned by exactly one worker from
//! dequeue to its terminal write.

mod worker;

use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::CoordinatorSettings;
use crate::errors::CoordinatorError;
use crate::extract::ExtractorRegistry;
use crate::models::{ParseOptions, ParseTask};
use crate::store::TaskStore;

use worker::{worker_loop, ParseJob};

pub struct TaskCoordinator {
    store: Arc<dyn TaskStore>,
    registry: Arc<ExtractorRegistry>,
    settings: CoordinatorSettings,
    job_tx: async_channel::Sender<ParseJob>,
    pool_handle: JoinHandle<()>,
}

impl TaskCoordinator {
    /// Spawns `settings.workers` workers. Must be called from within a Tokio runtime.
    pub fn new(
        store: Arc<dyn TaskStore>,
        registry: Arc<ExtractorRegistry>,
        settings: CoordinatorSettings,
    ) -> Self {
        let (job_tx, job_rx) = async_channel::bounded::<ParseJob>(settings.queue_capacity.max(1));
        let workers = settings.workers.max(1);
        let timeout = settings.timeout;
        let worker_store = Arc::clone(&store);

        let pool_handle = tokio::spawn(async move {
            let handles: Vec<JoinHandle<()>> = (0..workers)
                .map(|i| {
                    tokio::spawn(worker_loop(
                        i,
                        job_rx.clone(),
                        Arc::clone(&worker_store),
                        timeout,
                    ))
                })
                .collect();
            drop(job_rx);

            for h in handles {
                let _ = h.await;
            }
        });

        info!(
            workers,
            queue_capacity = settings.queue_capacity,
            "Task coordinator started"
        );

        Self {
            store,
            registry,
            settings,
            job_tx,
            pool_handle,
        }
    }

    /// Validates the request, stores a `pending` task and queues it.
    ///
    /// The file must exist, fit under the size limit and have a registered
    /// type, and the coordinator must not be closed; otherwise an error is
    /// returned and nothing is stored.
    pub async fn submit(
        &self,
        file_path: impl AsRef<Path>,
        file_type: &str,
        resume_id: &str,
        user_id: &str,
        options: ParseOptions,
    ) -> Result<ParseTask, CoordinatorError> {
        let path = file_path.as_ref();

        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Err(CoordinatorError::FileNotFound(path.to_path_buf())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CoordinatorError::FileNotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };

        if metadata.len() > self.settings.max_file_size {
            return Err(CoordinatorError::FileTooLarge {
                size: metadata.len(),
                limit: self.settings.max_file_size,
            });
        }

        let extractor = self
            .registry
            .get(file_type)
            .ok_or_else(|| CoordinatorError::UnsupportedType(file_type.to_string()))?;

        if self.job_tx.is_closed() {
            return Err(CoordinatorError::QueueClosed);
        }

        let task = ParseTask::new(
            path.to_string_lossy(),
            file_type,
            resume_id,
            user_id,
            options,
        );
        let task = self.store.create_task(task).await?;
        info!(task_id = %task.id, resume_id, user_id, file_type, "Parse task submitted");

        let job = ParseJob {
            task: task.clone(),
            extractor,
        };
        // Closed between the check above and the send: take the task back out.
        if self.job_tx.send(job).await.is_err() {
            warn!(task_id = %task.id, "Parse queue closed, discarding task");
            self.store.delete_task(task.id).await?;
            return Err(CoordinatorError::QueueClosed);
        }

        Ok(task)
    }

    /// The last persisted state of a task.
    pub async fn get_status(&self, task_id: Uuid) -> Result<ParseTask, CoordinatorError> {
        Ok(self.store.get_task(task_id).await?)
    }

    /// A user's tasks, newest first.
    pub async fn list_by_user(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ParseTask>, CoordinatorError> {
        Ok(self
            .store
            .list_tasks_by_user(user_id, limit, offset)
            .await?)
    }

    pub async fn delete(&self, task_id: Uuid) -> Result<(), CoordinatorError> {
        self.store.delete_task(task_id).await?;
        debug!(task_id = %task_id, "Parse task deleted");
        Ok(())
    }

    pub fn supported_types(&self) -> Vec<&str> {
        self.registry.supported_types()
    }

    /// Stops accepting work. Already queued jobs still run.
    pub fn close(&self) {
        self.job_tx.close();
    }

    /// Closes the queue and waits until every queued job has finished.
    pub async fn shutdown(self) {
        self.close();
        let _ = self.pool_handle.await;
        info!("Task coordinator stopped");
    }
}
