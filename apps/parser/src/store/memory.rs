use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::ParseTask;
use crate::store::TaskStore;

/// Process-local store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, ParseTask>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create_task(&self, task: ParseTask) -> Result<ParseTask, StoreError> {
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get_task(&self, id: Uuid) -> Result<ParseTask, StoreError> {
        self.tasks
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::TaskNotFound(id))
    }

    async fn update_task(&self, task: &ParseTask) -> Result<(), StoreError> {
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(())
    }

    async fn list_tasks_by_user(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ParseTask>, StoreError> {
        let mut tasks: Vec<ParseTask> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(tasks
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), StoreError> {
        self.tasks
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::TaskNotFound(id))
    }
}
