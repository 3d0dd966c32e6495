//! Task Store: persistence for `ParseTask` records.
//!
//! The coordinator only ever writes whole tasks; there are no field-level
//! updates. Two implementations: an in-process map for tests and local runs,
//! and PostgreSQL for anything that should survive a restart.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::ParseTask;

pub use memory::InMemoryTaskStore;
pub use postgres::PgTaskStore;

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, task: ParseTask) -> Result<ParseTask, StoreError>;

    /// `StoreError::TaskNotFound` when no task has this id.
    async fn get_task(&self, id: Uuid) -> Result<ParseTask, StoreError>;

    /// Full-row upsert of the task as given.
    async fn update_task(&self, task: &ParseTask) -> Result<(), StoreError>;

    /// Newest first.
    async fn list_tasks_by_user(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ParseTask>, StoreError>;

    /// `StoreError::TaskNotFound` when no task has this id.
    async fn delete_task(&self, id: Uuid) -> Result<(), StoreError>;
}
