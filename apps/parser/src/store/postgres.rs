use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::{ParseTask, TaskStatus};
use crate::store::TaskStore;

const INSERT_TASK: &str = r#"
    INSERT INTO parse_tasks
        (id, resume_id, user_id, file_path, file_type, status, progress,
         result, error_message, options, created_at, updated_at, completed_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
"#;

const UPSERT_TASK: &str = r#"
    INSERT INTO parse_tasks
        (id, resume_id, user_id, file_path, file_type, status, progress,
         result, error_message, options, created_at, updated_at, completed_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
    ON CONFLICT (id) DO UPDATE SET
        resume_id = EXCLUDED.resume_id,
        user_id = EXCLUDED.user_id,
        file_path = EXCLUDED.file_path,
        file_type = EXCLUDED.file_type,
        status = EXCLUDED.status,
        progress = EXCLUDED.progress,
        result = EXCLUDED.result,
        error_message = EXCLUDED.error_message,
        options = EXCLUDED.options,
        updated_at = EXCLUDED.updated_at,
        completed_at = EXCLUDED.completed_at
"#;

/// One `parse_tasks` row. JSON columns stay as `Value` until converted.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ParseTaskRow {
    pub id: Uuid,
    pub resume_id: String,
    pub user_id: String,
    pub file_path: String,
    pub file_type: String,
    pub status: String,
    pub progress: i32,
    pub result: Option<Value>,
    pub error_message: Option<String>,
    pub options: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ParseTaskRow {
    pub fn from_task(task: &ParseTask) -> Result<Self, StoreError> {
        Ok(Self {
            id: task.id,
            resume_id: task.resume_id.clone(),
            user_id: task.user_id.clone(),
            file_path: task.file_path.clone(),
            file_type: task.file_type.clone(),
            status: task.status.as_str().to_string(),
            progress: i32::from(task.progress),
            result: task.result.as_ref().map(serde_json::to_value).transpose()?,
            error_message: task.error_message.clone(),
            options: serde_json::to_value(&task.options)?,
            created_at: task.created_at,
            updated_at: task.updated_at,
            completed_at: task.completed_at,
        })
    }

    pub fn into_task(self) -> Result<ParseTask, StoreError> {
        let status: TaskStatus = serde_json::from_value(Value::String(self.status))?;
        Ok(ParseTask {
            id: self.id,
            resume_id: self.resume_id,
            user_id: self.user_id,
            file_path: self.file_path,
            file_type: self.file_type,
            status,
            progress: self.progress.clamp(0, 100) as u8,
            result: self.result.map(serde_json::from_value).transpose()?,
            error_message: self.error_message,
            options: serde_json::from_value(self.options)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
        })
    }
}

/// PostgreSQL-backed store over the `parse_tasks` table (see `db::ensure_schema`).
#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn write(&self, sql: &str, task: &ParseTask) -> Result<(), StoreError> {
        let row = ParseTaskRow::from_task(task)?;
        sqlx::query(sql)
            .bind(row.id)
            .bind(row.resume_id)
            .bind(row.user_id)
            .bind(row.file_path)
            .bind(row.file_type)
            .bind(row.status)
            .bind(row.progress)
            .bind(row.result)
            .bind(row.error_message)
            .bind(row.options)
            .bind(row.created_at)
            .bind(row.updated_at)
            .bind(row.completed_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create_task(&self, task: ParseTask) -> Result<ParseTask, StoreError> {
        self.write(INSERT_TASK, &task).await?;
        debug!(task_id = %task.id, "Inserted parse task");
        Ok(task)
    }

    async fn get_task(&self, id: Uuid) -> Result<ParseTask, StoreError> {
        sqlx::query_as::<_, ParseTaskRow>("SELECT * FROM parse_tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::TaskNotFound(id))?
            .into_task()
    }

    async fn update_task(&self, task: &ParseTask) -> Result<(), StoreError> {
        self.write(UPSERT_TASK, task).await
    }

    async fn list_tasks_by_user(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ParseTask>, StoreError> {
        sqlx::query_as::<_, ParseTaskRow>(
            r#"
            SELECT * FROM parse_tasks
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit.max(0))
        .bind(offset.max(0))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(ParseTaskRow::into_task)
        .collect()
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), StoreError> {
        let deleted = sqlx::query("DELETE FROM parse_tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(StoreError::TaskNotFound(id));
        }
        Ok(())
    }
}
