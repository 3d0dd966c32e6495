use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

const CREATE_PARSE_TASKS: &str = r#"
    CREATE TABLE IF NOT EXISTS parse_tasks (
        id            UUID PRIMARY KEY,
        resume_id     TEXT NOT NULL,
        user_id       TEXT NOT NULL,
        file_path     TEXT NOT NULL,
        file_type     TEXT NOT NULL,
        status        TEXT NOT NULL,
        progress      INT NOT NULL DEFAULT 0,
        result        JSONB,
        error_message TEXT,
        options       JSONB NOT NULL DEFAULT '{}'::jsonb,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        completed_at  TIMESTAMPTZ
    )
"#;

const CREATE_USER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS parse_tasks_user_id_idx ON parse_tasks (user_id, created_at DESC)";

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the `parse_tasks` table and its index when missing.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(CREATE_PARSE_TASKS)
        .execute(pool)
        .await
        .context("Failed to create parse_tasks table")?;
    sqlx::query(CREATE_USER_INDEX)
        .execute(pool)
        .await
        .context("Failed to create parse_tasks index")?;

    info!("parse_tasks schema ready");
    Ok(())
}
