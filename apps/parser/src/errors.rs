use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

/// Failures raised while turning a source file into `StructuredContent`.
/// These never reach a caller directly: the worker writes them into the task
/// as its `error_message`.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("document content is empty")]
    EmptyContent,

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("document is password protected")]
    DocumentProtected,

    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to open PDF: {0}")]
    Pdf(String),

    #[error("failed to open Word document: {0}")]
    Docx(String),

    #[error("parse timed out after {0:?}")]
    Timeout(Duration),

    #[error("extraction aborted: {0}")]
    Aborted(String),
}

/// Task Store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors the Task Coordinator returns synchronously to its caller.
/// Anything that goes wrong after a task is queued ends up in the task instead.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("file too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("parse queue is closed")]
    QueueClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CoordinatorError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TaskNotFound(id) => CoordinatorError::TaskNotFound(id),
            other => CoordinatorError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_coordinator_not_found() {
        let id = Uuid::new_v4();
        let err: CoordinatorError = StoreError::TaskNotFound(id).into();
        assert!(matches!(err, CoordinatorError::TaskNotFound(got) if got == id));
    }

    #[test]
    fn test_extract_error_messages_are_human_readable() {
        assert_eq!(
            ExtractError::EmptyContent.to_string(),
            "document content is empty"
        );
        assert_eq!(
            ExtractError::UnsupportedFormat("only .docx files are supported".to_string())
                .to_string(),
            "unsupported format: only .docx files are supported"
        );
    }

    #[test]
    fn test_file_too_large_message_includes_sizes() {
        let err = CoordinatorError::FileTooLarge {
            size: 2048,
            limit: 1024,
        };
        let msg = err.to_string();
        assert!(msg.contains("2048"));
        assert!(msg.contains("1024"));
    }
}
