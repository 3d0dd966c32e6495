use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::content::StructuredContent;

/// Progress reported while a task is being decoded, so pollers can tell a live
/// task from one still sitting in the queue.
pub const PROCESSING_PROGRESS: u8 = 10;

/// Lifecycle of a parse task: `pending → processing → {completed | failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Only forward edges of the state machine are legal; `pending` is never re-entered.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Processing)
                | (TaskStatus::Processing, TaskStatus::Completed)
                | (TaskStatus::Processing, TaskStatus::Failed)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "processing" => Ok(TaskStatus::Processing),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            other => Err(format!("unknown task status '{other}'")),
        }
    }
}

/// Extraction configuration attached to a task at creation. Never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Preserved for callers; no extractor reads it.
    #[serde(default)]
    pub extract_images: bool,
    #[serde(default)]
    pub clean_text: bool,
    /// Language hint; the heuristics are locale-mixed and ignore it.
    #[serde(default)]
    pub target_language: String,
    /// Section names to omit: `personal_info`, `education`, `experience`, `skills`, `projects`.
    #[serde(default)]
    pub skip_sections: Vec<String>,
}

/// One extraction request and its lifecycle record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseTask {
    pub id: Uuid,
    pub resume_id: String,
    pub user_id: String,
    pub file_path: String,
    pub file_type: String,
    pub status: TaskStatus,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<StructuredContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub options: ParseOptions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ParseTask {
    /// Builds a fresh `pending` task with a newly generated id.
    pub fn new(
        file_path: impl Into<String>,
        file_type: impl Into<String>,
        resume_id: impl Into<String>,
        user_id: impl Into<String>,
        options: ParseOptions,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            resume_id: resume_id.into(),
            user_id: user_id.into(),
            file_path: file_path.into(),
            file_type: file_type.into(),
            status: TaskStatus::Pending,
            progress: 0,
            result: None,
            error_message: None,
            options,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// `pending → processing`. Returns false (and leaves the task untouched) on an illegal edge.
    pub fn start_processing(&mut self) -> bool {
        if !self.status.can_transition_to(TaskStatus::Processing) {
            return false;
        }
        self.status = TaskStatus::Processing;
        self.progress = PROCESSING_PROGRESS;
        self.updated_at = Utc::now();
        true
    }

    /// `processing → completed` with the extraction result attached.
    pub fn complete(&mut self, content: StructuredContent) -> bool {
        if !self.status.can_transition_to(TaskStatus::Completed) {
            return false;
        }
        let now = Utc::now();
        self.status = TaskStatus::Completed;
        self.progress = 100;
        self.result = Some(content);
        self.error_message = None;
        self.updated_at = now;
        self.completed_at = Some(now);
        true
    }

    /// `processing → failed`, recording the cause.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if !self.status.can_transition_to(TaskStatus::Failed) {
            return false;
        }
        let now = Utc::now();
        self.status = TaskStatus::Failed;
        self.progress = 0;
        self.result = None;
        self.error_message = Some(message.into());
        self.updated_at = now;
        self.completed_at = Some(now);
        true
    }
}
