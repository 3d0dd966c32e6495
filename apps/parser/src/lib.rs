//! Resume ingestion core: turns uploaded resume files into `StructuredContent`
//! through an asynchronous, persisted task lifecycle.

pub mod config;
pub mod coordinator;
pub mod db;
pub mod errors;
pub mod extract;
pub mod models;
pub mod scoring;
pub mod sections;
pub mod store;

pub use config::{Config, CoordinatorSettings};
pub use coordinator::TaskCoordinator;
pub use errors::{CoordinatorError, ExtractError, StoreError};
pub use extract::{file_type_from_path, Extractor, ExtractorRegistry};
pub use models::{ParseOptions, ParseTask, StructuredContent, TaskStatus};
pub use scoring::confidence_score;
pub use store::{InMemoryTaskStore, PgTaskStore, TaskStore};
