pub mod content;
pub mod task;

pub use content::{
    Education, Experience, ParseMetadata, PersonalInfo, Project, SkillCategory, SkillItem,
    Skills, StructuredContent,
};
pub use task::{ParseOptions, ParseTask, TaskStatus, PROCESSING_PROGRESS};
