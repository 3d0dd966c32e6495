//! Section Extractor: deterministic decomposition of recovered plain text into
//! resume sections.
//!
//! Every section is a pure `(text) -> Option<Entity>` function behind the
//! `SectionExtractor` trait. `HeuristicExtractor` runs them all, honouring
//! `ParseOptions::skip_sections`, and is shared by every format variant.

pub mod cleaning;
pub mod education;
pub mod experience;
pub mod personal;
pub mod projects;
pub mod skills;
pub mod window;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::models::{ParseOptions, StructuredContent};

pub use education::EducationExtractor;
pub use experience::ExperienceExtractor;
pub use personal::PersonalInfoExtractor;
pub use projects::ProjectExtractor;
pub use skills::SkillsExtractor;

/// A heuristic for one resume section. Implementations hold no state and never
/// fail; "nothing found" is `None`.
pub trait SectionExtractor: Send + Sync {
    type Output;

    fn section(&self) -> Section;

    fn extract(&self, text: &str) -> Option<Self::Output>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    PersonalInfo,
    Education,
    Experience,
    Skills,
    Projects,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::PersonalInfo => "personal_info",
            Section::Education => "education",
            Section::Experience => "experience",
            Section::Skills => "skills",
            Section::Projects => "projects",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "personal_info" | "personal" => Ok(Section::PersonalInfo),
            "education" => Ok(Section::Education),
            "experience" => Ok(Section::Experience),
            "skills" => Ok(Section::Skills),
            "projects" => Ok(Section::Projects),
            other => Err(format!("unknown section '{other}'")),
        }
    }
}

/// Parses `skip_sections`; unknown names are logged and ignored.
pub fn skipped_sections(options: &ParseOptions) -> HashSet<Section> {
    options
        .skip_sections
        .iter()
        .filter_map(|name| match name.parse::<Section>() {
            Ok(section) => Some(section),
            Err(e) => {
                warn!("Ignoring skip_sections entry: {e}");
                None
            }
        })
        .collect()
}

/// Runs every section heuristic over one text.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicExtractor {
    personal: PersonalInfoExtractor,
    education: EducationExtractor,
    experience: ExperienceExtractor,
    skills: SkillsExtractor,
    projects: ProjectExtractor,
}

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds `StructuredContent` from `text`, which becomes its `raw_text`.
    /// Metadata is left at its defaults for the caller to fill in.
    pub fn extract(&self, text: &str, options: &ParseOptions) -> StructuredContent {
        let skip = skipped_sections(options);

        StructuredContent {
            personal_info: run(&self.personal, text, &skip),
            education: run(&self.education, text, &skip).unwrap_or_default(),
            experience: run(&self.experience, text, &skip).unwrap_or_default(),
            projects: run(&self.projects, text, &skip).unwrap_or_default(),
            skills: run(&self.skills, text, &skip),
            raw_text: text.to_string(),
            metadata: Default::default(),
        }
    }
}

fn run<E: SectionExtractor>(
    extractor: &E,
    text: &str,
    skip: &HashSet<Section>,
) -> Option<E::Output> {
    if skip.contains(&extractor.section()) {
        return None;
    }
    extractor.extract(text)
}
