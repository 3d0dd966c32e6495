use crate::models::{SkillCategory, SkillItem, Skills};
use crate::sections::{Section, SectionExtractor};

pub const TECHNICAL_CATEGORY: &str = "technical";
pub const DEFAULT_LEVEL: &str = "proficient";

/// Known technology names, matched case-sensitively by substring.
const VOCABULARY: &[&str] = &[
    "Java",
    "Python",
    "JavaScript",
    "TypeScript",
    "Go",
    "Rust",
    "C++",
    "C#",
    "PHP",
    "Ruby",
    "React",
    "Vue",
    "Angular",
    "Spring",
    "Django",
    "Flask",
    "MySQL",
    "PostgreSQL",
    "MongoDB",
    "Redis",
    "Kafka",
    "Docker",
    "Kubernetes",
    "Git",
    "Linux",
];

/// Vocabulary scan over the whole text. Substring containment means "Java" also
/// fires on "JavaScript" and "Go" on "Google"; that is accepted.
#[derive(Debug, Default, Clone, Copy)]
pub struct SkillsExtractor;

impl SectionExtractor for SkillsExtractor {
    type Output = Skills;

    fn section(&self) -> Section {
        Section::Skills
    }

    fn extract(&self, text: &str) -> Option<Skills> {
        let found: Vec<SkillItem> = VOCABULARY
            .iter()
            .filter(|skill| text.contains(*skill))
            .map(|skill| SkillItem {
                name: skill.to_string(),
                level: DEFAULT_LEVEL.to_string(),
                years: None,
            })
            .collect();

        if found.is_empty() {
            return None;
        }

        Some(Skills {
            categories: vec![SkillCategory {
                category: TECHNICAL_CATEGORY.to_string(),
                skills: found,
            }],
        })
    }
}
