use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Project;
use crate::sections::window::{first_keyword, trigger_windows};
use crate::sections::{Section, SectionExtractor};

const LOOKAHEAD: usize = 6;

const TRIGGERS: &[&str] = &[
    "项目经历",
    "项目经验",
    "参与项目",
    "负责项目",
    "project experience",
    "projects",
];

const ROLES: &[&str] = &[
    "负责人",
    "开发者",
    "架构师",
    "项目经理",
    "团队leader",
    "Tech Lead",
    "Team Lead",
    "Architect",
    "Project Manager",
    "Developer",
    "Owner",
];

// Either a quoted title or a "项目:" / "Project:" label.
static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"[“"]([^“”"\n]{3,30})[”"]|(?:项目|(?i:project))[:：][ \t]*([\x{4e00}-\x{9fa5}A-Za-z0-9 ]{3,30})"#,
    )
    .unwrap()
});

/// One entry per project trigger window that yields a project name.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectExtractor;

impl SectionExtractor for ProjectExtractor {
    type Output = Vec<Project>;

    fn section(&self) -> Section {
        Section::Projects
    }

    fn extract(&self, text: &str) -> Option<Vec<Project>> {
        let entries: Vec<Project> = trigger_windows(text, TRIGGERS, LOOKAHEAD)
            .iter()
            .filter_map(|w| parse_window(&w.text))
            .collect();

        (!entries.is_empty()).then_some(entries)
    }
}

fn parse_window(section: &str) -> Option<Project> {
    let name = NAME_RE
        .captures(section)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())?;

    Some(Project {
        name,
        role: first_keyword(section, ROLES).unwrap_or_default().to_string(),
    })
}
