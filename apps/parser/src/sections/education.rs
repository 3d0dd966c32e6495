use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Education;
use crate::sections::window::{first_keyword, trigger_windows};
use crate::sections::{Section, SectionExtractor};

const LOOKAHEAD: usize = 5;

const TRIGGERS: &[&str] = &[
    "教育背景",
    "教育经历",
    "学历",
    "毕业",
    "大学",
    "学院",
    "专业",
    "education",
    "degree",
    "graduated",
    "university",
    "college",
    "major",
];

const DEGREES: &[&str] = &[
    "本科",
    "学士",
    "硕士",
    "博士",
    "专科",
    "Bachelor",
    "Master",
    "PhD",
    "Doctor",
    "Associate",
];

static SCHOOL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[\x{4e00}-\x{9fa5}]{2,10}(?:大学|学院|学校)|(?:[A-Z][a-z]+ ){0,3}(?:University|College|Institute)(?: of(?: [A-Z][a-z]+)+)?",
    )
    .unwrap()
});

static MAJOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"专业[:：]?[ \t]*([\x{4e00}-\x{9fa5}a-zA-Z ]{2,20})|(?i:major)[ \t]*[:：][ \t]*([A-Za-z][A-Za-z ]{1,39})",
    )
    .unwrap()
});

/// One entry per education trigger window that names a school or a major.
#[derive(Debug, Default, Clone, Copy)]
pub struct EducationExtractor;

impl SectionExtractor for EducationExtractor {
    type Output = Vec<Education>;

    fn section(&self) -> Section {
        Section::Education
    }

    fn extract(&self, text: &str) -> Option<Vec<Education>> {
        let entries: Vec<Education> = trigger_windows(text, TRIGGERS, LOOKAHEAD)
            .iter()
            .filter_map(|w| parse_window(&w.text))
            .collect();

        (!entries.is_empty()).then_some(entries)
    }
}

fn parse_window(section: &str) -> Option<Education> {
    let school = SCHOOL_RE
        .find(section)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let major = MAJOR_RE
        .captures(section)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    if school.is_empty() && major.is_empty() {
        return None;
    }

    Some(Education {
        school,
        degree: first_keyword(section, DEGREES)
            .unwrap_or_default()
            .to_string(),
        major,
    })
}
