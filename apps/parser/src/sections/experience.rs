use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Experience;
use crate::sections::window::{first_keyword, trigger_windows};
use crate::sections::{Section, SectionExtractor};

const LOOKAHEAD: usize = 8;

const TRIGGERS: &[&str] = &[
    "工作经历",
    "工作经验",
    "职业经历",
    "任职",
    "工作",
    "experience",
    "employment",
];

const POSITIONS: &[&str] = &[
    "工程师",
    "经理",
    "主管",
    "总监",
    "专员",
    "助理",
    "开发",
    "设计师",
    "Engineer",
    "Manager",
    "Director",
    "Developer",
    "Designer",
    "Analyst",
    "Consultant",
    "Intern",
];

static COMPANY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[\x{4e00}-\x{9fa5}a-zA-Z ]{2,20}(?:公司|集团|科技|有限责任公司|股份有限公司)|(?:[A-Z][A-Za-z0-9&]* ){1,4}(?:Inc|Ltd|LLC|Corp|Corporation|Company|Group|Technologies)\b\.?",
    )
    .unwrap()
});

/// One entry per experience trigger window that names a company or a position.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExperienceExtractor;

impl SectionExtractor for ExperienceExtractor {
    type Output = Vec<Experience>;

    fn section(&self) -> Section {
        Section::Experience
    }

    fn extract(&self, text: &str) -> Option<Vec<Experience>> {
        let entries: Vec<Experience> = trigger_windows(text, TRIGGERS, LOOKAHEAD)
            .iter()
            .filter_map(|w| parse_window(&w.text))
            .collect();

        (!entries.is_empty()).then_some(entries)
    }
}

fn parse_window(section: &str) -> Option<Experience> {
    let company = COMPANY_RE
        .find(section)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    let position = first_keyword(section, POSITIONS)
        .unwrap_or_default()
        .to_string();

    if company.is_empty() && position.is_empty() {
        return None;
    }
    Some(Experience { company, position })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chinese_company_and_position() {
        let exp = parse_window("工作经历\n2019-2023 北京字节跳动科技有限公司 高级工程师").unwrap();
        assert_eq!(exp.company, "北京字节跳动科技有限公司");
        assert_eq!(exp.position, "工程师");
    }

    #[test]
    fn test_english_company_and_position() {
        let text = "Work Experience\nAcme Corp, Senior Software Engineer\n2019 - 2023";
        let entries = ExperienceExtractor.extract(text).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].company, "Acme Corp");
        assert_eq!(entries[0].position, "Engineer");
    }

    #[test]
    fn test_position_alone_is_enough() {
        let exp = parse_window("任职 产品经理").unwrap();
        assert!(exp.company.is_empty());
        assert_eq!(exp.position, "经理");
    }

    #[test]
    fn test_window_without_company_or_position_is_dropped() {
        assert!(ExperienceExtractor.extract("工作地点：上海").is_none());
    }

    #[test]
    fn test_windows_are_not_deduplicated() {
        let text = "工作经历\n某某科技有限公司 工程师";
        let entries = ExperienceExtractor.extract(text).unwrap();
        assert_eq!(entries.len(), 1);

        // Second line also contains "工作", so the same company is reported twice.
        let text = "工作经历\n工作内容：开发\n某某科技有限公司";
        let entries = ExperienceExtractor.extract(text).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].company, entries[1].company);
    }
}
