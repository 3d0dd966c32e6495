use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::PersonalInfo;
use crate::sections::{Section, SectionExtractor};

/// Number of leading lines searched for a name.
const NAME_SCAN_LINES: usize = 5;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\x{4e00}-\x{9fa5}a-zA-Z\s]{2,20}$").unwrap());

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());

// Mainland mobile numbers, optionally prefixed with +86.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"1[3-9][0-9]{9}|(?:\+86)?[\s-]?1[3-9][0-9]{9}").unwrap());

/// Name from the document head, first email and first mobile number anywhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct PersonalInfoExtractor;

impl SectionExtractor for PersonalInfoExtractor {
    type Output = PersonalInfo;

    fn section(&self) -> Section {
        Section::PersonalInfo
    }

    fn extract(&self, text: &str) -> Option<PersonalInfo> {
        let info = PersonalInfo {
            name: guess_name(text).unwrap_or_default(),
            email: EMAIL_RE
                .find(text)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            phone: PHONE_RE
                .find(text)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default(),
        };

        (!info.is_empty()).then_some(info)
    }
}

/// The first non-blank line among the first five that is a short run of letters
/// (Latin or CJK) and whitespace.
fn guess_name(text: &str) -> Option<String> {
    text.lines()
        .take(NAME_SCAN_LINES)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find(|line| NAME_RE.is_match(line))
        .map(String::from)
}
