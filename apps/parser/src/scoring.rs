//! Confidence Scorer: how complete an extraction looks, on a 0 to 100 scale.
//!
//! Additive and capped: the raw contributions sum to 110 at most and are
//! clamped to 100. This measures completeness, not accuracy.

use crate::models::StructuredContent;

const NAME_POINTS: u32 = 20;
const EMAIL_POINTS: u32 = 15;
const PHONE_POINTS: u32 = 10;
const EXPERIENCE_POINTS: u32 = 25;
const COMPLETE_EXPERIENCE_BONUS: u32 = 5;
const EDUCATION_POINTS: u32 = 15;
const COMPLETE_EDUCATION_BONUS: u32 = 5;
const SKILLS_POINTS: u32 = 10;
const RAW_TEXT_POINTS: u32 = 5;
/// Raw text must be longer than this many characters to earn `RAW_TEXT_POINTS`.
const RAW_TEXT_THRESHOLD: usize = 100;
const MAX_SCORE: u32 = 100;

/// Pure and order-independent.
pub fn confidence_score(content: &StructuredContent) -> u8 {
    let mut score = 0;

    if let Some(info) = &content.personal_info {
        if !info.name.is_empty() {
            score += NAME_POINTS;
        }
        if !info.email.is_empty() {
            score += EMAIL_POINTS;
        }
        if !info.phone.is_empty() {
            score += PHONE_POINTS;
        }
    }

    if !content.experience.is_empty() {
        score += EXPERIENCE_POINTS;
        if content
            .experience
            .iter()
            .any(|e| !e.company.is_empty() && !e.position.is_empty())
        {
            score += COMPLETE_EXPERIENCE_BONUS;
        }
    }

    if !content.education.is_empty() {
        score += EDUCATION_POINTS;
        if content
            .education
            .iter()
            .any(|e| !e.school.is_empty() && !e.degree.is_empty())
        {
            score += COMPLETE_EDUCATION_BONUS;
        }
    }

    if content.skills.as_ref().is_some_and(|s| s.has_items()) {
        score += SKILLS_POINTS;
    }

    if content.raw_text.chars().count() > RAW_TEXT_THRESHOLD {
        score += RAW_TEXT_POINTS;
    }

    score.min(MAX_SCORE) as u8
}
