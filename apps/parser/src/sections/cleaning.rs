use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static SPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

/// Normalizes recovered text when `ParseOptions::clean_text` is set: unified
/// line endings, at most one blank line in a row, single spaces, no outer
/// whitespace.
pub fn clean_text(text: &str) -> String {
    let text = text.trim().replace("\r\n", "\n").replace('\r', "\n");
    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");
    let text = SPACE_RUN_RE.replace_all(&text, " ");
    text.trim().to_string()
}
