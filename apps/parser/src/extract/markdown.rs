use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ExtractError;
use crate::extract::text::TextExtractor;
use crate::extract::Extractor;
use crate::models::{ParseOptions, StructuredContent};

pub const MARKDOWN_EXTRACTOR_VERSION: &str = "markdown-1.0.0";

// ── Stripping rules, applied in order ──
// Fenced blocks go first so their contents never reach the inline rules.
// Links are unwrapped before line prefixes so `[# Title](url)` loses both.

static FENCED_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());
/// Any run of heading markers and bullets at the start of a line.
static LINE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:#+[ \t]*|[-*+][ \t]+)+").unwrap());
static BOLD_STAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static BOLD_UNDERSCORE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"__(.+?)__").unwrap());
static ITALIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\n]+)\*").unwrap());
static INLINE_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`\n]*)`").unwrap());

/// Removes Markdown markup, keeping link text and emphasized words.
/// Fenced code blocks are dropped entirely.
///
/// Passes repeat until nothing changes, so markup exposed by an earlier rule
/// (`**# Title**`) is removed too. Every match shortens the text, which bounds
/// the loop.
pub fn strip_markdown(text: &str) -> String {
    let mut current = strip_pass(text);
    loop {
        let next = strip_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_pass(text: &str) -> String {
    let text = FENCED_CODE_RE.replace_all(text, "");
    let text = LINK_RE.replace_all(&text, "${1}");
    let text = LINE_PREFIX_RE.replace_all(&text, "");
    let text = BOLD_STAR_RE.replace_all(&text, "${1}");
    let text = BOLD_UNDERSCORE_RE.replace_all(&text, "${1}");
    let text = ITALIC_RE.replace_all(&text, "${1}");
    let text = INLINE_CODE_RE.replace_all(&text, "${1}");
    text.into_owned()
}

/// Markdown variant: strips markup, then defers to the text heuristics.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownExtractor {
    text: TextExtractor,
}

impl MarkdownExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Extractor for MarkdownExtractor {
    fn parse(
        &self,
        path: &Path,
        options: &ParseOptions,
    ) -> Result<StructuredContent, ExtractError> {
        let source = TextExtractor::read_text(path)?;
        if source.trim().is_empty() {
            return Err(ExtractError::EmptyContent);
        }

        let mut content = self.text.analyze(strip_markdown(&source), options)?;
        content.metadata.parser_version = MARKDOWN_EXTRACTOR_VERSION.to_string();
        Ok(content)
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["md", "markdown"]
    }

    fn version(&self) -> &'static str {
        MARKDOWN_EXTRACTOR_VERSION
    }
}
