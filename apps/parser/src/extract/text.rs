use std::fs;
use std::path::Path;

use crate::errors::ExtractError;
use crate::extract::Extractor;
use crate::models::{ParseOptions, StructuredContent};
use crate::sections::cleaning::clean_text;
use crate::sections::HeuristicExtractor;

pub const TEXT_EXTRACTOR_VERSION: &str = "text-1.0.0";

/// Plain-text variant. Every other variant ends up here once it has recovered
/// text from its own format.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextExtractor {
    heuristics: HeuristicExtractor,
}

impl TextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub fn read_text(path: &Path) -> Result<String, ExtractError> {
        let bytes = fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Runs the section heuristics over already-recovered text.
    pub fn analyze(
        &self,
        text: String,
        options: &ParseOptions,
    ) -> Result<StructuredContent, ExtractError> {
        let text = if options.clean_text {
            clean_text(&text)
        } else {
            text
        };

        if text.trim().is_empty() {
            return Err(ExtractError::EmptyContent);
        }

        Ok(self.heuristics.extract(&text, options))
    }
}

impl Extractor for TextExtractor {
    fn parse(
        &self,
        path: &Path,
        options: &ParseOptions,
    ) -> Result<StructuredContent, ExtractError> {
        let text = Self::read_text(path)?;
        let mut content = self.analyze(text, options)?;
        content.metadata.parser_version = TEXT_EXTRACTOR_VERSION.to_string();
        Ok(content)
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["txt"]
    }

    fn version(&self) -> &'static str {
        TEXT_EXTRACTOR_VERSION
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_plain_resume() {
        let file = write_temp("张三\nzhangsan@example.com\n13812345678\n".as_bytes());
        let content = TextExtractor::new()
            .parse(file.path(), &ParseOptions::default())
            .unwrap();

        let info = content.personal_info.unwrap();
        assert_eq!(info.name, "张三");
        assert_eq!(info.email, "zhangsan@example.com");
        assert_eq!(info.phone, "13812345678");
        assert_eq!(content.metadata.parser_version, TEXT_EXTRACTOR_VERSION);
    }

    #[test]
    fn test_whitespace_only_file_is_empty_content() {
        let file = write_temp(b"  \n\t\n  ");
        let err = TextExtractor::new()
            .parse(file.path(), &ParseOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExtractError::EmptyContent));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = TextExtractor::new()
            .parse(Path::new("/nonexistent/resume.txt"), &ParseOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let file = write_temp(b"Jane Doe\n\xff\xfe\njane@example.com\n");
        let content = TextExtractor::new()
            .parse(file.path(), &ParseOptions::default())
            .unwrap();
        assert!(content.raw_text.contains('\u{FFFD}'));
        assert_eq!(content.personal_info.unwrap().email, "jane@example.com");
    }

    #[test]
    fn test_clean_text_option_normalizes_raw_text() {
        let options = ParseOptions {
            clean_text: true,
            ..Default::default()
        };
        let content = TextExtractor::new()
            .analyze("  张三\r\n\r\n\r\n\r\nzhangsan@example.com  ".to_string(), &options)
            .unwrap();
        assert_eq!(content.raw_text, "张三\n\nzhangsan@example.com");
    }

    #[test]
    fn test_raw_text_untouched_without_clean_text() {
        let raw = "  张三\n\n\n\nzhangsan@example.com  ";
        let content = TextExtractor::new()
            .analyze(raw.to_string(), &ParseOptions::default())
            .unwrap();
        assert_eq!(content.raw_text, raw);
    }
}
