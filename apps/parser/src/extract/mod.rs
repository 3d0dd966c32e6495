//! Extraction Pipeline, one `Extractor` per file-type tag.
//!
//! Each variant recovers plain text from its format and hands it to the shared
//! `TextExtractor` heuristics. Binary formats go through a scratch `.txt` file
//! that is removed when the extraction step returns, on success or failure.
//!
//! The registry is assembled once through `ExtractorRegistryBuilder` and is
//! read-only afterwards, so concurrent workers can look extractors up freely.

pub mod docx;
pub mod markdown;
pub mod pdf;
pub mod text;

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use crate::errors::ExtractError;
use crate::models::{ParseOptions, StructuredContent};

pub use docx::DocxExtractor;
pub use markdown::MarkdownExtractor;
pub use pdf::PdfExtractor;
pub use text::TextExtractor;

/// A format variant of the extraction pipeline.
///
/// Implementations are synchronous and may block on file IO and decoding;
/// the coordinator runs them on the blocking thread pool.
pub trait Extractor: Send + Sync {
    fn parse(&self, path: &Path, options: &ParseOptions)
        -> Result<StructuredContent, ExtractError>;

    /// Lowercase file-type tags this variant is registered under.
    fn supported_types(&self) -> &'static [&'static str];

    /// Stamped into `ParseMetadata::parser_version`.
    fn version(&self) -> &'static str;
}

/// Immutable file-type tag → extractor mapping.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn builder() -> ExtractorRegistryBuilder {
        ExtractorRegistryBuilder::default()
    }

    /// Text, Markdown, PDF and Word variants.
    pub fn with_defaults() -> Self {
        Self::builder()
            .register(Arc::new(TextExtractor::new()))
            .register(Arc::new(MarkdownExtractor::new()))
            .register(Arc::new(PdfExtractor::new()))
            .register(Arc::new(DocxExtractor::new()))
            .build()
    }

    /// Looks up the extractor for a tag such as `"pdf"`, `"PDF"` or `".pdf"`.
    pub fn get(&self, file_type: &str) -> Option<Arc<dyn Extractor>> {
        self.extractors.get(&normalize_tag(file_type)).cloned()
    }

    pub fn supports(&self, file_type: &str) -> bool {
        self.extractors.contains_key(&normalize_tag(file_type))
    }

    /// Registered tags, sorted.
    pub fn supported_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.extractors.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

#[derive(Default)]
pub struct ExtractorRegistryBuilder {
    extractors: HashMap<String, Arc<dyn Extractor>>,
}

impl ExtractorRegistryBuilder {
    /// Registers `extractor` under every tag it supports. A later registration
    /// for the same tag replaces the earlier one.
    pub fn register(mut self, extractor: Arc<dyn Extractor>) -> Self {
        for tag in extractor.supported_types() {
            let replaced = self
                .extractors
                .insert(normalize_tag(tag), Arc::clone(&extractor));
            if replaced.is_some() {
                warn!("Replacing extractor registered for '{tag}'");
            }
        }
        self
    }

    pub fn build(self) -> ExtractorRegistry {
        ExtractorRegistry {
            extractors: self.extractors,
        }
    }
}

/// Lowercase extension of `path` without the dot; empty when there is none.
pub fn file_type_from_path(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().trim_start_matches('.').to_lowercase()
}

/// Writes recovered text to a scratch file and runs `text` (the plain-text
/// variant) over it. The scratch file is deleted when this function returns.
pub(crate) fn parse_recovered_text(
    text: &dyn Extractor,
    recovered: &str,
    options: &ParseOptions,
) -> Result<StructuredContent, ExtractError> {
    let mut scratch = tempfile::Builder::new()
        .prefix("resume-parser-")
        .suffix(".txt")
        .tempfile()?;
    scratch.write_all(recovered.as_bytes())?;
    scratch.flush()?;

    text.parse(scratch.path(), options)
}
