use std::fmt;
use std::path::Path;

use lopdf::Document;
use tracing::{debug, warn};

use crate::errors::ExtractError;
use crate::extract::text::TextExtractor;
use crate::extract::{parse_recovered_text, Extractor};
use crate::models::{ParseOptions, StructuredContent};

pub const PDF_EXTRACTOR_VERSION: &str = "pdf-1.0.0";

/// Text recovered from a PDF, page by page.
#[derive(Debug, Default)]
pub struct PdfText {
    pub text: String,
    pub page_count: u32,
    /// One `page N: cause` entry per page whose text could not be recovered.
    pub warnings: Vec<String>,
}

impl PdfText {
    /// Every page counts toward `page_count`; a page whose text fails to
    /// extract contributes a warning instead of text.
    fn from_pages<E: fmt::Display>(
        pages: impl IntoIterator<Item = u32>,
        mut extract: impl FnMut(u32) -> Result<String, E>,
    ) -> Self {
        let mut recovered = PdfText::default();
        for page_num in pages {
            recovered.page_count += 1;
            match extract(page_num) {
                Ok(page_text) => {
                    recovered.text.push_str(&page_text);
                    recovered.text.push('\n');
                }
                Err(e) => {
                    warn!(page = page_num, error = %e, "Skipping unreadable PDF page");
                    recovered.warnings.push(format!("page {page_num}: {e}"));
                }
            }
        }
        recovered
    }
}

/// PDF variant. Pages whose text cannot be recovered are skipped with a
/// warning instead of failing the document.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor {
    text: TextExtractor,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recover_text(path: &Path) -> Result<PdfText, ExtractError> {
        let doc = Document::load(path).map_err(|e| {
            let message = e.to_string();
            if message.contains("encrypt") || message.contains("password") {
                ExtractError::DocumentProtected
            } else {
                ExtractError::Pdf(message)
            }
        })?;

        if doc.is_encrypted() {
            return Err(ExtractError::DocumentProtected);
        }

        let pages = doc.get_pages();
        let recovered = PdfText::from_pages(pages.keys().copied(), |page_num| {
            doc.extract_text(&[page_num])
        });

        debug!(
            pages = recovered.page_count,
            skipped = recovered.warnings.len(),
            chars = recovered.text.chars().count(),
            "Recovered PDF text"
        );
        Ok(recovered)
    }
}

impl Extractor for PdfExtractor {
    fn parse(
        &self,
        path: &Path,
        options: &ParseOptions,
    ) -> Result<StructuredContent, ExtractError> {
        let recovered = Self::recover_text(path)?;
        if recovered.text.trim().is_empty() {
            return Err(ExtractError::EmptyContent);
        }

        let mut content = parse_recovered_text(&self.text, &recovered.text, options)?;
        content.metadata.page_count = Some(recovered.page_count);
        content.metadata.warnings.extend(recovered.warnings);
        content.metadata.parser_version = PDF_EXTRACTOR_VERSION.to_string();
        Ok(content)
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["pdf"]
    }

    fn version(&self) -> &'static str {
        PDF_EXTRACTOR_VERSION
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    use super::*;

    /// Writes a PDF with one page per entry; each page shows its lines in Courier.
    fn write_pdf(pages: &[&[&str]]) -> tempfile::NamedTempFile {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for lines in pages {
            let mut operations = Vec::new();
            for (i, line) in lines.iter().enumerate() {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
                operations.push(Operation::new(
                    "Td",
                    vec![72.into(), (720 - 20 * i as i64).into()],
                ));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        doc.save_to(&mut file).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_pdf_resume() {
        let file = write_pdf(&[&["Jane Doe", "jane.doe@example.com", "13812345678"]]);
        let content = PdfExtractor::new()
            .parse(file.path(), &ParseOptions::default())
            .unwrap();

        let info = content.personal_info.unwrap();
        assert_eq!(info.email, "jane.doe@example.com");
        assert_eq!(info.phone, "13812345678");
        assert_eq!(content.metadata.page_count, Some(1));
        assert_eq!(content.metadata.parser_version, PDF_EXTRACTOR_VERSION);
        assert!(content.metadata.warnings.is_empty());
    }

    #[test]
    fn test_blank_page_counts_but_adds_no_text() {
        let file = write_pdf(&[&["jane.doe@example.com"], &[]]);
        let recovered = PdfExtractor::recover_text(file.path()).unwrap();
        assert_eq!(recovered.page_count, 2);
        assert!(recovered.text.contains("jane.doe@example.com"));
        assert!(recovered.warnings.is_empty());
    }

    #[test]
    fn test_failed_page_is_skipped_with_warning() {
        let recovered = PdfText::from_pages([1, 2, 3], |page| match page {
            2 => Err("invalid content stream"),
            n => Ok(format!("text of page {n}")),
        });
        assert_eq!(recovered.page_count, 3);
        assert_eq!(recovered.warnings, vec!["page 2: invalid content stream"]);
        assert_eq!(recovered.text, "text of page 1\ntext of page 3\n");
    }

    #[test]
    fn test_every_page_failing_still_counts_pages() {
        let recovered = PdfText::from_pages([1, 2], |_| Err::<String, _>("no text"));
        assert_eq!(recovered.page_count, 2);
        assert_eq!(recovered.warnings.len(), 2);
        assert!(recovered.text.is_empty());
    }

    #[test]
    fn test_pdf_without_text_is_empty_content() {
        let file = write_pdf(&[&[]]);
        let err = PdfExtractor::new()
            .parse(file.path(), &ParseOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExtractError::EmptyContent));
    }

    #[test]
    fn test_corrupt_file_is_pdf_error() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"this is not a pdf").unwrap();
        file.flush().unwrap();

        let err = PdfExtractor::new()
            .parse(file.path(), &ParseOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }
}
