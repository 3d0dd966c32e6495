use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::errors::ExtractError;
use crate::extract::text::TextExtractor;
use crate::extract::{parse_recovered_text, Extractor};
use crate::models::{ParseOptions, StructuredContent};

pub const DOCX_EXTRACTOR_VERSION: &str = "docx-1.0.0";

const DOCUMENT_PART: &str = "word/document.xml";
/// Characters per estimated page; Word files carry no reliable page count.
const CHARS_PER_PAGE: usize = 1500;
/// Compound-file signature. Password-protected .docx files are wrapped in one.
const OLE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Word variant. Registered for both `docx` and `doc`, but only the Office
/// Open XML container is understood; legacy binary files are rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor {
    text: TextExtractor,
}

impl DocxExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body paragraphs in document order, followed by table text
    /// (cells tab-terminated, one line per row).
    pub fn recover_text(path: &Path) -> Result<String, ExtractError> {
        let is_docx = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));
        if !is_docx {
            return Err(ExtractError::UnsupportedFormat(
                "only .docx files are supported".to_string(),
            ));
        }

        let mut file = File::open(path)?;
        let mut signature = [0u8; 8];
        if file.read_exact(&mut signature).is_ok() && signature == OLE_SIGNATURE {
            return Err(ExtractError::DocumentProtected);
        }
        drop(file);

        let mut archive =
            ZipArchive::new(File::open(path)?).map_err(|e| ExtractError::Docx(e.to_string()))?;
        let mut xml = String::new();
        match archive.by_name(DOCUMENT_PART) {
            Ok(mut part) => {
                part.read_to_string(&mut xml)?;
            }
            Err(ZipError::FileNotFound) => {
                return Err(ExtractError::Docx(format!("missing {DOCUMENT_PART}")));
            }
            Err(e) => return Err(ExtractError::Docx(e.to_string())),
        }

        document_text(&xml)
    }
}

/// Open containers while walking the document. Runs and text elements are
/// tracked separately since they never hold paragraphs of their own.
enum Frame {
    Paragraph(String),
    Cell(String),
    Row(String),
}

#[derive(Default)]
struct DocumentText {
    frames: Vec<Frame>,
    body: String,
    tables: String,
}

impl DocumentText {
    /// Innermost open paragraph; text outside any paragraph is dropped.
    fn paragraph_mut(&mut self) -> Option<&mut String> {
        self.frames.iter_mut().rev().find_map(|frame| match frame {
            Frame::Paragraph(text) => Some(text),
            _ => None,
        })
    }

    fn push_str(&mut self, s: &str) {
        if let Some(paragraph) = self.paragraph_mut() {
            paragraph.push_str(s);
        }
    }

    fn push(&mut self, c: char) {
        if let Some(paragraph) = self.paragraph_mut() {
            paragraph.push(c);
        }
    }

    fn end_paragraph(&mut self) {
        if let Some(Frame::Paragraph(text)) = self.frames.pop() {
            self.place_paragraph(text);
        }
    }

    /// Cell paragraphs are space-joined. A paragraph inside another one
    /// (text box content) becomes its own line within it.
    fn place_paragraph(&mut self, text: String) {
        match self.frames.last_mut() {
            Some(Frame::Cell(cell)) => join_spaced(cell, &text),
            Some(Frame::Paragraph(outer)) => {
                if !text.is_empty() {
                    if !outer.is_empty() && !outer.ends_with('\n') {
                        outer.push('\n');
                    }
                    outer.push_str(&text);
                    outer.push('\n');
                }
            }
            _ => {
                self.body.push_str(&text);
                self.body.push('\n');
            }
        }
    }

    fn end_cell(&mut self) {
        if let Some(Frame::Cell(text)) = self.frames.pop() {
            self.place_cell(&text);
        }
    }

    fn place_cell(&mut self, text: &str) {
        if let Some(Frame::Row(row)) = self.frames.last_mut() {
            row.push_str(text);
            row.push('\t');
        }
    }

    /// A row of a nested table is flattened into the enclosing cell.
    fn end_row(&mut self) {
        let Some(Frame::Row(row)) = self.frames.pop() else {
            return;
        };
        match self.frames.last_mut() {
            Some(Frame::Cell(cell)) => {
                let flattened = row.trim_end_matches('\t').replace('\t', " ");
                join_spaced(cell, &flattened);
            }
            _ => {
                self.tables.push_str(&row);
                self.tables.push('\n');
            }
        }
    }
}

fn join_spaced(target: &mut String, text: &str) {
    if !target.is_empty() && !text.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

/// Walks `word/document.xml`. Tabs and breaks are only honoured inside runs,
/// since `w:tab` also appears in paragraph tab-stop definitions.
fn document_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut doc = DocumentText::default();
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => doc.frames.push(Frame::Paragraph(String::new())),
                b"r" => run_depth += 1,
                b"t" => in_text = true,
                b"tc" => doc.frames.push(Frame::Cell(String::new())),
                b"tr" => doc.frames.push(Frame::Row(String::new())),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"p" => doc.place_paragraph(String::new()),
                b"tc" => doc.place_cell(""),
                b"tab" if run_depth > 0 => doc.push('\t'),
                b"br" | b"cr" if run_depth > 0 => doc.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e.unescape().map_err(|e| ExtractError::Docx(e.to_string()))?;
                doc.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"p" => doc.end_paragraph(),
                b"tc" => doc.end_cell(),
                b"tr" => doc.end_row(),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::Docx(format!(
                    "malformed document at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    let DocumentText {
        mut body, tables, ..
    } = doc;
    debug!(
        body_chars = body.chars().count(),
        table_chars = tables.chars().count(),
        "Recovered Word text"
    );
    body.push_str(&tables);
    Ok(body)
}

fn estimated_pages(text: &str) -> u32 {
    (text.chars().count() / CHARS_PER_PAGE + 1) as u32
}

impl Extractor for DocxExtractor {
    fn parse(
        &self,
        path: &Path,
        options: &ParseOptions,
    ) -> Result<StructuredContent, ExtractError> {
        let recovered = Self::recover_text(path)?;
        if recovered.trim().is_empty() {
            return Err(ExtractError::EmptyContent);
        }

        let mut content = parse_recovered_text(&self.text, &recovered, options)?;
        content.metadata.page_count = Some(estimated_pages(&recovered));
        content.metadata.parser_version = DOCX_EXTRACTOR_VERSION.to_string();
        Ok(content)
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["docx", "doc"]
    }

    fn version(&self) -> &'static str {
        DOCX_EXTRACTOR_VERSION
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use super::*;

    fn document_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
    }

    fn para(text: &str) -> String {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }

    fn write_docx(suffix: &str, xml: &str) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        let mut zip = ZipWriter::new(file.reopen().unwrap());
        zip.start_file(DOCUMENT_PART, SimpleFileOptions::default())
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
        file
    }

    #[test]
    fn test_parse_docx_resume() {
        let xml = document_xml(&format!(
            "{}{}{}{}{}",
            para("张三"),
            para("zhangsan@example.com"),
            para("13812345678"),
            para("工作经历"),
            para("某某科技有限公司 工程师"),
        ));
        let file = write_docx(".docx", &xml);

        let content = DocxExtractor::new()
            .parse(file.path(), &ParseOptions::default())
            .unwrap();

        let info = content.personal_info.unwrap();
        assert_eq!(info.name, "张三");
        assert_eq!(info.email, "zhangsan@example.com");
        assert_eq!(info.phone, "13812345678");
        assert_eq!(content.experience[0].company, "某某科技有限公司");
        assert_eq!(content.metadata.page_count, Some(1));
        assert_eq!(content.metadata.parser_version, DOCX_EXTRACTOR_VERSION);
    }

    #[test]
    fn test_tables_follow_body_paragraphs() {
        let table = "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Skill</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Rust</w:t></w:r></w:p></w:tc></w:tr></w:tbl>";
        let xml = document_xml(&format!("{}{}{}", para("Intro"), table, para("Outro")));

        let text = document_text(&xml).unwrap();
        assert_eq!(text, "Intro\nOutro\nSkill\tRust\t\n");
    }

    #[test]
    fn test_run_tabs_breaks_and_entities() {
        let xml = document_xml(
            "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr><w:r><w:t>R&amp;D</w:t><w:tab/><w:t>Lead</w:t><w:br/><w:t>2020</w:t></w:r></w:p>",
        );
        assert_eq!(document_text(&xml).unwrap(), "R&D\tLead\n2020\n");
    }

    #[test]
    fn test_empty_paragraph_keeps_its_line() {
        let xml = document_xml(&format!("{}<w:p/>{}", para("a"), para("b")));
        assert_eq!(document_text(&xml).unwrap(), "a\n\nb\n");
    }

    #[test]
    fn test_nested_table_keeps_outer_cell_text() {
        let inner = format!(
            "<w:tbl><w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl>",
            para("Rust"),
            para("Go")
        );
        let outer = format!(
            "<w:tbl><w:tr><w:tc>{}{}{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl>",
            para("Lead"),
            inner,
            para("Team"),
            para("2020")
        );
        let xml = document_xml(&outer);
        assert_eq!(document_text(&xml).unwrap(), "Lead Rust Go Team\t2020\t\n");
    }

    #[test]
    fn test_text_box_keeps_enclosing_paragraph() {
        let xml = document_xml(
            "<w:p><w:r><w:t>Before</w:t></w:r><w:r><w:pict><w:txbxContent><w:p><w:r><w:t>Box</w:t></w:r></w:p></w:txbxContent></w:pict></w:r><w:r><w:tab/><w:t>After</w:t></w:r></w:p>",
        );
        assert_eq!(document_text(&xml).unwrap(), "Before\nBox\n\tAfter\n");
    }

    #[test]
    fn test_legacy_doc_is_rejected() {
        let file = write_docx(".doc", &document_xml(&para("张三")));
        let err = DocxExtractor::new()
            .parse(file.path(), &ParseOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_compound_file_is_protected() {
        let mut file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        file.write_all(&OLE_SIGNATURE).unwrap();
        file.write_all(&[0u8; 504]).unwrap();
        file.flush().unwrap();

        let err = DocxExtractor::recover_text(file.path()).unwrap_err();
        assert!(matches!(err, ExtractError::DocumentProtected));
    }

    #[test]
    fn test_non_zip_is_docx_error() {
        let mut file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        file.write_all(b"plain text pretending").unwrap();
        file.flush().unwrap();

        let err = DocxExtractor::recover_text(file.path()).unwrap_err();
        assert!(matches!(err, ExtractError::Docx(_)));
    }

    #[test]
    fn test_empty_document_is_empty_content() {
        let file = write_docx(".docx", &document_xml(""));
        let err = DocxExtractor::new()
            .parse(file.path(), &ParseOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExtractError::EmptyContent));
    }

    #[test]
    fn test_page_estimate() {
        assert_eq!(estimated_pages(""), 1);
        assert_eq!(estimated_pages(&"字".repeat(1499)), 1);
        assert_eq!(estimated_pages(&"字".repeat(3000)), 3);
    }
}
