//! Text extraction from uploaded document bytes

use crate::error::{Result, ResumeAnalyserError};
use crate::input::file_detector::DocumentFormat;
use log::{debug, warn};
use pulldown_cmark::{Event, Parser, Tag};
use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;
use std::io::{Cursor, Read};

pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// Whole-document PDF extraction; pages come out in document order.
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        // pdf-extract panics on some malformed inputs instead of returning an error
        let outcome = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));

        match outcome {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ResumeAnalyserError::DocumentParse(format!(
                "Failed to extract text from PDF: {}",
                e
            ))),
            Err(_) => Err(ResumeAnalyserError::DocumentParse(
                "Failed to extract text from PDF: document is malformed".to_string(),
            )),
        }
    }
}

/// Reads the body paragraphs of a Word (.docx) document.
///
/// Paragraph text is the concatenation of its runs, with `w:tab` rendered as a
/// tab and `w:br`/`w:cr` as a line break. Paragraphs inside tables are skipped,
/// as is anything under a drawing, picture or text box.
/// Paragraphs are joined with a single newline.
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
            ResumeAnalyserError::DocumentParse(format!("Failed to open DOCX archive: {}", e))
        })?;

        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .map_err(|e| {
                ResumeAnalyserError::DocumentParse(format!("DOCX has no main document part: {}", e))
            })?
            .read_to_string(&mut xml)
            .map_err(|e| {
                ResumeAnalyserError::DocumentParse(format!("Failed to read DOCX document part: {}", e))
            })?;

        let paragraphs = Self::paragraphs(&xml)?;
        debug!("Extracted {} paragraphs from DOCX", paragraphs.len());
        Ok(paragraphs.join("\n"))
    }
}

impl DocxExtractor {
    fn paragraphs(xml: &str) -> Result<Vec<String>> {
        let mut reader = Reader::from_str(xml);
        let mut paragraphs = Vec::new();
        let mut current = String::new();
        let mut paragraph_depth = 0usize;
        let mut table_depth = 0usize;
        let mut run_depth = 0usize;
        let mut in_text = false;
        // drawings and text boxes carry their own paragraphs, and
        // AlternateContent repeats them in the fallback branch
        let mut skip_depth = 0usize;

        loop {
            let event = reader.read_event().map_err(|e| {
                ResumeAnalyserError::DocumentParse(format!(
                    "Malformed DOCX XML at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            })?;

            if skip_depth > 0 {
                match event {
                    XmlEvent::Start(_) => skip_depth += 1,
                    XmlEvent::End(_) => skip_depth -= 1,
                    XmlEvent::Eof => break,
                    _ => {}
                }
                continue;
            }

            match event {
                XmlEvent::Start(e) => match e.local_name().as_ref() {
                    b"AlternateContent" | b"drawing" | b"pict" | b"object" | b"txbxContent" => {
                        skip_depth = 1;
                    }
                    b"tbl" => table_depth += 1,
                    b"p" if table_depth == 0 => {
                        if paragraph_depth == 0 {
                            current.clear();
                        }
                        paragraph_depth += 1;
                    }
                    b"r" => run_depth += 1,
                    b"t" => in_text = true,
                    _ => {}
                },
                XmlEvent::Empty(e) => match e.local_name().as_ref() {
                    b"p" if table_depth == 0 && paragraph_depth == 0 => {
                        paragraphs.push(String::new());
                    }
                    b"tab" if paragraph_depth > 0 && run_depth > 0 => current.push('\t'),
                    b"br" | b"cr" if paragraph_depth > 0 && run_depth > 0 => current.push('\n'),
                    _ => {}
                },
                XmlEvent::End(e) => match e.local_name().as_ref() {
                    b"tbl" => table_depth = table_depth.saturating_sub(1),
                    b"p" if table_depth == 0 && paragraph_depth > 0 => {
                        paragraph_depth -= 1;
                        if paragraph_depth == 0 {
                            paragraphs.push(std::mem::take(&mut current));
                        }
                    }
                    b"r" => run_depth = run_depth.saturating_sub(1),
                    b"t" => in_text = false,
                    _ => {}
                },
                XmlEvent::Text(e) if in_text && paragraph_depth > 0 => {
                    let text = e.unescape().map_err(|e| {
                        ResumeAnalyserError::DocumentParse(format!("Invalid DOCX text: {}", e))
                    })?;
                    current.push_str(&text);
                }
                XmlEvent::Eof => break,
                _ => {}
            }
        }

        Ok(paragraphs)
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ResumeAnalyserError::DocumentParse(format!("Text file is not valid UTF-8: {}", e)))
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let markdown_content = PlainTextExtractor.extract(bytes)?;
        Ok(Self::markdown_to_text(&markdown_content))
    }
}

impl MarkdownExtractor {
    fn markdown_to_text(markdown: &str) -> String {
        let mut text = String::new();

        for event in Parser::new(markdown) {
            match event {
                Event::Text(t) | Event::Code(t) => text.push_str(&t),
                Event::SoftBreak | Event::HardBreak => text.push('\n'),
                Event::End(Tag::Paragraph)
                | Event::End(Tag::Heading(..))
                | Event::End(Tag::Item)
                | Event::End(Tag::CodeBlock(_)) => text.push('\n'),
                _ => {}
            }
        }

        text.lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Extract text from bytes of the given format.
pub fn extract_with_format(format: DocumentFormat, bytes: &[u8]) -> Result<String> {
    match format {
        DocumentFormat::Pdf => PdfExtractor.extract(bytes),
        DocumentFormat::Docx => DocxExtractor.extract(bytes),
        DocumentFormat::Text => PlainTextExtractor.extract(bytes),
        DocumentFormat::Markdown => MarkdownExtractor.extract(bytes),
        DocumentFormat::Unknown => Err(ResumeAnalyserError::UnsupportedFormat(
            "unrecognised document format".to_string(),
        )),
    }
}

/// Extract text from an uploaded resume.
///
/// Only `pdf` and `docx` are accepted; any other extension yields an empty
/// string rather than an error. Parse failures of supported formats are
/// returned to the caller.
pub fn extract_document(bytes: &[u8], extension: &str) -> Result<String> {
    let format = DocumentFormat::from_extension(extension);
    if !format.is_resume_format() {
        warn!("Unsupported document extension '{}', using empty text", extension);
        return Ok(String::new());
    }
    extract_with_format(format, bytes)
}
