//! PDF text extraction with a fast primary source and a robust fallback.
//!
//! lopdf reads content streams in-process and is used first. When it fails,
//! or yields no more than [`MIN_TEXT_CHARS`] characters of text, pdftohtml
//! re-reads the same page range.

use std::path::Path;

use lopdf::Document;

use mindmap_core::document::{DocumentFormat, ExtractedText};
use mindmap_core::error::{MindmapError, Result};
use mindmap_core::options::PdfEngine;

use crate::pdftohtml;
use crate::text_builder;

/// Below or at this many characters of trimmed text, the primary result is discarded.
pub const MIN_TEXT_CHARS: usize = 100;

/// Page count between progress log lines.
const PROGRESS_EVERY: usize = 10;

/// One way of turning PDF pages into text.
pub trait PageTextSource {
    fn name(&self) -> &str;

    /// Text of pages `1..=max_pages` (all pages when `None`), in page order.
    fn extract_pages(&self, path: &Path, max_pages: Option<u32>) -> Result<Vec<String>>;
}

/// A page limit of zero means no limit.
pub(crate) fn page_limit(max_pages: Option<u32>) -> Option<u32> {
    max_pages.filter(|&max| max > 0)
}

/// Number of pages to process given the document's total.
fn pages_to_process(total: usize, max_pages: Option<u32>) -> usize {
    match page_limit(max_pages) {
        Some(max) => total.min(max as usize),
        None => total,
    }
}

/// In-process extraction with lopdf. Blank pages are dropped.
pub struct LopdfSource;

impl PageTextSource for LopdfSource {
    fn name(&self) -> &str {
        "lopdf"
    }

    fn extract_pages(&self, path: &Path, max_pages: Option<u32>) -> Result<Vec<String>> {
        log::info!("Reading PDF (lopdf): {}", path.display());

        let doc = Document::load(path)
            .map_err(|e| MindmapError::Pdf(format!("Failed to load PDF: {}", e)))?;

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        let total = page_numbers.len();
        let count = pages_to_process(total, max_pages);
        log::info!("PDF has {} pages, processing {}", total, count);

        let mut texts = Vec::new();
        for (i, page_num) in page_numbers.iter().take(count).enumerate() {
            if (i + 1) % PROGRESS_EVERY == 0 {
                log::info!("Processing page {}/{}", i + 1, count);
            }
            let text = doc.extract_text(&[*page_num]).map_err(|e| {
                MindmapError::Pdf(format!("Failed to extract page {}: {}", page_num, e))
            })?;
            if !text.trim().is_empty() {
                texts.push(text);
            }
        }

        log::info!(
            "lopdf extraction done: {} pages with text, {} characters",
            texts.len(),
            texts.iter().map(|t| t.chars().count()).sum::<usize>()
        );
        Ok(texts)
    }
}

/// Extraction through poppler's `pdftohtml -xml`. Empty pages are dropped.
pub struct PdftohtmlSource;

impl PageTextSource for PdftohtmlSource {
    fn name(&self) -> &str {
        "pdftohtml"
    }

    fn extract_pages(&self, path: &Path, max_pages: Option<u32>) -> Result<Vec<String>> {
        log::info!("Reading PDF (pdftohtml): {}", path.display());

        let pages = pdftohtml::run_pdftohtml_xml(path, max_pages)?;
        let count = pages_to_process(pages.len(), max_pages);

        let mut texts = Vec::new();
        for (i, page) in pages.iter().take(count).enumerate() {
            if (i + 1) % PROGRESS_EVERY == 0 {
                log::info!("Processing page {}/{}", i + 1, count);
            }
            let text = text_builder::page_text(page);
            if !text.is_empty() {
                texts.push(text);
            }
        }

        log::info!("pdftohtml extraction done: {} pages with text", texts.len());
        Ok(texts)
    }
}

/// Run `primary`, falling back to `fallback` over the same page range when
/// the primary fails or returns too little text. Pages are joined with a
/// blank line.
pub fn extract_with_fallback(
    primary: &dyn PageTextSource,
    fallback: &dyn PageTextSource,
    path: &Path,
    max_pages: Option<u32>,
) -> Result<ExtractedText> {
    let max_pages = page_limit(max_pages);
    match primary.extract_pages(path, max_pages) {
        Ok(pages) => {
            let text = ExtractedText::from_segments(DocumentFormat::Pdf, &pages, "\n\n");
            if text.text.trim().chars().count() > MIN_TEXT_CHARS {
                return Ok(text);
            }
            log::info!(
                "{} extracted too little text, trying {}",
                primary.name(),
                fallback.name()
            );
        }
        Err(e) => {
            log::warn!("{} failed: {}, trying {}", primary.name(), e, fallback.name());
        }
    }

    let pages = fallback.extract_pages(path, max_pages)?;
    Ok(ExtractedText::from_segments(DocumentFormat::Pdf, &pages, "\n\n"))
}

/// Extract PDF text with the configured engine.
pub fn extract_pdf_text(
    path: &Path,
    max_pages: Option<u32>,
    engine: PdfEngine,
) -> Result<ExtractedText> {
    let max_pages = page_limit(max_pages);
    let single = |source: &dyn PageTextSource| -> Result<ExtractedText> {
        let pages = source.extract_pages(path, max_pages)?;
        Ok(ExtractedText::from_segments(DocumentFormat::Pdf, &pages, "\n\n"))
    };

    match engine {
        PdfEngine::Auto => extract_with_fallback(&LopdfSource, &PdftohtmlSource, path, max_pages),
        PdfEngine::Lopdf => single(&LopdfSource),
        PdfEngine::Pdftohtml => single(&PdftohtmlSource),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Canned source that records the page limits it was called with.
    struct FakeSource {
        name: &'static str,
        result: std::result::Result<Vec<String>, String>,
        calls: RefCell<Vec<Option<u32>>>,
    }

    impl FakeSource {
        fn ok(name: &'static str, pages: &[&str]) -> Self {
            Self {
                name,
                result: Ok(pages.iter().map(|s| s.to_string()).collect()),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn failing(name: &'static str) -> Self {
            Self {
                name,
                result: Err("broken xref table".to_string()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageTextSource for FakeSource {
        fn name(&self) -> &str {
            self.name
        }

        fn extract_pages(&self, _path: &Path, max_pages: Option<u32>) -> Result<Vec<String>> {
            self.calls.borrow_mut().push(max_pages);
            self.result.clone().map_err(MindmapError::Pdf)
        }
    }

    #[test]
    fn test_primary_with_enough_text_wins() {
        let long = "x".repeat(101);
        let primary = FakeSource::ok("primary", &[&long]);
        let fallback = FakeSource::ok("fallback", &["unused"]);

        let text = extract_with_fallback(&primary, &fallback, Path::new("a.pdf"), None).unwrap();
        assert_eq!(text.text, long);
        assert!(fallback.calls.borrow().is_empty());
    }

    #[test]
    fn test_short_primary_falls_back_with_same_range() {
        // 100 characters after trimming is not enough
        let short = format!("  {}  ", "y".repeat(100));
        let primary = FakeSource::ok("primary", &[&short]);
        let fallback = FakeSource::ok("fallback", &["page one", "page two"]);

        let text =
            extract_with_fallback(&primary, &fallback, Path::new("a.pdf"), Some(12)).unwrap();
        assert_eq!(text.text, "page one\n\npage two");
        assert_eq!(text.segment_count, 2);
        assert_eq!(*primary.calls.borrow(), vec![Some(12)]);
        assert_eq!(*fallback.calls.borrow(), vec![Some(12)]);
    }

    #[test]
    fn test_empty_primary_falls_back() {
        let primary = FakeSource::ok("primary", &[]);
        let fallback = FakeSource::ok("fallback", &["scanned text"]);
        let text = extract_with_fallback(&primary, &fallback, Path::new("a.pdf"), None).unwrap();
        assert_eq!(text.text, "scanned text");
    }

    #[test]
    fn test_primary_error_falls_back() {
        let primary = FakeSource::failing("primary");
        let fallback = FakeSource::ok("fallback", &["recovered"]);
        let text = extract_with_fallback(&primary, &fallback, Path::new("a.pdf"), Some(3)).unwrap();
        assert_eq!(text.text, "recovered");
        assert_eq!(*fallback.calls.borrow(), vec![Some(3)]);
    }

    #[test]
    fn test_both_fail_propagates_fallback_error() {
        let primary = FakeSource::failing("primary");
        let fallback = FakeSource::failing("fallback");
        let err = extract_with_fallback(&primary, &fallback, Path::new("a.pdf"), None).unwrap_err();
        assert!(matches!(err, MindmapError::Pdf(_)));
    }

    #[test]
    fn test_pages_to_process() {
        assert_eq!(pages_to_process(20, None), 20);
        assert_eq!(pages_to_process(20, Some(5)), 5);
        assert_eq!(pages_to_process(3, Some(5)), 3);
        assert_eq!(pages_to_process(20, Some(0)), 20);
    }

    #[test]
    fn test_zero_page_limit_reads_every_page() {
        assert_eq!(page_limit(Some(0)), None);
        assert_eq!(page_limit(Some(7)), Some(7));

        let primary = FakeSource::ok("primary", &[]);
        let fallback = FakeSource::ok("fallback", &["whole book"]);
        let text = extract_with_fallback(&primary, &fallback, Path::new("a.pdf"), Some(0)).unwrap();
        assert_eq!(text.text, "whole book");
        assert_eq!(*primary.calls.borrow(), vec![None]);
        assert_eq!(*fallback.calls.borrow(), vec![None]);
    }

    #[test]
    fn test_lopdf_missing_file() {
        let err = LopdfSource
            .extract_pages(Path::new("/nonexistent/book.pdf"), None)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to load PDF"));
    }
}
