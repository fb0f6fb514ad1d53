//! Run `pdftohtml -xml` and parse its XML output.
//!
//! pdftohtml (poppler) is slower than reading content streams in-process but
//! copes with fonts and encodings lopdf cannot decode. Only positioned text
//! is kept; images are never extracted (`-i`).

use std::path::Path;
use std::process::Command;

use quick_xml::events::Event;
use quick_xml::Reader;

use mindmap_core::error::{MindmapError, Result};
use mindmap_utils::xml::parse_attrs;

/// A text element on a page.
#[derive(Debug, Clone)]
pub struct TextElement {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    /// Text with inline markup (`<b>`, `<i>`, `<a>`) already stripped.
    pub text: String,
}

/// A single page from the pdftohtml XML output.
#[derive(Debug, Clone)]
pub struct PdfPage {
    pub number: u32,
    pub text_elements: Vec<TextElement>,
}

/// Check that pdftohtml is available on the system.
pub fn check_pdftohtml() -> Result<()> {
    let which = Command::new("which")
        .arg("pdftohtml")
        .output()
        .map_err(|e| MindmapError::Pdf(format!("Failed to check for pdftohtml: {}", e)))?;

    if !which.status.success() {
        return Err(MindmapError::Pdf(
            "pdftohtml (poppler-utils) is required for the PDF fallback. \
             Install with: brew install poppler (macOS) or apt install poppler-utils (Linux)"
                .to_string(),
        ));
    }
    Ok(())
}

/// Run `pdftohtml -xml` over pages `1..=last_page` (all pages when `None`).
pub fn run_pdftohtml_xml(pdf_path: &Path, last_page: Option<u32>) -> Result<Vec<PdfPage>> {
    check_pdftohtml()?;

    let tmp_dir = tempfile::TempDir::new()
        .map_err(|e| MindmapError::Pdf(format!("Failed to create temp dir: {}", e)))?;

    let output_base = tmp_dir.path().join("output");
    let output_base_str = output_base
        .to_str()
        .ok_or_else(|| MindmapError::Pdf("Invalid temp path".to_string()))?;

    log::info!("Running pdftohtml -xml on {}...", pdf_path.display());

    let mut cmd = Command::new("pdftohtml");
    cmd.arg("-xml")
        .arg("-enc")
        .arg("UTF-8")
        .arg("-i")
        .arg("-noframes")
        .arg("-nodrm");
    if let Some(last) = crate::extract::page_limit(last_page) {
        cmd.arg("-f").arg("1").arg("-l").arg(last.to_string());
    }
    let output = cmd
        .arg(pdf_path.as_os_str())
        .arg(output_base_str)
        .output()
        .map_err(|e| MindmapError::Pdf(format!("Failed to run pdftohtml: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MindmapError::Pdf(format!("pdftohtml failed: {}", stderr)));
    }

    // The XML file is at output_base.xml
    let xml_path = tmp_dir.path().join("output.xml");
    let xml_content = std::fs::read_to_string(&xml_path).map_err(|e| {
        MindmapError::Pdf(format!(
            "Failed to read pdftohtml XML output at {}: {}",
            xml_path.display(),
            e
        ))
    })?;

    let pages = parse_pdftohtml_xml(&xml_content)?;
    log::info!("pdftohtml: {} pages", pages.len());
    Ok(pages)
}

/// Parse the pdftohtml XML output.
pub fn parse_pdftohtml_xml(xml: &str) -> Result<Vec<PdfPage>> {
    let mut reader = Reader::from_str(xml);
    let mut pages: Vec<PdfPage> = Vec::new();

    let mut current_page: Option<PdfPage> = None;
    let mut current_text: Option<TextElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let tag = e.local_name();
                match std::str::from_utf8(tag.as_ref()).unwrap_or("") {
                    "page" => {
                        let attrs = parse_attrs(e);
                        current_page = Some(PdfPage {
                            number: attrs
                                .get("number")
                                .and_then(|v| v.parse().ok())
                                .unwrap_or(0),
                            text_elements: Vec::new(),
                        });
                    }
                    "text" => {
                        let attrs = parse_attrs(e);
                        let num = |key: &str| -> f64 {
                            attrs.get(key).and_then(|v| v.parse().ok()).unwrap_or(0.0)
                        };
                        current_text = Some(TextElement {
                            top: num("top"),
                            left: num("left"),
                            width: num("width"),
                            height: num("height"),
                            text: String::new(),
                        });
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(ref mut te) = current_text {
                    let text = e
                        .unescape()
                        .map_err(|err| MindmapError::Pdf(format!("pdftohtml XML: {}", err)))?;
                    te.text.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                let tag = e.local_name();
                match std::str::from_utf8(tag.as_ref()).unwrap_or("") {
                    "page" => {
                        if let Some(page) = current_page.take() {
                            pages.push(page);
                        }
                    }
                    "text" => {
                        if let (Some(te), Some(page)) = (current_text.take(), current_page.as_mut())
                        {
                            page.text_elements.push(te);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("XML parse warning: {}", e);
                break;
            }
            _ => {}
        }
    }

    pages.sort_by_key(|p| p.number);
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_xml() {
        let xml = r##"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE pdf2xml SYSTEM "pdf2xml.dtd">
<pdf2xml>
<page number="1" position="absolute" top="0" left="0" height="792" width="612">
<fontspec id="0" size="12" family="TimesNewRomanPSMT" color="#000000"/>
<text top="100" left="50" width="200" height="14" font="0">Hello <b>world</b></text>
<text top="120" left="50" width="80" height="14" font="0">A &amp; B</text>
</page>
</pdf2xml>"##;

        let pages = parse_pdftohtml_xml(xml).unwrap();
        assert_eq!(pages.len(), 1);
        let page = &pages[0];
        assert_eq!(page.number, 1);
        assert_eq!(page.text_elements.len(), 2);
        assert_eq!(page.text_elements[0].text, "Hello world");
        assert_eq!(page.text_elements[0].top, 100.0);
        assert_eq!(page.text_elements[1].text, "A & B");
    }

    #[test]
    fn test_parse_multiple_pages_in_order() {
        let xml = r##"<?xml version="1.0" encoding="UTF-8"?>
<pdf2xml>
<page number="2" width="612" height="792">
<text top="100" left="50" width="200" height="16" font="0">Page two</text>
</page>
<page number="1" width="612" height="792">
<text top="100" left="50" width="200" height="16" font="0">Page one</text>
</page>
<page number="3" width="612" height="792">
</page>
</pdf2xml>"##;

        let pages = parse_pdftohtml_xml(xml).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].text_elements[0].text, "Page one");
        assert_eq!(pages[1].text_elements[0].text, "Page two");
        assert!(pages[2].text_elements.is_empty());
    }
}
