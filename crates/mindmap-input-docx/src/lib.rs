//! DOCX input plugin — reads the text of Word documents.
//!
//! DOCX is a ZIP archive containing Office Open XML. Only
//! `word/document.xml` is read: body paragraphs first, then table cells.

mod document;

use std::path::Path;

use mindmap_core::document::{DocumentFormat, ExtractedText};
use mindmap_core::error::{MindmapError, Result};
use mindmap_core::options::MindmapConfig;
use mindmap_core::plugin::InputPlugin;
use mindmap_utils::archive::ZipReader;

pub use document::{extract_document_text, DocxContent};

const DOCUMENT_PART: &str = "word/document.xml";

pub struct DocxInputPlugin;

impl InputPlugin for DocxInputPlugin {
    fn name(&self) -> &str {
        "DOCX Input"
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Docx]
    }

    fn extract(&self, input_path: &Path, _config: &MindmapConfig) -> Result<ExtractedText> {
        extract_docx_text(input_path)
    }
}

/// Read a Word document and join its paragraphs and cells with newlines.
pub fn extract_docx_text(path: &Path) -> Result<ExtractedText> {
    log::info!("Reading DOCX: {}", path.display());

    let mut archive = ZipReader::open(path)
        .map_err(|e| MindmapError::Docx(format!("Cannot open {}: {}", path.display(), e)))?;

    let xml = archive
        .read_string(DOCUMENT_PART)
        .map_err(|e| MindmapError::Docx(format!("Missing {}: {}", DOCUMENT_PART, e)))?;

    let content = extract_document_text(&xml)?;
    let text = ExtractedText::from_segments(DocumentFormat::Docx, &content.segments(), "\n");

    log::info!(
        "DOCX text extracted: {} paragraphs ({} non-empty), {} table cells, {} characters",
        content.paragraph_total,
        content.paragraphs.len(),
        content.cells.len(),
        text.char_count()
    );

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tests::{document_xml, para};
    use mindmap_utils::archive::ZipBuilder;

    fn write_docx(dir: &Path, name: &str, document: Option<&str>) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut zip = ZipBuilder::new(&path).unwrap();
        zip.add_file(
            "[Content_Types].xml",
            br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#,
        )
        .unwrap();
        if let Some(xml) = document {
            zip.add_file(DOCUMENT_PART, xml.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        path
    }

    #[test]
    fn test_lines_are_paragraphs_then_cells() {
        let tmp = tempfile::tempdir().unwrap();
        let body = format!(
            "{}{}<w:tbl><w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl>{}",
            para("p1"),
            para(""),
            para("c1"),
            para("c2"),
            para("p2"),
        );
        let path = write_docx(tmp.path(), "sample.docx", Some(&document_xml(&body)));

        let text = DocxInputPlugin
            .extract(&path, &MindmapConfig::default())
            .unwrap();
        let lines: Vec<&str> = text.text.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines, vec!["p1", "p2", "c1", "c2"]);
        assert_eq!(text.segment_count, 4);
        assert_eq!(text.format, DocumentFormat::Docx);
    }

    #[test]
    fn test_many_paragraphs_keep_order() {
        let tmp = tempfile::tempdir().unwrap();
        let body: String = (0..250).map(|i| para(&format!("第{}段", i))).collect();
        let path = write_docx(tmp.path(), "long.docx", Some(&document_xml(&body)));

        let text = extract_docx_text(&path).unwrap();
        let lines: Vec<&str> = text.text.lines().collect();
        assert_eq!(lines.len(), 250);
        assert_eq!(lines[0], "第0段");
        assert_eq!(lines[249], "第249段");
    }

    #[test]
    fn test_missing_file() {
        let err = extract_docx_text(Path::new("/nonexistent/file.docx")).unwrap_err();
        assert!(matches!(err, MindmapError::Docx(_)));
    }

    #[test]
    fn test_not_a_zip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.docx");
        std::fs::write(&path, "plain text pretending to be docx").unwrap();
        assert!(matches!(
            extract_docx_text(&path),
            Err(MindmapError::Docx(_))
        ));
    }

    #[test]
    fn test_missing_document_part() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_docx(tmp.path(), "hollow.docx", None);
        let err = extract_docx_text(&path).unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }
}
