//! PDF input plugin — extracts page text from PDF files.

mod extract;
pub mod pdftohtml;
mod text_builder;

use std::path::Path;

use mindmap_core::document::{DocumentFormat, ExtractedText};
use mindmap_core::error::Result;
use mindmap_core::options::MindmapConfig;
use mindmap_core::plugin::InputPlugin;

pub use extract::{
    extract_pdf_text, extract_with_fallback, LopdfSource, PageTextSource, PdftohtmlSource,
    MIN_TEXT_CHARS,
};

pub struct PdfInputPlugin;

impl InputPlugin for PdfInputPlugin {
    fn name(&self) -> &str {
        "PDF Input"
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Pdf]
    }

    fn extract(&self, input_path: &Path, config: &MindmapConfig) -> Result<ExtractedText> {
        extract_pdf_text(input_path, config.pdf_max_pages, config.pdf_engine)
    }
}
