//! Plugin traits for the three pipeline stages.

use std::path::{Path, PathBuf};

use crate::document::{DocumentFormat, ExtractedText};
use crate::error::Result;
use crate::options::MindmapConfig;

/// Progress reporter callback type.
pub type ProgressReporter = Box<dyn Fn(f64, &str) + Send + Sync>;

/// Input format plugin: pulls plain text out of a source document.
pub trait InputPlugin: Send + Sync {
    /// Human-readable name of this plugin.
    fn name(&self) -> &str;

    /// File formats this plugin handles.
    fn supported_formats(&self) -> &[DocumentFormat];

    /// Extract the document's text.
    fn extract(&self, input_path: &Path, config: &MindmapConfig) -> Result<ExtractedText>;
}

/// Turns extracted text into outline Markdown.
pub trait OutlineGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Produce the outline Markdown for `text`, titled `title`.
    fn generate(&self, text: &str, title: &str, config: &MindmapConfig) -> Result<String>;
}

/// Output format plugin: converts a written Markdown outline to another file.
pub trait OutputPlugin: Send + Sync {
    /// Human-readable name of this plugin.
    fn name(&self) -> &str;

    /// Convert `markdown_path` into a file inside `output_dir` and return its path.
    fn convert(
        &self,
        markdown_path: &Path,
        output_dir: &Path,
        config: &MindmapConfig,
    ) -> Result<PathBuf>;
}
