use thiserror::Error;

#[derive(Error, Debug)]
pub enum MindmapError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(String),

    #[error("DOCX error: {0}")]
    Docx(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Outline generation error: {0}")]
    Generation(String),

    #[error("XMind conversion error: {0}")]
    Conversion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MindmapError>;
