//! Source formats and the extracted-text value that flows between stages.

/// File formats the tool reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Docx,
    Pdf,
    Markdown,
    Xmind,
}

impl DocumentFormat {
    /// Parse from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "docx" => Some(Self::Docx),
            "pdf" => Some(Self::Pdf),
            "md" | "markdown" => Some(Self::Markdown),
            "xmind" => Some(Self::Xmind),
            _ => None,
        }
    }

    /// Detect the format of a path from its extension.
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Get the canonical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pdf => "pdf",
            Self::Markdown => "md",
            Self::Xmind => "xmind",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension().to_uppercase())
    }
}

/// Text pulled out of a source document.
///
/// Segments are paragraphs, table cells or pages, in source order. They are
/// only ever concatenated, never edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub format: DocumentFormat,
    pub text: String,
    pub segment_count: usize,
}

impl ExtractedText {
    /// Join segments with `separator`.
    pub fn from_segments(format: DocumentFormat, segments: &[String], separator: &str) -> Self {
        Self {
            format,
            text: segments.join(separator),
            segment_count: segments.len(),
        }
    }

    /// True when the text holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Length in characters (not bytes).
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Return the longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("DOCX"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_extension("markdown"), Some(DocumentFormat::Markdown));
        assert_eq!(DocumentFormat::from_extension("doc"), None);
        assert_eq!(DocumentFormat::Pdf.to_string(), "PDF");
    }

    #[test]
    fn test_from_segments() {
        let segments = vec!["a".to_string(), "b".to_string()];
        let text = ExtractedText::from_segments(DocumentFormat::Pdf, &segments, "\n\n");
        assert_eq!(text.text, "a\n\nb");
        assert_eq!(text.segment_count, 2);
        assert!(!text.is_blank());

        let empty = ExtractedText::from_segments(DocumentFormat::Docx, &[], "\n");
        assert!(empty.is_blank());
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("第一章绪论", 3), "第一章");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
