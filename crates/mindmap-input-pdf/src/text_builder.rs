//! Plain-text reconstruction for pdftohtml pages.
//!
//! Groups positioned text elements into lines and joins lines with newlines.

use std::cmp::Ordering;

use crate::pdftohtml::{PdfPage, TextElement};

/// Elements whose tops differ by less than this share a line (pixels).
const LINE_TOLERANCE: f64 = 3.0;

/// Horizontal gap above which two fragments on a line get a space (pixels).
const WORD_GAP: f64 = 1.0;

#[derive(Debug)]
struct TextLine {
    top: f64,
    /// (left, right, text), sorted by left.
    fragments: Vec<(f64, f64, String)>,
}

impl TextLine {
    fn render(&self) -> String {
        let mut out = String::new();
        let mut prev_right: Option<f64> = None;
        for (left, right, text) in &self.fragments {
            if let Some(pr) = prev_right {
                if left - pr > WORD_GAP && !out.ends_with(' ') && !text.starts_with(' ') {
                    out.push(' ');
                }
            }
            out.push_str(text);
            prev_right = Some(*right);
        }
        out.trim_end().to_string()
    }
}

/// Reconstruct the page text, one output line per visual line.
pub fn page_text(page: &PdfPage) -> String {
    group_into_lines(&page.text_elements)
        .iter()
        .map(TextLine::render)
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Group text elements into lines based on vertical position.
fn group_into_lines(elements: &[TextElement]) -> Vec<TextLine> {
    // Sort by top position, then left
    let mut sorted: Vec<_> = elements.iter().collect();
    sorted.sort_by(|a, b| {
        a.top
            .partial_cmp(&b.top)
            .unwrap_or(Ordering::Equal)
            .then(a.left.partial_cmp(&b.left).unwrap_or(Ordering::Equal))
    });

    let mut lines: Vec<TextLine> = Vec::new();

    for elem in sorted {
        if elem.text.trim().is_empty() {
            continue;
        }
        let fragment = (elem.left, elem.left + elem.width, elem.text.clone());

        match lines
            .iter_mut()
            .find(|line| (line.top - elem.top).abs() < LINE_TOLERANCE)
        {
            Some(line) => line.fragments.push(fragment),
            None => lines.push(TextLine {
                top: elem.top,
                fragments: vec![fragment],
            }),
        }
    }

    for line in &mut lines {
        line.fragments
            .sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    }
    lines.sort_by(|a, b| a.top.partial_cmp(&b.top).unwrap_or(Ordering::Equal));

    lines
}
