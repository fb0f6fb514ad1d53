//! Pull plain text out of `word/document.xml`.
//!
//! Collects two streams in document order:
//! - top-level body paragraphs (`w:body/w:p`)
//! - cells of top-level tables (`w:body/w:tbl/w:tr/w:tc`), each cell being
//!   its direct paragraphs joined with newlines
//!
//! Cells are read per grid column: a cell spanning `w:gridSpan` columns is
//! repeated once per column, and a `w:vMerge` continuation repeats the text
//! of the cell above it.
//!
//! Paragraph text is the run text (`w:t`) with `w:tab` as a tab and
//! `w:br`/`w:cr` as a newline. Deleted runs (`w:delText`), text boxes and
//! paragraphs inside content controls or nested tables are left out.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use mindmap_core::error::{MindmapError, Result};
use mindmap_utils::xml::{local_name, parse_attrs};

/// Paragraph count between progress log lines.
const PROGRESS_EVERY: usize = 100;

/// Text collected from one document body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DocxContent {
    /// Non-empty, trimmed body paragraphs.
    pub paragraphs: Vec<String>,
    /// Non-empty, trimmed table cells.
    pub cells: Vec<String>,
    /// Body paragraphs seen, empty ones included.
    pub paragraph_total: usize,
}

impl DocxContent {
    /// Paragraphs first, then cells.
    pub fn segments(&self) -> Vec<String> {
        self.paragraphs
            .iter()
            .chain(self.cells.iter())
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParaKind {
    Body,
    Cell,
    /// Text boxes, content controls, nested tables: not collected.
    Other,
}

struct ParaFrame {
    kind: ParaKind,
    text: String,
}

/// Parse the main document part.
pub fn extract_document_text(xml: &str) -> Result<DocxContent> {
    let mut reader = Reader::from_str(xml);
    let mut state = ExtractState::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => state.handle_start(e),
            Ok(Event::Empty(ref e)) => state.handle_empty(e),
            Ok(Event::Text(ref e)) => {
                if state.in_text {
                    let text = e
                        .unescape()
                        .map_err(|err| MindmapError::Xml(format!("document.xml: {}", err)))?;
                    state.push_text(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                let local = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                state.handle_end(&local);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(MindmapError::Xml(format!(
                    "document.xml at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(state.content)
}

#[derive(Default)]
struct ExtractState {
    /// Local names of currently open elements.
    stack: Vec<String>,
    paras: Vec<ParaFrame>,
    table_depth: usize,
    cell_paras: Vec<String>,
    /// Grid columns covered by the open top-level cell.
    grid_span: usize,
    /// The open top-level cell continues a vertical merge.
    merge_continue: bool,
    /// Per-column texts of the previous and current top-level rows.
    prev_row: Vec<String>,
    cur_row: Vec<String>,
    in_text: bool,
    content: DocxContent,
}

impl ExtractState {
    fn parent(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    fn para_kind(&self) -> ParaKind {
        match self.parent() {
            Some("body") => ParaKind::Body,
            Some("tc") if self.table_depth == 1 => ParaKind::Cell,
            _ => ParaKind::Other,
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(para) = self.paras.last_mut() {
            para.text.push_str(text);
        }
    }

    fn handle_start(&mut self, e: &BytesStart) {
        let local = local_name(e);
        match local.as_str() {
            "p" => {
                let kind = self.para_kind();
                self.paras.push(ParaFrame {
                    kind,
                    text: String::new(),
                });
            }
            "tbl" => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.prev_row.clear();
                    self.cur_row.clear();
                }
            }
            "tr" if self.table_depth == 1 => self.cur_row.clear(),
            "tc" if self.table_depth == 1 => {
                self.cell_paras.clear();
                self.grid_span = 1;
                self.merge_continue = false;
            }
            "t" if self.parent() == Some("r") => self.in_text = true,
            "gridSpan" | "vMerge" => self.handle_cell_property(&local, e),
            _ => {}
        }
        self.stack.push(local);
    }

    fn handle_empty(&mut self, e: &BytesStart) {
        let local = local_name(e);
        let in_run = self.parent() == Some("r");
        match local.as_str() {
            "tab" if in_run => self.push_text("\t"),
            "br" | "cr" if in_run => self.push_text("\n"),
            "gridSpan" | "vMerge" => self.handle_cell_property(&local, e),
            "p" => {
                // Self-closing paragraph: counts, contributes no text
                let kind = self.para_kind();
                self.finish_paragraph(ParaFrame {
                    kind,
                    text: String::new(),
                });
            }
            _ => {}
        }
    }

    /// `w:tcPr/w:gridSpan` and `w:tcPr/w:vMerge` of a top-level cell.
    fn handle_cell_property(&mut self, local: &str, e: &BytesStart) {
        if self.table_depth != 1 || self.parent() != Some("tcPr") {
            return;
        }
        let val = parse_attrs(e).remove("val");
        match local {
            "gridSpan" => {
                self.grid_span = val
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(1)
                    .max(1);
            }
            "vMerge" => {
                // A missing val means "continue"
                self.merge_continue = val.as_deref().map_or(true, |v| v == "continue");
            }
            _ => {}
        }
    }

    fn handle_end(&mut self, local: &str) {
        self.stack.pop();
        match local {
            "t" => self.in_text = false,
            "p" => {
                if let Some(para) = self.paras.pop() {
                    self.finish_paragraph(para);
                }
            }
            "tc" if self.table_depth == 1 => self.finish_cell(),
            "tr" if self.table_depth == 1 => {
                self.prev_row = std::mem::take(&mut self.cur_row);
            }
            "tbl" => self.table_depth = self.table_depth.saturating_sub(1),
            _ => {}
        }
    }

    fn finish_cell(&mut self) {
        let own = self.cell_paras.join("\n").trim().to_string();
        self.cell_paras.clear();

        for _ in 0..self.grid_span {
            let column = self.cur_row.len();
            let text = if self.merge_continue {
                self.prev_row.get(column).cloned().unwrap_or_default()
            } else {
                own.clone()
            };
            if !text.is_empty() {
                self.content.cells.push(text.clone());
            }
            self.cur_row.push(text);
        }
    }

    fn finish_paragraph(&mut self, para: ParaFrame) {
        match para.kind {
            ParaKind::Body => {
                self.content.paragraph_total += 1;
                let text = para.text.trim();
                if !text.is_empty() {
                    self.content.paragraphs.push(text.to_string());
                }
                if self.content.paragraph_total % PROGRESS_EVERY == 0 {
                    log::info!("Processed paragraph {}", self.content.paragraph_total);
                }
            }
            ParaKind::Cell => self.cell_paras.push(para.text),
            ParaKind::Other => {}
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Wrap body XML in a minimal `w:document`.
    pub(crate) fn document_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr/></w:body></w:document>"#,
            body
        )
    }

    pub(crate) fn para(text: &str) -> String {
        format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, text)
    }

    fn cell(inner: &str) -> String {
        format!("<w:tc><w:tcPr/>{}</w:tc>", inner)
    }

    #[test]
    fn test_paragraphs_then_cells() {
        let body = format!(
            "{}<w:tbl><w:tr>{}{}</w:tr><w:tr>{}{}</w:tr></w:tbl>{}",
            para("Intro"),
            cell(&para("A1")),
            cell(&para("B1")),
            cell(&para("")),
            cell(&para("B2")),
            para("Outro"),
        );
        let content = extract_document_text(&document_xml(&body)).unwrap();

        assert_eq!(content.paragraphs, vec!["Intro", "Outro"]);
        assert_eq!(content.cells, vec!["A1", "B1", "B2"]);
        assert_eq!(content.segments(), vec!["Intro", "Outro", "A1", "B1", "B2"]);
    }

    #[test]
    fn test_runs_concatenate_and_trim() {
        let body = r#"<w:p><w:pPr><w:tabs><w:tab w:val="left"/></w:tabs></w:pPr><w:r><w:t xml:space="preserve">  第一章 </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>绪论</w:t></w:r><w:r><w:tab/><w:t>x</w:t><w:br/><w:t>y &amp; z</w:t></w:r></w:p>"#;
        let content = extract_document_text(&document_xml(body)).unwrap();
        assert_eq!(content.paragraphs, vec!["第一章 绪论\tx\ny & z"]);
    }

    #[test]
    fn test_empty_paragraphs_counted_not_kept() {
        let body = format!("{}<w:p/>{}<w:p><w:pPr/></w:p>", para("a"), para("  "));
        let content = extract_document_text(&document_xml(&body)).unwrap();
        assert_eq!(content.paragraphs, vec!["a"]);
        assert_eq!(content.paragraph_total, 4);
    }

    #[test]
    fn test_hyperlinks_and_insertions_included_deletions_excluded() {
        let body = r#"<w:p><w:hyperlink r:id="rId1" xmlns:r="urn:r"><w:r><w:t>link</w:t></w:r></w:hyperlink><w:ins><w:r><w:t>+new</w:t></w:r></w:ins><w:del><w:r><w:delText>old</w:delText></w:r></w:del></w:p>"#;
        let content = extract_document_text(&document_xml(body)).unwrap();
        assert_eq!(content.paragraphs, vec!["link+new"]);
    }

    #[test]
    fn test_text_boxes_not_merged_into_paragraph() {
        let body = r#"<w:p><w:r><w:t>outer</w:t></w:r><w:r><w:drawing><wps:txbx xmlns:wps="urn:wps"><w:txbxContent><w:p><w:r><w:t>boxed</w:t></w:r></w:p></w:txbxContent></wps:txbx></w:drawing></w:r></w:p>"#;
        let content = extract_document_text(&document_xml(body)).unwrap();
        assert_eq!(content.paragraphs, vec!["outer"]);
        assert_eq!(content.paragraph_total, 1);
    }

    #[test]
    fn test_multi_paragraph_cell_and_nested_table() {
        let nested = format!("<w:tbl><w:tr>{}</w:tr></w:tbl>", cell(&para("deep")));
        let body = format!(
            "<w:tbl><w:tr>{}</w:tr></w:tbl>",
            cell(&format!("{}{}{}", para("line one"), nested, para("line two")))
        );
        let content = extract_document_text(&document_xml(&body)).unwrap();
        assert!(content.paragraphs.is_empty());
        assert_eq!(content.cells, vec!["line one\nline two"]);
    }

    fn spanned_cell(props: &str, inner: &str) -> String {
        format!("<w:tc><w:tcPr>{}</w:tcPr>{}</w:tc>", props, inner)
    }

    #[test]
    fn test_grid_span_repeats_cell_per_column() {
        let body = format!(
            "<w:tbl><w:tr>{}{}</w:tr><w:tr>{}{}{}</w:tr></w:tbl>",
            spanned_cell(r#"<w:gridSpan w:val="2"/>"#, &para("title")),
            cell(&para("C1")),
            cell(&para("A2")),
            cell(&para("B2")),
            cell(&para("C2")),
        );
        let content = extract_document_text(&document_xml(&body)).unwrap();
        assert_eq!(content.cells, vec!["title", "title", "C1", "A2", "B2", "C2"]);
    }

    #[test]
    fn test_vertical_merge_repeats_cell_above() {
        let body = format!(
            "<w:tbl><w:tr>{}</w:tr><w:tr>{}</w:tr></w:tbl>",
            spanned_cell(
                r#"<w:gridSpan w:val="2"/><w:vMerge w:val="restart"/>"#,
                &para("merged")
            ),
            spanned_cell(r#"<w:gridSpan w:val="2"/><w:vMerge/>"#, "<w:p/>"),
        );
        let content = extract_document_text(&document_xml(&body)).unwrap();
        assert_eq!(content.cells, vec!["merged", "merged", "merged", "merged"]);
    }

    #[test]
    fn test_vertical_merge_tracks_its_own_column() {
        let body = format!(
            "<w:tbl><w:tr>{}{}</w:tr><w:tr>{}{}</w:tr></w:tbl><w:tbl><w:tr>{}</w:tr></w:tbl>",
            cell(&para("A1")),
            spanned_cell(r#"<w:vMerge w:val="restart"/>"#, &para("B1")),
            cell(&para("A2")),
            spanned_cell(r#"<w:vMerge w:val="continue"/>"#, "<w:p/>"),
            spanned_cell(r#"<w:vMerge/>"#, &para("stale")),
        );
        let content = extract_document_text(&document_xml(&body)).unwrap();
        // A continuation at the top of a new table has nothing above it
        assert_eq!(content.cells, vec!["A1", "B1", "A2", "B1"]);
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let xml = "<w:document xmlns:w=\"urn:w\"><w:body><w:p></w:body></w:document>";
        assert!(extract_document_text(xml).is_err());
    }
}
