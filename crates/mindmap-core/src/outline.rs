//! Outline tree parsed from the generated Markdown.
//!
//! The Markdown file on disk is always the generator's raw output. This tree
//! exists for the XMind writer and for the structural report, which only
//! describes problems and never rewrites the outline.
//!
//! Expected shape: `#` book, `##` chapter, `###` section, `####` topic,
//! `#####` subtopic. Leaf headings end with an item count (`##### 熔点 2`).

use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use regex::Regex;

/// Deepest heading level the outline convention uses.
pub const MAX_OUTLINE_LEVEL: u8 = 5;

static TRAILING_COUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s(\d+)\s*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A Markdown heading with its level (1-6).
    Heading(u8),
    /// A list item.
    Item,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineNode {
    pub title: String,
    pub kind: NodeKind,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    pub fn new(title: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            title: title.into(),
            kind,
            children: Vec::new(),
        }
    }

    /// Recitation-item count written after the title, if any.
    pub fn item_count(&self) -> Option<u32> {
        TRAILING_COUNT_RE
            .captures(&self.title)
            .and_then(|c| c[1].parse().ok())
    }

    /// True when no heading is nested below this node.
    pub fn is_leaf_heading(&self) -> bool {
        matches!(self.kind, NodeKind::Heading(_))
            && !self
                .children
                .iter()
                .any(|c| matches!(c.kind, NodeKind::Heading(_)))
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(OutlineNode::count).sum::<usize>()
    }
}

/// A parsed outline: the top-level nodes in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    pub roots: Vec<OutlineNode>,
}

/// Nesting rank on the open-node stack. Headings use their level; list items
/// rank below every heading.
const ITEM_RANK_BASE: usize = 6;

impl Outline {
    /// Parse Markdown headings and list items into a tree.
    ///
    /// Headings nest by level. List items hang off the nearest preceding
    /// heading; nested lists hang off their parent item. Paragraph text,
    /// code blocks and tables are ignored.
    pub fn parse(markdown: &str) -> Self {
        let mut roots: Vec<OutlineNode> = Vec::new();
        let mut open: Vec<(usize, OutlineNode)> = Vec::new();

        let mut heading_level: Option<u8> = None;
        let mut item_depth = 0usize;
        let mut capturing_item = false;
        let mut buf = String::new();

        for event in Parser::new(markdown) {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    heading_level = Some(level as u8);
                    buf.clear();
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(level) = heading_level.take() {
                        close_while(&mut open, &mut roots, |rank| rank >= level as usize);
                        let title = buf.trim().to_string();
                        open.push((level as usize, OutlineNode::new(title, NodeKind::Heading(level))));
                    }
                }
                Event::Start(Tag::Item) => {
                    item_depth += 1;
                    capturing_item = true;
                    buf.clear();
                    open.push((ITEM_RANK_BASE + item_depth, OutlineNode::new("", NodeKind::Item)));
                }
                Event::Start(Tag::List(_)) | Event::End(TagEnd::Paragraph) if capturing_item => {
                    finish_item_title(&mut open, &mut buf);
                    capturing_item = false;
                }
                Event::End(TagEnd::Item) => {
                    if capturing_item {
                        finish_item_title(&mut open, &mut buf);
                        capturing_item = false;
                    }
                    let rank = ITEM_RANK_BASE + item_depth;
                    close_while(&mut open, &mut roots, |r| r >= rank);
                    item_depth = item_depth.saturating_sub(1);
                }
                Event::Text(text) | Event::Code(text) => {
                    if heading_level.is_some() || capturing_item {
                        buf.push_str(&text);
                    }
                }
                Event::SoftBreak | Event::HardBreak => {
                    if heading_level.is_some() || capturing_item {
                        buf.push(' ');
                    }
                }
                _ => {}
            }
        }

        close_while(&mut open, &mut roots, |_| true);
        Self { roots }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(OutlineNode::count).sum()
    }

    /// Report deviations from the five-level heading convention.
    pub fn check(&self) -> Vec<OutlineIssue> {
        let mut issues = Vec::new();

        let books = self
            .roots
            .iter()
            .filter(|n| n.kind == NodeKind::Heading(1))
            .count();
        match books {
            0 => issues.push(OutlineIssue::MissingBookHeading),
            1 => {}
            n => issues.push(OutlineIssue::MultipleBookHeadings(n)),
        }

        for node in &self.roots {
            check_node(node, 0, &mut issues);
        }
        issues
    }
}

fn check_node(node: &OutlineNode, parent_level: u8, issues: &mut Vec<OutlineIssue>) {
    let level = match node.kind {
        NodeKind::Heading(level) => level,
        NodeKind::Item => return,
    };

    if level > parent_level + 1 {
        issues.push(OutlineIssue::LevelJump {
            title: node.title.clone(),
            from: parent_level,
            to: level,
        });
    }
    if level > MAX_OUTLINE_LEVEL {
        issues.push(OutlineIssue::TooDeep {
            title: node.title.clone(),
            level,
        });
    }
    if level > 1 && node.is_leaf_heading() && node.item_count().is_none() {
        issues.push(OutlineIssue::LeafWithoutCount {
            title: node.title.clone(),
        });
    }

    for child in &node.children {
        check_node(child, level, issues);
    }
}

fn finish_item_title(open: &mut [(usize, OutlineNode)], buf: &mut String) {
    if let Some((_, node)) = open.last_mut() {
        if node.kind == NodeKind::Item && node.title.is_empty() {
            node.title = buf.trim().to_string();
        }
    }
    buf.clear();
}

/// Pop open nodes whose rank satisfies `pred`, attaching each to its parent.
fn close_while(
    open: &mut Vec<(usize, OutlineNode)>,
    roots: &mut Vec<OutlineNode>,
    pred: impl Fn(usize) -> bool,
) {
    while let Some((rank, _)) = open.last() {
        if !pred(*rank) {
            break;
        }
        let Some((_, node)) = open.pop() else { break };
        match open.last_mut() {
            Some((_, parent)) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}

/// A structural deviation found in a generated outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineIssue {
    MissingBookHeading,
    MultipleBookHeadings(usize),
    LevelJump { title: String, from: u8, to: u8 },
    TooDeep { title: String, level: u8 },
    LeafWithoutCount { title: String },
}

impl std::fmt::Display for OutlineIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBookHeading => write!(f, "no level-1 book heading"),
            Self::MultipleBookHeadings(n) => write!(f, "{} level-1 headings, expected one", n),
            Self::LevelJump { title, from, to } => {
                write!(f, "heading \"{}\" jumps from level {} to {}", title, from, to)
            }
            Self::TooDeep { title, level } => {
                write!(f, "heading \"{}\" is at level {}, deeper than {}", title, level, MAX_OUTLINE_LEVEL)
            }
            Self::LeafWithoutCount { title } => {
                write!(f, "leaf heading \"{}\" has no item count", title)
            }
        }
    }
}
