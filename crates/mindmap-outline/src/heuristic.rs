//! Offline outline built from chapter-like lines, used when no API key is set.

use once_cell::sync::Lazy;
use regex::Regex;

/// Only this many leading lines of the text are scanned.
pub const MAX_SCANNED_LINES: usize = 500;

/// Chapter-like lines at least this long (in characters) are dropped.
const MAX_HEADING_CHARS: usize = 50;

/// Lines at least this long are not listed as items.
const MAX_ITEM_CHARS: usize = 100;

static CHAPTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^第[一二三四五六七八九十\d]+[章节]").unwrap());
static NUMBERED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[\.、]").unwrap());

fn is_chapter_like(line: &str) -> bool {
    CHAPTER_RE.is_match(line) || NUMBERED_RE.is_match(line)
}

/// Build a two-level outline: `# title`, then `## ` for chapter-like lines and
/// `- ` for short lines following the first chapter.
pub fn generate_simple_mindmap(text: &str, title: &str) -> String {
    let mut out = vec![format!("# {}", title), String::new()];
    let mut in_section = false;

    for raw in text.split('\n').take(MAX_SCANNED_LINES) {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let len = line.chars().count();

        if is_chapter_like(line) {
            if len < MAX_HEADING_CHARS {
                out.push(format!("## {}", line));
                in_section = true;
            }
        } else if in_section && len < MAX_ITEM_CHARS {
            out.push(format!("- {}", line));
        }
    }

    out.join("\n")
}
