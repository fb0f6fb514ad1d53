//! XMind writer — assembles an `.xmind` archive from an outline tree.
//!
//! The archive carries both layouts: `content.json` for XMind Zen and later,
//! `content.xml` for XMind 8.

use std::path::Path;

use serde::Serialize;

use mindmap_core::error::{MindmapError, Result};
use mindmap_core::outline::{NodeKind, Outline, OutlineNode};
use mindmap_utils::archive::ZipBuilder;
use mindmap_utils::xml::XmlBuilder;

const STRUCTURE_CLASS: &str = "org.xmind.ui.logic.right";
const SHEET_TITLE: &str = "Sheet 1";
const CREATOR: &str = "docx2mindmap";

/// A mind-map topic with a fresh id.
#[derive(Debug, Clone)]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub children: Vec<Topic>,
}

impl Topic {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            children: Vec::new(),
        }
    }

    fn from_node(node: &OutlineNode) -> Self {
        let mut topic = Self::new(node.title.clone());
        topic.children = node.children.iter().map(Topic::from_node).collect();
        topic
    }

    /// Number of topics in this subtree, itself included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Topic::count).sum::<usize>()
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Root topic for `outline`: its single top-level heading if there is exactly
/// one, otherwise a topic titled `fallback_title` holding every top-level node.
pub fn root_topic(outline: &Outline, fallback_title: &str) -> Topic {
    if let [only] = outline.roots.as_slice() {
        if matches!(only.kind, NodeKind::Heading(_)) {
            return Topic::from_node(only);
        }
    }
    let mut root = Topic::new(fallback_title);
    root.children = outline.roots.iter().map(Topic::from_node).collect();
    root
}

/// Write `root` as an XMind archive at `output_path`.
///
/// On failure no file is left at `output_path`.
pub fn write_xmind(root: &Topic, output_path: &Path) -> Result<()> {
    let sheet_id = new_id();
    let entries = [
        ("content.json", generate_content_json(root, &sheet_id)?),
        ("metadata.json", generate_metadata_json()?),
        ("manifest.json", generate_manifest_json()?),
        ("content.xml", generate_content_xml(root, &sheet_id)),
        ("META-INF/manifest.xml", generate_manifest_xml()),
        ("meta.xml", generate_meta_xml()),
    ];
    write_archive(output_path, &entries)?;

    log::info!(
        "XMind written: {} ({} topics)",
        output_path.display(),
        root.count()
    );
    Ok(())
}

/// Create `output_path` holding `entries`, removing it again if any step fails.
fn write_archive(output_path: &Path, entries: &[(&str, String)]) -> Result<()> {
    let mut zip = ZipBuilder::new(output_path).map_err(|e| {
        MindmapError::Conversion(format!("Failed to create {}: {}", output_path.display(), e))
    })?;

    let written = entries
        .iter()
        .try_for_each(|(name, content)| {
            zip.add_file(name, content.as_bytes())
                .map_err(|e| MindmapError::Conversion(format!("Failed to write {}: {}", name, e)))
        })
        .and_then(|()| {
            zip.finish()
                .map_err(|e| MindmapError::Conversion(format!("Failed to finalize XMind: {}", e)))
        });

    if written.is_err() {
        if let Err(e) = std::fs::remove_file(output_path) {
            log::warn!("Could not remove incomplete {}: {}", output_path.display(), e);
        }
    }
    written
}

// -- XMind Zen (JSON) --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSheet<'a> {
    id: &'a str,
    class: &'static str,
    title: &'static str,
    root_topic: JsonTopic<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonTopic<'a> {
    id: &'a str,
    class: &'static str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    structure_class: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<JsonChildren<'a>>,
}

#[derive(Serialize)]
struct JsonChildren<'a> {
    attached: Vec<JsonTopic<'a>>,
}

impl<'a> JsonTopic<'a> {
    fn from_topic(topic: &'a Topic, structure_class: Option<&'static str>) -> Self {
        let children = if topic.children.is_empty() {
            None
        } else {
            Some(JsonChildren {
                attached: topic
                    .children
                    .iter()
                    .map(|c| JsonTopic::from_topic(c, None))
                    .collect(),
            })
        };
        Self {
            id: &topic.id,
            class: "topic",
            title: &topic.title,
            structure_class,
            children,
        }
    }
}

fn to_json<T: Serialize>(value: &T, name: &str) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| MindmapError::Conversion(format!("Failed to serialize {}: {}", name, e)))
}

fn generate_content_json(root: &Topic, sheet_id: &str) -> Result<String> {
    let sheets = [JsonSheet {
        id: sheet_id,
        class: "sheet",
        title: SHEET_TITLE,
        root_topic: JsonTopic::from_topic(root, Some(STRUCTURE_CLASS)),
    }];
    to_json(&sheets, "content.json")
}

fn generate_metadata_json() -> Result<String> {
    let metadata = serde_json::json!({
        "creator": {
            "name": CREATOR,
            "version": env!("CARGO_PKG_VERSION"),
        }
    });
    to_json(&metadata, "metadata.json")
}

fn generate_manifest_json() -> Result<String> {
    let manifest = serde_json::json!({
        "file-entries": {
            "content.json": {},
            "metadata.json": {},
        }
    });
    to_json(&manifest, "manifest.json")
}

// -- XMind 8 (XML) --

fn generate_content_xml(root: &Topic, sheet_id: &str) -> String {
    let mut xml = XmlBuilder::new();
    xml.open_tag(
        "xmap-content",
        &[
            ("xmlns", "urn:xmind:xmap:xmlns:content:2.0"),
            ("xmlns:fo", "http://www.w3.org/1999/XSL/Format"),
            ("xmlns:svg", "http://www.w3.org/2000/svg"),
            ("xmlns:xhtml", "http://www.w3.org/1999/xhtml"),
            ("xmlns:xlink", "http://www.w3.org/1999/xlink"),
            ("version", "2.0"),
        ],
    );
    xml.open_tag("sheet", &[("id", sheet_id)]);
    write_xml_topic(&mut xml, root, Some(STRUCTURE_CLASS));
    xml.text_element("title", SHEET_TITLE, &[]);
    xml.close_tag("sheet");
    xml.close_tag("xmap-content");
    xml.build()
}

fn write_xml_topic(xml: &mut XmlBuilder, topic: &Topic, structure_class: Option<&str>) {
    match structure_class {
        Some(class) => xml.open_tag("topic", &[("id", topic.id.as_str()), ("structure-class", class)]),
        None => xml.open_tag("topic", &[("id", topic.id.as_str())]),
    };
    xml.text_element("title", &topic.title, &[]);
    if !topic.children.is_empty() {
        xml.open_tag("children", &[]);
        xml.open_tag("topics", &[("type", "attached")]);
        for child in &topic.children {
            write_xml_topic(xml, child, None);
        }
        xml.close_tag("topics");
        xml.close_tag("children");
    }
    xml.close_tag("topic");
}

fn generate_manifest_xml() -> String {
    let mut xml = XmlBuilder::new();
    xml.open_tag("manifest", &[("xmlns", "urn:xmind:xmap:xmlns:manifest:1.0")]);
    for (path, media_type) in [
        ("content.xml", "text/xml"),
        ("META-INF/", ""),
        ("META-INF/manifest.xml", "text/xml"),
        ("meta.xml", "text/xml"),
    ] {
        xml.empty_tag(
            "file-entry",
            &[("full-path", path), ("media-type", media_type)],
        );
    }
    xml.close_tag("manifest");
    xml.build()
}

fn generate_meta_xml() -> String {
    let mut xml = XmlBuilder::new();
    xml.open_tag(
        "meta",
        &[("xmlns", "urn:xmind:xmap:xmlns:meta:2.0"), ("version", "2.0")],
    );
    xml.open_tag("Creator", &[]);
    xml.text_element("Name", CREATOR, &[]);
    xml.text_element("Version", env!("CARGO_PKG_VERSION"), &[]);
    xml.close_tag("Creator");
    xml.close_tag("meta");
    xml.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmap_utils::archive::ZipReader;

    fn sample_root() -> Topic {
        let outline = Outline::parse("# 生物化学\n\n## 第一章 氨基酸\n\n### 性质 3\n\n## 第二章 蛋白质 A&B\n");
        root_topic(&outline, "fallback")
    }

    #[test]
    fn test_single_heading_becomes_root() {
        let root = sample_root();
        assert_eq!(root.title, "生物化学");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].children[0].title, "性质 3");
        assert_eq!(root.count(), 4);
    }

    #[test]
    fn test_several_roots_get_stem_topic() {
        let outline = Outline::parse("## 第一章\n\n## 第二章\n");
        let root = root_topic(&outline, "notes");
        assert_eq!(root.title, "notes");
        assert_eq!(root.children.len(), 2);

        let empty = root_topic(&Outline::default(), "blank");
        assert_eq!(empty.title, "blank");
        assert!(empty.children.is_empty());
    }

    #[test]
    fn test_single_item_root_is_wrapped() {
        let outline = Outline::parse("- lonely item\n");
        let root = root_topic(&outline, "notes");
        assert_eq!(root.title, "notes");
        assert_eq!(root.children[0].title, "lonely item");
    }

    #[test]
    fn test_ids_are_unique() {
        let root = sample_root();
        let mut ids = vec![root.id.clone()];
        for chapter in &root.children {
            ids.push(chapter.id.clone());
            ids.extend(chapter.children.iter().map(|t| t.id.clone()));
        }
        let len = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), len);
    }

    #[test]
    fn test_content_json_shape() {
        let root = sample_root();
        let json = generate_content_json(&root, "sheet-1").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let sheet = &value[0];
        assert_eq!(sheet["id"], "sheet-1");
        assert_eq!(sheet["class"], "sheet");
        let topic = &sheet["rootTopic"];
        assert_eq!(topic["title"], "生物化学");
        assert_eq!(topic["structureClass"], STRUCTURE_CLASS);
        let chapters = topic["children"]["attached"].as_array().unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[1]["title"], "第二章 蛋白质 A&B");
        assert!(chapters[1].get("children").is_none());
        assert!(chapters[0].get("structureClass").is_none());
    }

    #[test]
    fn test_content_xml_escapes_titles() {
        let root = sample_root();
        let xml = generate_content_xml(&root, "sheet-1");
        assert!(xml.contains("<title>第二章 蛋白质 A&amp;B</title>"));
        assert!(xml.contains("structure-class=\"org.xmind.ui.logic.right\""));
        assert!(xml.contains("<topics type=\"attached\">"));
    }

    #[test]
    fn test_write_xmind_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("book.xmind");
        write_xmind(&sample_root(), &path).unwrap();

        let mut archive = ZipReader::open(&path).unwrap();
        for name in [
            "content.json",
            "metadata.json",
            "manifest.json",
            "content.xml",
            "META-INF/manifest.xml",
            "meta.xml",
        ] {
            assert!(archive.contains(name), "missing {}", name);
        }
        let manifest = archive.read_string("manifest.json").unwrap();
        assert!(manifest.contains("content.json"));
        let content = archive.read_string("content.json").unwrap();
        assert!(content.contains("第一章 氨基酸"));
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("book.xmind");
        let entries = [
            ("content.json", "[]".to_string()),
            ("content.json", "[]".to_string()),
        ];

        let err = write_archive(&path, &entries).unwrap_err();
        assert!(matches!(err, MindmapError::Conversion(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let err = write_xmind(&sample_root(), Path::new("/nonexistent/dir/book.xmind")).unwrap_err();
        assert!(matches!(err, MindmapError::Conversion(_)));
    }
}
