//! XMind output plugin — converts an outline Markdown file to `.xmind`.

mod writer;

use std::path::{Path, PathBuf};

use mindmap_core::document::DocumentFormat;
use mindmap_core::error::{MindmapError, Result};
use mindmap_core::options::MindmapConfig;
use mindmap_core::outline::Outline;
use mindmap_core::pipeline::file_stem;
use mindmap_core::plugin::OutputPlugin;

pub use writer::{root_topic, write_xmind, Topic};

pub struct XmindOutputPlugin;

impl OutputPlugin for XmindOutputPlugin {
    fn name(&self) -> &str {
        "XMind Output"
    }

    fn convert(
        &self,
        markdown_path: &Path,
        output_dir: &Path,
        _config: &MindmapConfig,
    ) -> Result<PathBuf> {
        convert_md_to_xmind(markdown_path, output_dir)
    }
}

/// Convert `md_path` into `<output_dir>/<stem>.xmind`, creating the directory.
pub fn convert_md_to_xmind(md_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    let markdown = std::fs::read_to_string(md_path).map_err(|e| {
        MindmapError::Conversion(format!("Cannot read {}: {}", md_path.display(), e))
    })?;

    std::fs::create_dir_all(output_dir)?;
    let stem = file_stem(md_path);
    let output_path = output_dir.join(format!("{}.{}", stem, DocumentFormat::Xmind.extension()));

    let outline = Outline::parse(&markdown);
    if outline.is_empty() {
        log::warn!("{} has no headings or list items", md_path.display());
    }
    let root = root_topic(&outline, &stem);

    log::info!("Writing XMind: {}", output_path.display());
    write_xmind(&root, &output_path)?;
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmap_utils::archive::ZipReader;

    #[test]
    fn test_convert_creates_output_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let md = tmp.path().join("生物.md");
        std::fs::write(&md, "# 生物\n\n## 第一章 绪论\n- 这是简介\n").unwrap();
        let out_dir = tmp.path().join("nested").join("out");

        let path = XmindOutputPlugin
            .convert(&md, &out_dir, &MindmapConfig::default())
            .unwrap();
        assert_eq!(path, out_dir.join("生物.xmind"));

        let mut archive = ZipReader::open(&path).unwrap();
        let content: serde_json::Value =
            serde_json::from_str(&archive.read_string("content.json").unwrap()).unwrap();
        let root = &content[0]["rootTopic"];
        assert_eq!(root["title"], "生物");
        let chapter = &root["children"]["attached"][0];
        assert_eq!(chapter["title"], "第一章 绪论");
        assert_eq!(chapter["children"]["attached"][0]["title"], "这是简介");
    }

    #[test]
    fn test_headless_markdown_uses_stem() {
        let tmp = tempfile::tempdir().unwrap();
        let md = tmp.path().join("notes.md");
        std::fs::write(&md, "plain paragraph only\n").unwrap();

        let path = convert_md_to_xmind(&md, tmp.path()).unwrap();
        let mut archive = ZipReader::open(&path).unwrap();
        let xml = archive.read_string("content.xml").unwrap();
        assert!(xml.contains("<title>notes</title>"));
    }

    #[test]
    fn test_missing_markdown_is_conversion_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = convert_md_to_xmind(&tmp.path().join("absent.md"), tmp.path()).unwrap_err();
        assert!(matches!(err, MindmapError::Conversion(_)));
    }
}
