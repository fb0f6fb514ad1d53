//! ZIP helpers for reading DOCX packages and writing XMind workbooks.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use zip::read::ZipArchive;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Read-side wrapper over an archive opened from disk.
pub struct ZipReader {
    archive: ZipArchive<File>,
}

impl ZipReader {
    /// Open the ZIP file at `path`.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file)?;
        Ok(Self { archive })
    }

    /// Whether the archive holds an entry called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    /// Read one entry as UTF-8 text.
    pub fn read_string(&mut self, name: &str) -> io::Result<String> {
        let mut entry = self.archive.by_name(name)?;
        let mut s = String::new();
        entry.read_to_string(&mut s)?;
        Ok(s)
    }
}

/// Builder for creating ZIP archives.
pub struct ZipBuilder {
    writer: ZipWriter<File>,
}

impl ZipBuilder {
    /// Create a new ZIP file at the given path.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: ZipWriter::new(file),
        })
    }

    /// Add a file entry with the given content.
    pub fn add_file(&mut self, name: &str, content: &[u8]) -> io::Result<()> {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        self.writer.start_file(name, options)?;
        self.writer.write_all(content)?;
        Ok(())
    }

    /// Finish writing the ZIP archive.
    pub fn finish(self) -> io::Result<()> {
        self.writer.finish()?;
        Ok(())
    }
}
