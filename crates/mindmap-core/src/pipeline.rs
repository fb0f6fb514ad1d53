//! Batch orchestrator — runs extraction, outline generation and conversion
//! over every input document, one file at a time.
//!
//! Each file ends in one of three states:
//!   Success: Markdown written, and the mind map too when conversion is on
//!   Partial: Markdown written, conversion failed
//!   Skipped: nothing written (empty text, an error before the Markdown write,
//!            or a stem already written by an earlier input)
//!
//! A failing file never stops the batch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::document::DocumentFormat;
use crate::error::{MindmapError, Result};
use crate::options::MindmapConfig;
use crate::outline::Outline;
use crate::plugin::{InputPlugin, OutlineGenerator, OutputPlugin, ProgressReporter};

/// Why a file produced no output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Extraction succeeded but yielded only whitespace.
    EmptyText,
    /// An error was raised before the Markdown file was written.
    Failed(String),
    /// An earlier input with the same stem already wrote `<stem>.md`.
    DuplicateStem(PathBuf),
}

/// Terminal state of one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Success {
        markdown: PathBuf,
        /// `None` when conversion is disabled.
        mindmap: Option<PathBuf>,
    },
    Partial {
        markdown: PathBuf,
        error: String,
    },
    Skipped {
        reason: SkipReason,
    },
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub outcome: FileOutcome,
}

/// Per-file outcomes of a batch, in processing order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Success { .. }))
    }

    pub fn partial(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Partial { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped { .. }))
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }
}

/// The batch pipeline orchestrator.
pub struct Pipeline {
    input_plugins: Vec<Box<dyn InputPlugin>>,
    generator: Box<dyn OutlineGenerator>,
    output_plugin: Option<Box<dyn OutputPlugin>>,
    progress_reporter: Option<ProgressReporter>,
}

impl Pipeline {
    pub fn new(generator: Box<dyn OutlineGenerator>) -> Self {
        Self {
            input_plugins: Vec::new(),
            generator,
            output_plugin: None,
            progress_reporter: None,
        }
    }

    pub fn add_input(&mut self, plugin: Box<dyn InputPlugin>) {
        self.input_plugins.push(plugin);
    }

    pub fn set_output(&mut self, plugin: Box<dyn OutputPlugin>) {
        self.output_plugin = Some(plugin);
    }

    /// Set a progress reporter callback.
    pub fn set_progress_reporter(&mut self, reporter: ProgressReporter) {
        self.progress_reporter = Some(reporter);
    }

    /// Formats this run reads from the input directory.
    fn accepts(&self, format: DocumentFormat, config: &MindmapConfig) -> bool {
        let enabled = match format {
            DocumentFormat::Docx => true,
            DocumentFormat::Pdf => config.include_pdf,
            _ => false,
        };
        enabled && self.input_for(format).is_some()
    }

    fn input_for(&self, format: DocumentFormat) -> Option<&dyn InputPlugin> {
        self.input_plugins
            .iter()
            .find(|p| p.supported_formats().contains(&format))
            .map(|p| p.as_ref())
    }

    /// List input documents, sorted by file name.
    /// A missing input directory is treated as an empty one.
    pub fn discover_inputs(&self, config: &MindmapConfig) -> Result<Vec<PathBuf>> {
        let dir = &config.input_dir;
        if !dir.is_dir() {
            warn!("Input directory {} does not exist", dir.display());
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if let Some(format) = DocumentFormat::from_path(&path) {
                if self.accepts(format, config) {
                    files.push(path);
                }
            }
        }
        files.sort();
        Ok(files)
    }

    /// Run the batch over every input document.
    pub fn run(&self, config: &MindmapConfig) -> Result<BatchReport> {
        let inputs = self.discover_inputs(config)?;
        let mut report = BatchReport::default();

        if inputs.is_empty() {
            info!("No input documents found in {}", config.input_dir.display());
            return Ok(report);
        }

        info!("Found {} input document(s)", inputs.len());
        let total = inputs.len();
        // Stem -> input whose Markdown claimed it
        let mut written: HashMap<String, PathBuf> = HashMap::new();

        for (idx, input) in inputs.iter().enumerate() {
            let name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            info!("{}", "=".repeat(60));
            info!("Processing: {}", name);
            info!("{}", "=".repeat(60));
            self.report_progress(idx as f64 / total as f64, &format!("Processing {}", name));

            let stem = file_stem(input);
            let outcome = match written.get(&stem) {
                Some(first) => {
                    warn!(
                        "{} has the same stem as {}, skipping so {}.md is not overwritten",
                        input.display(),
                        first.display(),
                        stem
                    );
                    FileOutcome::Skipped {
                        reason: SkipReason::DuplicateStem(first.clone()),
                    }
                }
                None => self.process_file(input, config),
            };
            if matches!(
                outcome,
                FileOutcome::Success { .. } | FileOutcome::Partial { .. }
            ) {
                written.insert(stem, input.clone());
            }
            report.files.push(FileReport {
                input: input.clone(),
                outcome,
            });
        }

        self.report_progress(1.0, "Batch complete");
        info!(
            "All done: {} succeeded, {} partial, {} skipped. Output directory: {}",
            report.succeeded(),
            report.partial(),
            report.skipped(),
            config.output_dir.display()
        );

        Ok(report)
    }

    /// Process one document, never propagating its errors.
    pub fn process_file(&self, input: &Path, config: &MindmapConfig) -> FileOutcome {
        let markdown = match self.write_markdown(input, config) {
            Ok(Some(path)) => path,
            Ok(None) => {
                warn!(
                    "Extracted text of {} is empty, skipping this file",
                    input.display()
                );
                return FileOutcome::Skipped {
                    reason: SkipReason::EmptyText,
                };
            }
            Err(e) => {
                error!("Failed to process {}: {}", input.display(), e);
                return FileOutcome::Skipped {
                    reason: SkipReason::Failed(e.to_string()),
                };
            }
        };

        let output = match self.output_plugin {
            Some(ref plugin) if config.xmind => plugin,
            _ => {
                return FileOutcome::Success {
                    markdown,
                    mindmap: None,
                }
            }
        };

        info!("Running {}...", output.name());
        match output.convert(&markdown, &config.output_dir, config) {
            Ok(mindmap) => {
                info!("Converted: {}", mindmap.display());
                FileOutcome::Success {
                    markdown,
                    mindmap: Some(mindmap),
                }
            }
            Err(e) => {
                error!(
                    "{} failed for {}: {:?}",
                    output.name(),
                    markdown.display(),
                    e
                );
                FileOutcome::Partial {
                    markdown,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Extract, generate and write `<stem>.md`. `Ok(None)` means empty text.
    fn write_markdown(&self, input: &Path, config: &MindmapConfig) -> Result<Option<PathBuf>> {
        let format = DocumentFormat::from_path(input).ok_or_else(|| {
            MindmapError::UnsupportedFormat(input.display().to_string())
        })?;
        let plugin = self.input_for(format).ok_or_else(|| {
            MindmapError::UnsupportedFormat(format!("no input plugin for {}", format))
        })?;

        info!("Running {} plugin...", plugin.name());
        let extracted = plugin.extract(input, config)?;
        if extracted.is_blank() {
            return Ok(None);
        }
        debug!(
            "Extracted {} segments, {} characters",
            extracted.segment_count,
            extracted.char_count()
        );

        let stem = file_stem(input);
        info!("Generating outline with {}...", self.generator.name());
        let markdown = self.generator.generate(&extracted.text, &stem, config)?;

        if config.check_outline {
            log_outline_issues(&markdown, &stem);
        }

        std::fs::create_dir_all(&config.output_dir)?;
        let md_path = config
            .output_dir
            .join(format!("{}.{}", stem, DocumentFormat::Markdown.extension()));
        std::fs::write(&md_path, &markdown).map_err(|e| {
            MindmapError::Other(format!("Cannot write {}: {}", md_path.display(), e))
        })?;
        info!("Saved Markdown: {}", md_path.display());

        Ok(Some(md_path))
    }

    fn report_progress(&self, fraction: f64, message: &str) {
        if let Some(ref reporter) = self.progress_reporter {
            reporter(fraction, message);
        }
    }
}

/// File name without extension, falling back to "untitled".
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string())
}

fn log_outline_issues(markdown: &str, stem: &str) {
    let outline = Outline::parse(markdown);
    let issues = outline.check();
    if issues.is_empty() {
        debug!("Outline for {} has {} nodes", stem, outline.node_count());
        return;
    }
    warn!(
        "Outline for {} deviates from the heading convention in {} place(s)",
        stem,
        issues.len()
    );
    for issue in &issues {
        debug!("  {}", issue);
    }
}

/// Builder for constructing a pipeline.
pub struct PipelineBuilder {
    input_plugins: Vec<Box<dyn InputPlugin>>,
    generator: Option<Box<dyn OutlineGenerator>>,
    output_plugin: Option<Box<dyn OutputPlugin>>,
    progress_reporter: Option<ProgressReporter>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            input_plugins: Vec::new(),
            generator: None,
            output_plugin: None,
            progress_reporter: None,
        }
    }

    pub fn input(mut self, plugin: Box<dyn InputPlugin>) -> Self {
        self.input_plugins.push(plugin);
        self
    }

    pub fn generator(mut self, generator: Box<dyn OutlineGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn output(mut self, plugin: Box<dyn OutputPlugin>) -> Self {
        self.output_plugin = Some(plugin);
        self
    }

    pub fn progress_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let generator = self
            .generator
            .ok_or_else(|| MindmapError::Pipeline("No outline generator specified".to_string()))?;
        if self.input_plugins.is_empty() {
            return Err(MindmapError::Pipeline("No input plugin specified".to_string()));
        }

        let mut pipeline = Pipeline::new(generator);
        for p in self.input_plugins {
            pipeline.add_input(p);
        }
        if let Some(output) = self.output_plugin {
            pipeline.set_output(output);
        }
        if let Some(reporter) = self.progress_reporter {
            pipeline.set_progress_reporter(reporter);
        }
        Ok(pipeline)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
