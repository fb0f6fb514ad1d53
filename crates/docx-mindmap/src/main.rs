//! docx2mindmap — turn Word textbooks into recitation mind maps.
//!
//! - Batch (default): `docx2mindmap [batch] [--input-dir data] [--output-dir output]`
//! - Single steps: `docx2mindmap extract book.docx`, `docx2mindmap convert book.md -o out/`

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use mindmap_core::document::DocumentFormat;
use mindmap_core::options::{MindmapConfig, PdfEngine};
use mindmap_core::pipeline::{BatchReport, PipelineBuilder};
use mindmap_input_docx::DocxInputPlugin;
use mindmap_input_pdf::PdfInputPlugin;
use mindmap_outline::LlmOutlineGenerator;
use mindmap_output_xmind::XmindOutputPlugin;

const APP_NAME: &str = "docx2mindmap";

#[derive(Parser)]
#[command(
    name = "docx2mindmap",
    version,
    about = "Generate recitation mind maps from DOCX textbooks"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory scanned for input documents (default: data)
    #[arg(long, global = true)]
    input_dir: Option<PathBuf>,

    /// Directory receiving .md and .xmind files (default: output)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Chat model identifier (default: qwen3-max)
    #[arg(long, global = true)]
    model: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Characters of extracted text sent to the model (default: 100000)
    #[arg(long, global = true)]
    max_chunk_chars: Option<usize>,

    /// Also process PDF files in the input directory
    #[arg(long, global = true)]
    include_pdf: bool,

    /// Only read the first N pages of each PDF (0 reads every page)
    #[arg(long, global = true)]
    pdf_max_pages: Option<u32>,

    /// PDF extraction engine: auto, lopdf, pdftohtml (default: auto)
    #[arg(long, global = true)]
    pdf_engine: Option<PdfEngine>,

    /// Write Markdown only, skip the XMind conversion
    #[arg(long, global = true)]
    no_xmind: bool,

    /// HTTP timeout for the chat request in seconds (default: none)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Dump effective merged config as TOML and exit
    #[arg(long, global = true)]
    dump_config: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every document in the input directory (default)
    Batch,

    /// Print the extracted text of one DOCX or PDF file
    Extract {
        /// Input document
        file: PathBuf,
    },

    /// Convert an outline Markdown file to XMind
    Convert {
        /// Markdown file
        markdown: PathBuf,

        /// Output directory (default: the configured output directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Read one TOML layer. Missing files are silently ignored.
fn read_config_file(path: &Path) -> Option<MindmapConfig> {
    let contents = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<MindmapConfig>(&contents) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::warn!("Failed to parse {}: {}", path.display(), e);
            None
        }
    }
}

/// Load config from global and project-local TOML files, then the environment.
/// The project-local file fully overrides the global one.
fn load_config() -> MindmapConfig {
    let mut config = MindmapConfig::default();

    // 1. Global config: ~/.config/docx2mindmap/config.toml
    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join(APP_NAME).join("config.toml");
        if let Some(parsed) = read_config_file(&global_path) {
            config = parsed;
        }
    }

    // 2. Project-local config: ./.docx2mindmap.toml
    if let Some(parsed) = read_config_file(Path::new(".docx2mindmap.toml")) {
        config = parsed;
    }

    // 3. API key from .env or the process environment
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            log::warn!("Failed to load .env: {}", e);
        }
    }
    config.apply_env();

    config
}

/// Apply CLI flags on top of config-loaded options.
/// Only overrides when the CLI flag was explicitly provided.
fn apply_cli_overrides(config: &mut MindmapConfig, cli: &Cli) {
    if cli.verbose > 0 {
        config.verbose = cli.verbose;
    }
    if let Some(ref dir) = cli.input_dir {
        config.input_dir = dir.clone();
    }
    if let Some(ref dir) = cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(ref model) = cli.model {
        config.model = model.clone();
    }
    if let Some(ref url) = cli.base_url {
        config.base_url = url.clone();
    }
    if let Some(chars) = cli.max_chunk_chars {
        config.max_chunk_chars = chars;
    }
    if cli.include_pdf {
        config.include_pdf = true;
    }
    if cli.pdf_max_pages.is_some() {
        config.pdf_max_pages = cli.pdf_max_pages;
    }
    if let Some(engine) = cli.pdf_engine {
        config.pdf_engine = engine;
    }
    if cli.no_xmind {
        config.xmind = false;
    }
    if cli.timeout_secs.is_some() {
        config.request_timeout_secs = cli.timeout_secs;
    }
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
        }
    }
    builder.init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config();
    apply_cli_overrides(&mut config, &cli);

    // Handle --dump-config
    if cli.dump_config {
        match toml::to_string_pretty(&config) {
            Ok(s) => {
                println!("{}", s);
                process::exit(0);
            }
            Err(e) => {
                eprintln!("Error serializing config: {}", e);
                process::exit(1);
            }
        }
    }

    let result = match &cli.command {
        None | Some(Commands::Batch) => run_batch(&config).map(|_| ()),
        Some(Commands::Extract { file }) => run_extract(file, &config),
        Some(Commands::Convert { markdown, output }) => {
            run_convert(markdown, output.as_deref(), &config)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Run the batch. Per-file failures are logged and recorded in the report.
fn run_batch(config: &MindmapConfig) -> Result<BatchReport> {
    if config.credential().is_some() {
        log::info!("Using model {} at {}", config.model, config.base_url);
    }

    let pipeline = PipelineBuilder::new()
        .input(Box::new(DocxInputPlugin))
        .input(Box::new(PdfInputPlugin))
        .generator(Box::new(
            LlmOutlineGenerator::new(config).context("Cannot set up the chat client")?,
        ))
        .output(Box::new(XmindOutputPlugin))
        .progress_reporter(Box::new(|frac, msg| {
            if frac < 1.0 {
                log::debug!("[{:3.0}%] {}", frac * 100.0, msg);
            }
        }))
        .build()?;

    pipeline
        .run(config)
        .with_context(|| format!("Cannot scan {}", config.input_dir.display()))
}

fn run_extract(file: &Path, config: &MindmapConfig) -> Result<()> {
    let text = match DocumentFormat::from_path(file) {
        Some(DocumentFormat::Docx) => mindmap_input_docx::extract_docx_text(file),
        Some(DocumentFormat::Pdf) => {
            mindmap_input_pdf::extract_pdf_text(file, config.pdf_max_pages, config.pdf_engine)
        }
        _ => bail!("Cannot extract text from {}: expected .docx or .pdf", file.display()),
    }
    .with_context(|| format!("Cannot extract text from {}", file.display()))?;

    println!("{}", text.text);
    Ok(())
}

fn run_convert(markdown: &Path, output: Option<&Path>, config: &MindmapConfig) -> Result<()> {
    let output_dir = output.unwrap_or(config.output_dir.as_path());
    let path = mindmap_output_xmind::convert_md_to_xmind(markdown, output_dir)
        .with_context(|| format!("Cannot convert {}", markdown.display()))?;
    println!("{}", path.display());
    Ok(())
}
