//! Configuration shared across the pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable holding the chat-completion API key.
pub const API_KEY_ENV: &str = "DASHSCOPE_API_KEY";

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "qwen3-max";

/// Default character budget for the text handed to the model.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 100_000;

/// All options controlling a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MindmapConfig {
    // -- General --
    pub verbose: u8,

    // -- Filesystem --
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub include_pdf: bool,

    // -- Chat completion --
    /// Never written to config files; comes from the environment.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_chunk_chars: usize,
    /// `None` waits forever, which is what a batch with a slow model wants.
    pub request_timeout_secs: Option<u64>,

    // -- PDF --
    pub pdf_engine: PdfEngine,
    pub pdf_max_pages: Option<u32>,

    // -- Output --
    pub xmind: bool,
    pub check_outline: bool,
}

impl Default for MindmapConfig {
    fn default() -> Self {
        Self {
            verbose: 0,
            input_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            include_pdf: false,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            request_timeout_secs: None,
            pdf_engine: PdfEngine::Auto,
            pdf_max_pages: None,
            xmind: true,
            check_outline: true,
        }
    }
}

impl MindmapConfig {
    /// The API key, if one is set and non-empty.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Pick up the API key from the process environment.
    /// An unset or empty variable leaves the config without a credential.
    pub fn apply_env(&mut self) {
        self.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty());
    }
}

/// PDF text extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PdfEngine {
    /// lopdf first, pdftohtml when lopdf yields too little text.
    #[default]
    Auto,
    /// lopdf only.
    Lopdf,
    /// pdftohtml only.
    Pdftohtml,
}

impl std::str::FromStr for PdfEngine {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "lopdf" => Ok(Self::Lopdf),
            "pdftohtml" => Ok(Self::Pdftohtml),
            other => Err(format!(
                "unknown PDF engine '{}' (expected auto, lopdf or pdftohtml)",
                other
            )),
        }
    }
}
