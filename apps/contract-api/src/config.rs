//! Command-line and environment configuration

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use summarizer_core::ModelConfig;

/// Default upload size limit (16 MiB)
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

/// Command-line arguments for the contract API server
#[derive(Parser, Debug, Clone)]
#[command(name = "contract-api")]
#[command(about = "Employment contract summarization API")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// SQLite connection string
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:employment_contracts.db?mode=rwc"
    )]
    pub database_url: String,

    /// Directory for uploaded contract files
    #[arg(long, env = "UPLOAD_FOLDER", default_value = "./uploads")]
    pub upload_folder: PathBuf,

    /// Maximum request body size in bytes
    #[arg(long, env = "MAX_CONTENT_LENGTH", default_value_t = DEFAULT_MAX_CONTENT_LENGTH)]
    pub max_content_length: usize,

    /// Local model directory tried before any Hub checkpoint
    #[arg(long, env = "MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Hugging Face cache directory
    #[arg(long, env = "MODEL_CACHE", default_value = "./model_cache")]
    pub model_cache: PathBuf,

    /// Only use models already in the cache
    #[arg(long, env = "HF_OFFLINE")]
    pub offline: bool,

    /// Skip model loading and serve extractive summaries only
    #[arg(long)]
    pub no_model: bool,

    /// Canonicalize domain terms before they reach the model
    #[arg(long)]
    pub emphasize_keywords: bool,

    /// Summary generation timeout in milliseconds
    #[arg(long, env = "SUMMARY_TIMEOUT_MS", default_value = "120000")]
    pub summary_timeout_ms: u64,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    pub rate_limit: u32,

    /// Allowed CORS origin
    #[arg(long, env = "CORS_ORIGIN", default_value = "http://localhost:3000")]
    pub cors_origin: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn model_config(&self) -> ModelConfig {
        let config = ModelConfig::hub(&self.model_cache).with_offline(self.offline);
        match &self.model_path {
            Some(path) => config.with_local_model(path),
            None => config,
        }
    }

    pub fn summary_timeout(&self) -> Duration {
        Duration::from_millis(self.summary_timeout_ms)
    }
}
