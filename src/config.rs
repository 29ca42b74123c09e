use crate::analysis::AnalysisSettings;
use clap::{Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Directory for history and preferences
    #[arg(long, env = "SENTENCE_FLOW_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Analyze one sentence and print the breakdown
    Analyze {
        /// Sentence to analyze
        sentence: String,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

/// Default vendor endpoint, version prefix included.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

impl AppConfig {
    pub fn load() -> Result<(Self, Command), config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<(Self, Command), config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("storage.data_dir", ".sentence-flow")?
            .set_default("analysis.base_url", DEFAULT_BASE_URL)?
            .set_default("analysis.model", DEFAULT_MODEL)?
            .set_default("analysis.temperature", 0.3)?;

        // Explicit file must exist; ./config.yaml is picked up when present.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // E.g. SENTENCE_FLOW_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("SENTENCE_FLOW")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // Priority: CLI flag > CLI env var > prefixed env > config file > defaults.
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(host) = &cli.host {
            builder = builder.set_override("server.host", host.as_str())?;
        }
        if let Some(dir) = &cli.data_dir {
            builder = builder.set_override("storage.data_dir", dir.to_string_lossy().as_ref())?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        Ok((cfg, cli.command.unwrap_or(Command::Serve)))
    }
}

/// Resolve analysis settings from config plus the `OPENAI_*` environment.
///
/// `OPENAI_API_KEY` is required. `OPENAI_BASE_URL` and `OPENAI_MODEL`
/// override the configured values when set.
pub fn load_analysis_settings(config: &AnalysisConfig) -> Result<AnalysisSettings, String> {
    let api_key = env::var("OPENAI_API_KEY")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| "Missing required env var: OPENAI_API_KEY".to_string())?;

    let base_url = env::var("OPENAI_BASE_URL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| config.base_url.clone());
    if base_url.trim().is_empty() {
        return Err("analysis base URL cannot be empty".to_string());
    }

    let model = env::var("OPENAI_MODEL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| config.model.clone());
    if model.trim().is_empty() {
        return Err("analysis model cannot be empty".to_string());
    }

    Ok(AnalysisSettings {
        base_url,
        api_key: Some(api_key),
        model,
        temperature: config.temperature,
    })
}
