//! Sentence Flow server
//!
//! Entry point: runs the HTTP API, or analyzes a single sentence with
//! `sentence-flow analyze "<sentence>"`.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use sentence_flow::analysis::ChatCompletionsAnalyzer;
use sentence_flow::config::{AppConfig, Command, load_analysis_settings};
use sentence_flow::controller::{AnalysisOutcome, Controller};
use sentence_flow::server::start_server;
use sentence_flow::storage::FileStore;
use sentence_flow::view::ResultPanel;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (M-LOG-STRUCTURED)
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load .env (if present)
    let _ = dotenv();

    let (config, command) = AppConfig::load()?;

    // Missing API key is fatal before anything is served.
    let settings = match load_analysis_settings(&config.analysis) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Configuration error: {msg}");
            std::process::exit(1);
        }
    };

    info!(
        name: "analysis.config.loaded",
        base_url = %settings.base_url,
        model = %settings.model,
        "Analysis configuration loaded"
    );

    let analyzer = Arc::new(ChatCompletionsAnalyzer::new(settings));
    let store = Arc::new(FileStore::new(config.storage.data_dir.clone()));
    let controller = Arc::new(Controller::load(analyzer, store).await);

    match command {
        Command::Serve => start_server(Arc::new(config), controller).await,
        Command::Analyze { sentence } => {
            let outcome = controller.request_analysis(Some(&sentence)).await;
            let snapshot = controller.snapshot().await;
            print!("{}", ResultPanel::from_state(&snapshot.state));

            match outcome {
                AnalysisOutcome::Completed(_) => Ok(()),
                AnalysisOutcome::Skipped => anyhow::bail!("sentence is blank"),
                _ => std::process::exit(1),
            }
        }
    }
}
