use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use canopy_news::config::{
    require_env, Settings, API_KEY_ENV, FEED_SOURCES, GITHUB_TOKEN_ENV, KEYWORDS,
};
use canopy_news::messages::profanity::DEFAULT_WORDS;
use canopy_news::messages::{GithubStore, MessageBoard, ProfanityFilter};
use canopy_news::news::{run_ingest, Fetcher};
use canopy_news::routes::{self, AppState};

#[derive(Parser)]
#[command(name = "canopy-news", about = "Tree and forest news ingest and site server")]
struct Cli {
    /// Path to config TOML file
    #[arg(long, env = "CANOPY_CONFIG", default_value = "canopy.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch feeds and rewrite the news snapshot
    Ingest,
    /// Serve the news page and message board
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "canopy_news=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    match cli.command {
        Command::Ingest => ingest(settings).await,
        Command::Serve => serve(settings).await,
    }
}

async fn ingest(settings: Settings) -> anyhow::Result<()> {
    let api_key = require_env(API_KEY_ENV)?;
    let ingest = settings.ingest;

    let fetcher = Fetcher::new(
        ingest.api_endpoint.clone(),
        api_key,
        ingest.item_count,
        Duration::from_secs(ingest.request_timeout_secs),
    )?;

    if let Err(e) = run_ingest(&fetcher, FEED_SOURCES, KEYWORDS, &ingest, Utc::now()).await {
        error!("Snapshot write failed: {}", e);
        return Err(e.into());
    }
    Ok(())
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let token = require_env(GITHUB_TOKEN_ENV)?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    // The filter is fully loaded before any request can reach it
    let filter = match &settings.messages.word_list_url {
        Some(url) => ProfanityFilter::load(&client, url, DEFAULT_WORDS).await,
        None => ProfanityFilter::new(DEFAULT_WORDS),
    };
    info!("Profanity filter ready with {} words", filter.len());

    let store = GithubStore::new(client, &settings.messages, token);
    let board = MessageBoard::new(filter, store, &settings.messages);

    let state = Arc::new(AppState {
        snapshot_path: settings.ingest.output_path.clone(),
        page_size: settings.server.page_size,
        refresh_interval_secs: settings.server.refresh_interval_secs,
        board,
    });

    let app = routes::app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", settings.server.bind))?;
    info!("Server starting on http://{}", settings.server.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
