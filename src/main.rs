use std::sync::Arc;

use hn_stories::{Config, Result, StoryService, api};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log filter variable, e.g. `HN_STORIES_LOG=hn_stories=debug,tower_http=debug`
const LOG_ENV: &str = "HN_STORIES_LOG";

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "hn-stories exited with an error");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("hn_stories=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

async fn run() -> Result<()> {
    let config = Config::load()?;
    config.validate()?;

    tracing::info!(
        best_stories_url = %config.source.best_stories_url,
        item_url = %config.source.item_url,
        max_attempts = config.retry.max_attempts,
        retry_delay_ms = config.retry.delay.as_millis() as u64,
        "Configuration loaded"
    );

    let service = Arc::new(StoryService::new(config.clone())?);
    api::start_api_server(service, Arc::new(config), hn_stories::shutdown_signal()).await
}
