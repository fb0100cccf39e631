//! # hn-stories
//!
//! Fetches the Hacker News "best stories" list, retrieves the details of the
//! top `n` entries concurrently and returns them ranked by score.
//!
//! ## Pipeline
//!
//! 1. Fetch the ordered id list (retried with a fixed delay)
//! 2. Keep the first `n` ids
//! 3. Fetch every item concurrently, each with its own retry budget
//! 4. Map each item to a [`StoryRecord`] and sort by score, highest first
//!
//! Ties keep the order the ids had in the upstream list.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hn_stories::{Config, StoryService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = StoryService::new(Config::default())?;
//!
//!     for story in service.best_stories(10).await? {
//!         println!("{:>5}  {}", story.score, story.title);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Retry logic with a fixed delay between attempts
pub mod retry;
/// Story fetching and ranking
pub mod stories;
/// Story identifiers, wire items and output records
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, Config, FetchConfig, RetryConfig, SourceConfig};
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use retry::{IsRetryable, RetryError, run_with_retry};
pub use stories::StoryService;
pub use types::{StoryId, StoryRecord};

/// Resolves when the process receives a termination signal.
///
/// Pass it to [`api::start_api_server`] to stop the server gracefully.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
pub async fn shutdown_signal() {
    wait_for_signal().await;
    tracing::info!("Shutdown signal received, stopping");
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments (containers, tests)
    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                _ = sigint.recv() => tracing::info!("Received SIGINT signal (Ctrl+C)"),
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(_), Err(_)) => {
            tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C signal"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C signal"),
    }
}
