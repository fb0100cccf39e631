//! Application state for the API server

use crate::{Config, StoryService};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clones).
#[derive(Clone)]
pub struct AppState {
    /// The story pipeline
    pub service: Arc<StoryService>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service: Arc<StoryService>, config: Arc<Config>) -> Self {
        Self { service, config }
    }
}
