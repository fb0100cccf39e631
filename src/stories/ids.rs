//! Id-list phase: the ranked candidate ids from the best-stories endpoint.

use super::StoryService;
use crate::error::{Error, Result};
use crate::retry::run_with_retry;
use crate::types::{StoryId, decode_id_list};
use tokio_util::sync::CancellationToken;

impl StoryService {
    /// Fetch the full ranked id list
    ///
    /// No truncation happens here; an empty upstream list is a valid, empty result.
    pub async fn fetch_best_story_ids(&self, cancel: &CancellationToken) -> Result<Vec<StoryId>> {
        let url = self.config.source.best_stories_url.as_str();

        let ids = run_with_retry(&self.config.retry, cancel, || self.get_id_list(url)).await?;

        tracing::debug!(count = ids.len(), "Fetched best story ids");
        Ok(ids)
    }

    async fn get_id_list(&self, url: &str) -> Result<Vec<StoryId>> {
        let body = self.get_body(url).await?;
        decode_id_list(&body).map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        })
    }
}
