//! Detail phase: one retried fetch per story id, run concurrently.

use super::StoryService;
use crate::error::{Error, Result};
use crate::retry::run_with_retry;
use crate::types::{StoryId, StoryItem, StoryRecord, decode_item};
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

impl StoryService {
    /// Fetch and map a single story
    ///
    /// Each call has its own attempt counter. Returns `Ok(None)` when the
    /// upstream item is empty (deleted or unknown ids).
    pub async fn fetch_story(
        &self,
        id: StoryId,
        cancel: &CancellationToken,
    ) -> Result<Option<StoryRecord>> {
        let url = self.config.source.item_endpoint(id);

        let item = run_with_retry(&self.config.retry, cancel, || self.get_item(&url))
            .await
            .map_err(|e| {
                let e = Error::from(e);
                tracing::warn!(story_id = %id, error = %e, "Story fetch failed");
                e
            })?;

        match item {
            Some(item) => Ok(Some(StoryRecord::from(item))),
            None => {
                tracing::debug!(story_id = %id, "Story has no content, skipping");
                Ok(None)
            }
        }
    }

    /// Fetch every story in `ids` concurrently
    ///
    /// Waits for every fetch to settle. If any fetch fails, the batch fails
    /// with the error of the earliest failing id; otherwise the records come
    /// back in `ids` order with empty items dropped.
    pub async fn fetch_story_details(
        &self,
        ids: &[StoryId],
        cancel: &CancellationToken,
    ) -> Result<Vec<StoryRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let concurrency = self
            .config
            .fetch
            .max_concurrent_fetches
            .unwrap_or(ids.len())
            .max(1);

        // `buffered` keeps input order, which the score sort relies on for ties
        let results: Vec<Result<Option<StoryRecord>>> = stream::iter(ids.iter().copied())
            .map(|id| self.fetch_story(id, cancel))
            .buffered(concurrency)
            .collect()
            .await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            tracing::error!(
                failed,
                total = ids.len(),
                "Story detail batch failed"
            );
        }

        let mut stories = Vec::with_capacity(results.len());
        for result in results {
            if let Some(story) = result? {
                stories.push(story);
            }
        }

        tracing::debug!(
            requested = ids.len(),
            fetched = stories.len(),
            concurrency,
            "Fetched story details"
        );

        Ok(stories)
    }

    async fn get_item(&self, url: &str) -> Result<Option<StoryItem>> {
        let body = self.get_body(url).await?;
        decode_item(&body, &self.decode).map_err(|source| Error::Decode {
            url: url.to_string(),
            source,
        })
    }
}
