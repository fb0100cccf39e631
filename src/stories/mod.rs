//! Best-stories fetch pipeline
//!
//! [`StoryService`] runs the two-phase fetch behind `GET /api/stories/:count`:
//! - [`ids`] - the ranked id list, one call wrapped in the retry driver
//! - [`details`] - one retried call per id, fanned out concurrently
//!
//! This module holds the service itself and the aggregation step that
//! truncates the id list and orders the fetched records by score.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{DecodeOptions, StoryId, StoryRecord};
use tokio_util::sync::CancellationToken;

mod details;
mod ids;

/// Fetches and ranks stories from the upstream content API
///
/// Holds no state between requests apart from the HTTP connection pool, so a
/// single instance can be shared (behind an `Arc`) by every request handler.
pub struct StoryService {
    /// Shared HTTP client; its pool is the only resource shared across fetches
    http_client: reqwest::Client,

    /// Validated configuration
    config: Config,

    /// Decoder settings derived from `config.fetch`
    decode: DecodeOptions,
}

impl StoryService {
    /// Create a service, rejecting invalid configuration before any network call
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.source.request_timeout)
            .user_agent(concat!("hn-stories/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config("source", format!("failed to create HTTP client: {e}")))?;

        let decode = DecodeOptions {
            case_insensitive: config.fetch.case_insensitive_fields,
        };

        Ok(Self {
            http_client,
            config,
            decode,
        })
    }

    /// The configuration this service was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch the top `count` stories, ordered by score descending
    pub async fn best_stories(&self, count: i64) -> Result<Vec<StoryRecord>> {
        self.best_stories_with_cancel(count, &CancellationToken::new())
            .await
    }

    /// Like [`best_stories`](Self::best_stories), abandoning all in-flight
    /// calls and retry delays once `cancel` fires
    pub async fn best_stories_with_cancel(
        &self,
        count: i64,
        cancel: &CancellationToken,
    ) -> Result<Vec<StoryRecord>> {
        let ids = self.fetch_best_story_ids(cancel).await?;

        let selected = select_top(&ids, count);
        if selected.is_empty() {
            tracing::debug!(count, available = ids.len(), "No story ids selected");
            return Ok(Vec::new());
        }

        let stories = self.fetch_story_details(selected, cancel).await?;
        let ranked = rank_by_score(stories);

        tracing::info!(
            count,
            selected = selected.len(),
            returned = ranked.len(),
            "Fetched best stories"
        );

        Ok(ranked)
    }

    /// GET `url`, returning the body of a successful response
    ///
    /// Transport failures and non-success statuses come back as retryable
    /// errors; decoding is left to the caller.
    async fn get_body(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// The first `count` ids, or none at all for a non-positive `count`
pub fn select_top(ids: &[StoryId], count: i64) -> &[StoryId] {
    let count = if count <= 0 {
        0
    } else {
        usize::try_from(count).unwrap_or(usize::MAX)
    };
    &ids[..count.min(ids.len())]
}

/// Order stories by score, highest first
///
/// The sort is stable: equal scores keep their fetch order.
pub fn rank_by_score(mut stories: Vec<StoryRecord>) -> Vec<StoryRecord> {
    stories.sort_by(|a, b| b.score.cmp(&a.score));
    stories
}
