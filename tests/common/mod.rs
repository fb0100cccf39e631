//! Shared fixtures for hn-stories integration tests
//!
//! [`FakeHackerNews`] wraps a wiremock server that speaks the two upstream
//! endpoints: `/v0/beststories.json` and `/v0/item/{id}.json`.

#![allow(dead_code)]

use hn_stories::{Config, RetryConfig};
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Upstream base path, mirroring the real Firebase API layout
pub const API_PREFIX: &str = "/v0";

/// A fake upstream content API
pub struct FakeHackerNews {
    pub server: MockServer,
}

impl FakeHackerNews {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Configuration pointing at this server with a short retry delay
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.source.best_stories_url = format!("{}{API_PREFIX}/beststories.json", self.server.uri());
        config.source.item_url = format!("{}{API_PREFIX}/item", self.server.uri());
        config.retry = RetryConfig {
            max_attempts: 3,
            delay: Duration::from_millis(20),
        };
        config
    }

    /// Serve `ids` as the best-stories list
    pub async fn best_stories(&self, ids: &[u64]) {
        Mock::given(method("GET"))
            .and(path(format!("{API_PREFIX}/beststories.json")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(ids)))
            .mount(&self.server)
            .await;
    }

    /// Serve `body` for item `id`
    pub async fn item(&self, id: u64, body: Value) {
        Mock::given(method("GET"))
            .and(path(item_path(id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Serve a story for `id` with the given score
    pub async fn story(&self, id: u64, score: u64) {
        self.item(id, story_json(id, score)).await;
    }

    /// Fail the first `failures` requests for item `id` with HTTP 503
    pub async fn flaky_item(&self, id: u64, failures: u64) {
        Mock::given(method("GET"))
            .and(path(item_path(id)))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(failures)
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Number of requests the server saw for `request_path`
    pub async fn hits(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == request_path)
            .count()
    }
}

pub fn item_path(id: u64) -> String {
    format!("{API_PREFIX}/item/{id}.json")
}

/// A story item as the upstream API returns it
pub fn story_json(id: u64, score: u64) -> Value {
    json!({
        "id": id,
        "type": "story",
        "title": format!("Story {id}"),
        "url": format!("https://example.com/{id}"),
        "by": format!("user{id}"),
        "time": 1_175_714_200,
        "score": score,
        "descendants": id % 7,
        "kids": [id * 10, id * 10 + 1]
    })
}
