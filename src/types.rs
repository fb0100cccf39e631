//! Core types: story identifiers, the wire item shape, and the domain record
//!
//! The upstream item endpoint returns loosely-shaped JSON. [`decode_item`]
//! turns a body into an optional [`StoryItem`] under explicit
//! [`DecodeOptions`], and [`StoryRecord::from`] maps that wire shape into the
//! record handed to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Identifier of a story at the upstream source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(pub u64);

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StoryId {
    fn from(id: u64) -> Self {
        StoryId(id)
    }
}

/// A story as returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoryRecord {
    /// Story title
    pub title: String,
    /// Link target; absent for text posts such as "Ask HN"
    pub uri: Option<String>,
    /// Author handle
    pub posted_by: String,
    /// Submission time (UTC)
    #[serde(rename = "time")]
    pub posted_at_utc: DateTime<Utc>,
    /// Ranking score
    pub score: u64,
    /// Number of comments
    pub comment_count: u64,
}

/// Item detail as sent by the upstream API
///
/// Every field is optional on the wire; absent fields take the type's zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoryItem {
    /// Story title
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    /// Link target
    pub url: Option<String>,
    /// Author handle
    #[serde(deserialize_with = "null_as_empty")]
    pub by: String,
    /// Unix epoch seconds
    pub time: i64,
    /// Ranking score
    pub score: u64,
    /// Comment count
    pub descendants: u64,
}

// Deleted authors and untitled items come back as explicit nulls
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<StoryItem> for StoryRecord {
    fn from(item: StoryItem) -> Self {
        StoryRecord {
            title: item.title,
            uri: item.url,
            posted_by: item.by,
            posted_at_utc: epoch_seconds_to_utc(item.time),
            score: item.score,
            comment_count: item.descendants,
        }
    }
}

/// Seconds since the Unix epoch as a UTC timestamp
///
/// Values outside chrono's range fall back to the epoch itself.
pub fn epoch_seconds_to_utc(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// How response bodies are decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Match object keys regardless of ASCII case
    pub case_insensitive: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            case_insensitive: true,
        }
    }
}

/// Decode an id-list body: a bare JSON array of non-negative integers
pub fn decode_id_list(body: &[u8]) -> serde_json::Result<Vec<StoryId>> {
    serde_json::from_slice(body)
}

/// Decode an item body
///
/// Returns `Ok(None)` when the body is JSON `null` or an empty object, which
/// is how the upstream API answers for deleted or unknown items.
pub fn decode_item(body: &[u8], options: &DecodeOptions) -> serde_json::Result<Option<StoryItem>> {
    let value: serde_json::Value = serde_json::from_slice(body)?;

    let value = match value {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::Object(map) if map.is_empty() => return Ok(None),
        serde_json::Value::Object(map) if options.case_insensitive => serde_json::Value::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_ascii_lowercase(), value))
                .collect(),
        ),
        other => other,
    };

    serde_json::from_value(value).map(Some)
}
