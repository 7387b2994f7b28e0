//! Article data as the backend API describes it.
//!
//! The client only ever holds a transient copy of an article; the types here
//! mirror the wire shapes leniently so a partially filled record still loads.

mod history;
mod timestamp;

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};

pub use history::{
    HistoryAction, HistoryEntry, SNIPPET_CHARS, days_to_publish, format_date, snippet,
};
pub use timestamp::parse_timestamp;

/// Opaque article identifier assigned by the backend.
///
/// The backend sends ids both as JSON strings and as integers, so both are
/// accepted and normalized to their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArticleId(String);

impl ArticleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ArticleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u64),
            Str(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Self(n.to_string()),
            Raw::Str(s) => Self(s),
        })
    }
}

/// Publish status as understood by the publishing platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PublishStatus {
    #[default]
    Draft,
    Public,
    Unlisted,
}

impl PublishStatus {
    pub const ALL: [Self; 3] = [Self::Draft, Self::Public, Self::Unlisted];

    /// Wire form of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Public => "public",
            Self::Unlisted => "unlisted",
        }
    }

    /// Parse a wire value, falling back to `Draft` for anything unknown.
    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" | "published" => Self::Public,
            "unlisted" => Self::Unlisted,
            _ => Self::Draft,
        }
    }

    /// The next status in selector order.
    #[must_use]
    pub fn cycle(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PublishStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(Self::Draft, Self::from_wire))
    }
}

/// An article record as listed by `GET /history`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Article {
    #[serde(rename = "doc_id")]
    pub id: ArticleId,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "tags_or_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub publish_status: PublishStatus,
    #[serde(default)]
    pub word_count: Option<u64>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub published_at: Option<NaiveDateTime>,
    #[serde(default, rename = "medium_url")]
    pub external_url: Option<String>,
}

impl Article {
    /// An article counts as published once the platform handed back a URL.
    pub fn is_published(&self) -> bool {
        self.external_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// The fields of a single article as returned by `GET /article/{id}`.
///
/// Every field is optional; missing ones load as empty values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoadedArticle {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub content: String,
    #[serde(default, deserialize_with = "tags_or_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub publish_status: PublishStatus,
    #[serde(default, rename = "medium_url")]
    pub external_url: Option<String>,
}

impl LoadedArticle {
    /// Whether this article already went out to the platform.
    pub fn is_published(&self) -> bool {
        self.external_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Find the article title: the first line starting with `"# "`, trimmed.
///
/// # Example
///
/// ```
/// use quillpost::article::extract_title;
///
/// assert_eq!(extract_title("intro\n# Hello \n# Second"), Some("Hello".to_string()));
/// assert_eq!(extract_title("## Not a title"), None);
/// ```
pub fn extract_title(content: &str) -> Option<String> {
    content
        .split('\n')
        .find_map(|line| line.strip_prefix("# "))
        .map(|rest| rest.trim().to_string())
}

/// Split a comma separated tag field into trimmed, non-empty tags.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Join tags back into the editable field form.
pub fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}

fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn tags_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
