//! Client for the article backend.
//!
//! [`ArticleApi`] is the seam between the controller and the network: the
//! worker thread drives a [`HttpApi`] in production, tests drive an in-memory
//! fake. All calls are blocking request/response round trips.

mod http;

pub use http::HttpApi;

use serde::Deserialize;

use crate::article::{Article, ArticleId, LoadedArticle, PublishStatus};

/// Form body shared by `/save-draft` and `/publish`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleForm {
    pub title: String,
    pub content: String,
    pub tags: String,
    pub publish_status: PublishStatus,
    pub article_id: Option<ArticleId>,
}

impl ArticleForm {
    /// Field pairs as sent in the urlencoded body; `article_id` only when known.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("title", self.title.clone()),
            ("content", self.content.clone()),
            ("tags", self.tags.clone()),
            ("publish_status", self.publish_status.as_str().to_string()),
        ];
        if let Some(id) = &self.article_id {
            fields.push(("article_id", id.to_string()));
        }
        fields
    }
}

/// Reply to `POST /save-draft`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SaveDraftResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub article_id: ArticleId,
}

/// Reply to `POST /publish`. The platform payload is passed through untouched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PublishResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: serde_json::Value,
}

impl PublishResponse {
    /// The public URL of the new post, if the platform reported one.
    pub fn url(&self) -> Option<&str> {
        self.response
            .pointer("/data/url")
            .or_else(|| self.response.get("url"))
            .and_then(serde_json::Value::as_str)
    }
}

/// Health of the backend's publishing credentials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiHealth {
    Working,
    NoToken,
    #[default]
    Error,
}

impl ApiHealth {
    fn from_wire(value: &str) -> Self {
        match value {
            "working" => Self::Working,
            "no_token" => Self::NoToken,
            _ => Self::Error,
        }
    }
}

/// Reply to `GET /api-status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiStatus {
    #[serde(deserialize_with = "health_from_wire")]
    pub status: ApiHealth,
    #[serde(default)]
    pub message: String,
}

fn health_from_wire<'de, D: serde::Deserializer<'de>>(d: D) -> Result<ApiHealth, D::Error> {
    let raw = String::deserialize(d)?;
    Ok(ApiHealth::from_wire(&raw))
}

/// Errors from talking to the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never got a response.
    #[error("{0}")]
    Transport(String),
    /// The server answered with a non-success status.
    #[error("server returned {status}{}", detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default())]
    Server { status: u16, detail: Option<String> },
    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// User-facing text: server detail verbatim, `fallback` for other server
    /// failures, and `"<context>: <message>"` for transport problems.
    pub fn notification(&self, fallback: &str, context: &str) -> String {
        match self {
            Self::Server {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::Server { detail: None, .. } | Self::Decode(_) => fallback.to_string(),
            Self::Transport(message) => format!("{context}: {message}"),
        }
    }
}

/// Operations the backend exposes.
pub trait ArticleApi: Send {
    /// Create a draft, or update the one named by `form.article_id`.
    fn save_draft(&self, form: &ArticleForm) -> Result<SaveDraftResponse, ApiError>;
    /// Publish to the external platform.
    fn publish(&self, form: &ArticleForm) -> Result<PublishResponse, ApiError>;
    fn history(&self) -> Result<Vec<Article>, ApiError>;
    fn article(&self, id: &ArticleId) -> Result<LoadedArticle, ApiError>;
    fn delete(&self, id: &ArticleId) -> Result<(), ApiError>;
    fn status(&self) -> Result<ApiStatus, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(id: Option<&str>) -> ArticleForm {
        ArticleForm {
            title: "T".to_string(),
            content: "C".to_string(),
            tags: "a, b".to_string(),
            publish_status: PublishStatus::Unlisted,
            article_id: id.map(ArticleId::new),
        }
    }

    #[test]
    fn test_fields_omit_missing_id() {
        let fields = form(None).fields();
        assert_eq!(fields.len(), 4);
        assert!(fields.iter().all(|(name, _)| *name != "article_id"));
        assert!(fields.contains(&("publish_status", "unlisted".to_string())));
    }

    #[test]
    fn test_fields_include_known_id() {
        let fields = form(Some("12")).fields();
        assert!(fields.contains(&("article_id", "12".to_string())));
    }

    #[test]
    fn test_notification_prefers_server_detail() {
        let err = ApiError::Server {
            status: 400,
            detail: Some("Title too long".to_string()),
        };
        assert_eq!(err.notification("Failed to save draft", "Error saving draft"), "Title too long");
    }

    #[test]
    fn test_notification_falls_back_without_detail() {
        let err = ApiError::Server {
            status: 500,
            detail: None,
        };
        assert_eq!(
            err.notification("Failed to save draft", "Error saving draft"),
            "Failed to save draft"
        );
    }

    #[test]
    fn test_notification_prefixes_transport_errors() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(
            err.notification("Failed to publish article", "Error publishing article"),
            "Error publishing article: connection refused"
        );
    }

    #[test]
    fn test_publish_response_url_lookup() {
        let resp: PublishResponse = serde_json::from_str(
            r#"{"success": true, "response": {"data": {"url": "https://m.example/p/1"}}}"#,
        )
        .unwrap();
        assert_eq!(resp.url(), Some("https://m.example/p/1"));
    }

    #[test]
    fn test_api_status_parses_known_states() {
        let status: ApiStatus =
            serde_json::from_str(r#"{"status": "no_token", "message": "missing"}"#).unwrap();
        assert_eq!(status.status, ApiHealth::NoToken);
        let status: ApiStatus = serde_json::from_str(r#"{"status": "odd"}"#).unwrap();
        assert_eq!(status.status, ApiHealth::Error);
    }
}
