use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{ApiError, ApiStatus, ArticleApi, ArticleForm, PublishResponse, SaveDraftResponse};
use crate::article::{Article, ArticleId, LoadedArticle};

/// [`ArticleApi`] over HTTP, talking to the backend at `base_url`.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct HistoryBody {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Deserialize)]
struct ArticleBody {
    #[serde(default)]
    article: LoadedArticle,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: serde_json::Value,
}

impl HttpApi {
    /// Build a client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the TLS backend cannot be set up.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("quillpost/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn send(&self, label: &str, request: RequestBuilder) -> Result<Response, ApiError> {
        debug!(request = label, "sending request");
        let response = request.send().map_err(|e| {
            warn!(request = label, error = %e, "request failed");
            ApiError::Transport(e.to_string())
        })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        // FastAPI reports validation failures as a list; only a plain string is shown verbatim.
        let detail = response
            .json::<ErrorBody>()
            .ok()
            .and_then(|body| body.detail.as_str().map(ToOwned::to_owned));
        warn!(request = label, status = status.as_u16(), ?detail, "server rejected request");
        Err(ApiError::Server {
            status: status.as_u16(),
            detail,
        })
    }

    fn decode<T: DeserializeOwned>(label: &str, response: Response) -> Result<T, ApiError> {
        response.json::<T>().map_err(|e| {
            warn!(request = label, error = %e, "malformed response body");
            ApiError::Decode(e.to_string())
        })
    }
}

impl ArticleApi for HttpApi {
    fn save_draft(&self, form: &ArticleForm) -> Result<SaveDraftResponse, ApiError> {
        let request = self.client.post(self.url("/save-draft")).form(&form.fields());
        let response = self.send("save-draft", request)?;
        Self::decode("save-draft", response)
    }

    fn publish(&self, form: &ArticleForm) -> Result<PublishResponse, ApiError> {
        let request = self.client.post(self.url("/publish")).form(&form.fields());
        let response = self.send("publish", request)?;
        Self::decode("publish", response)
    }

    fn history(&self) -> Result<Vec<Article>, ApiError> {
        let response = self.send("history", self.client.get(self.url("/history")))?;
        Self::decode::<HistoryBody>("history", response).map(|body| body.articles)
    }

    fn article(&self, id: &ArticleId) -> Result<LoadedArticle, ApiError> {
        let request = self.client.get(self.url(&format!("/article/{id}")));
        let response = self.send("article", request)?;
        Self::decode::<ArticleBody>("article", response).map(|body| body.article)
    }

    fn delete(&self, id: &ArticleId) -> Result<(), ApiError> {
        let request = self.client.delete(self.url(&format!("/history/{id}")));
        self.send("delete", request).map(drop)
    }

    fn status(&self) -> Result<ApiStatus, ApiError> {
        let response = self.send("api-status", self.client.get(self.url("/api-status")))?;
        Self::decode("api-status", response)
    }
}
