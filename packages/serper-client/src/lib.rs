//! Pure Serper.dev REST API client.
//!
//! A minimal client for Google results via Serper. One call, one request:
//! retries and rate limiting belong to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use serper_client::SerperClient;
//!
//! let client = SerperClient::new("your-api-key".into());
//!
//! let results = client.search("Scott Derrickson nationality", 3).await?;
//! for hit in &results {
//!     println!("{}: {}", hit.title, hit.snippet.as_deref().unwrap_or(""));
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{Result, SerperError};
pub use types::{OrganicResult, SearchRequest, SearchResponse};

use std::time::Duration;

const BASE_URL: &str = "https://google.serper.dev";

#[derive(Clone)]
pub struct SerperClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for SerperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerperClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SerperClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point at a different host (proxies, local fakes).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound every request by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Run a web search and return at most `num` organic results in ranking order.
    pub async fn search(&self, query: &str, num: usize) -> Result<Vec<OrganicResult>> {
        let request = SearchRequest {
            q: query.to_string(),
            num,
        };

        let resp = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("X-API-KEY", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SerperError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| SerperError::Malformed(e.to_string()))?;

        tracing::debug!(query, returned = parsed.organic.len(), "Serper search");

        Ok(parsed.organic.into_iter().take(num).collect())
    }
}
