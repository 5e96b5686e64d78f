//! Web search seam.
//!
//! Implementations:
//!
//! - [`SerperWebSearcher`](crate::searchers::SerperWebSearcher) - Serper.dev Google results
//! - [`RateLimitedSearcher`](crate::searchers::RateLimitedSearcher) - quota wrapper for any searcher
//! - [`MockWebSearcher`](crate::testing::MockWebSearcher) - for tests

use async_trait::async_trait;

use crate::error::SearchError;

/// One organic search hit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHit {
    pub title: Option<String>,
    pub url: Option<String>,
    pub snippet: Option<String>,
}

impl SearchHit {
    pub fn snippet(text: impl Into<String>) -> Self {
        Self {
            snippet: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Return at most `limit` hits for `query`, in ranking order.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError>;
}
