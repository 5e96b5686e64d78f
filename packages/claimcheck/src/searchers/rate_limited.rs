//! Rate-limited searcher wrapper.
//!
//! Wraps any [`WebSearcher`] with a `governor` quota so a wide worker pool
//! cannot exceed the provider's request budget.

use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};

use crate::error::SearchError;
use crate::traits::searcher::{SearchHit, WebSearcher};

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A searcher that waits for a permit before every request.
pub struct RateLimitedSearcher<S: WebSearcher> {
    inner: S,
    limiter: Arc<DefaultRateLimiter>,
}

impl<S: WebSearcher> RateLimitedSearcher<S> {
    pub fn new(searcher: S, requests_per_second: NonZeroU32) -> Self {
        Self::with_quota(searcher, Quota::per_second(requests_per_second))
    }

    /// Sustained rate with a larger instantaneous burst.
    pub fn with_burst(searcher: S, requests_per_second: NonZeroU32, burst: NonZeroU32) -> Self {
        Self::with_quota(
            searcher,
            Quota::per_second(requests_per_second).allow_burst(burst),
        )
    }

    pub fn with_quota(searcher: S, quota: Quota) -> Self {
        Self {
            inner: searcher,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: WebSearcher> WebSearcher for RateLimitedSearcher<S> {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        self.limiter.until_ready().await;
        self.inner.search(query, limit).await
    }
}
