//! Query to evidence text.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::retry::{retry, JitterSource, RandomJitter, RetryPolicy};
use crate::traits::searcher::WebSearcher;
use crate::types::Evidence;

/// Runs a query against the search provider and flattens the snippets.
///
/// Provider failures never escape: after the retry budget they become
/// [`Evidence::Unavailable`].
#[derive(Clone)]
pub struct EvidenceCollector {
    searcher: Arc<dyn WebSearcher>,
    policy: RetryPolicy,
    jitter: Arc<dyn JitterSource>,
    result_count: usize,
}

impl EvidenceCollector {
    pub fn new(searcher: Arc<dyn WebSearcher>, policy: RetryPolicy, result_count: usize) -> Self {
        Self {
            searcher,
            policy,
            jitter: Arc::new(RandomJitter),
            result_count,
        }
    }

    pub fn with_jitter_source(mut self, jitter: Arc<dyn JitterSource>) -> Self {
        self.jitter = jitter;
        self
    }

    pub async fn collect(&self, query: &str) -> Evidence {
        let outcome = retry(&self.policy, self.jitter.as_ref(), "search", |_| {
            self.searcher.search(query, self.result_count)
        })
        .await;

        match outcome {
            Ok(hits) => {
                let snippets: Vec<&str> = hits
                    .iter()
                    .take(self.result_count)
                    .filter_map(|hit| hit.snippet.as_deref())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect();
                debug!(query, snippets = snippets.len(), "Evidence collected");
                Evidence::Snippets(snippets.join("\n"))
            }
            Err(e) => {
                warn!(query, error = %e, "Search unavailable");
                Evidence::Unavailable
            }
        }
    }
}

impl std::fmt::Debug for EvidenceCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceCollector")
            .field("policy", &self.policy)
            .field("result_count", &self.result_count)
            .finish_non_exhaustive()
    }
}
