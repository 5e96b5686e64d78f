//! Testing utilities including mock implementations.
//!
//! These let applications exercise the pipeline and the harness without
//! making real model or search calls.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::{GenerationError, SearchError};
use crate::traits::generator::{AgentRole, GenerationRequest, TextGenerator};
use crate::traits::searcher::{SearchHit, WebSearcher};

type Responder = Arc<dyn Fn(&GenerationRequest) -> Result<String, GenerationError> + Send + Sync>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A scripted language model.
///
/// Each [`AgentRole`] gets its own responder. A role without one fails with
/// [`GenerationError::Malformed`]. Every request is recorded.
#[derive(Default)]
pub struct MockLlm {
    responders: Mutex<HashMap<AgentRole, Responder>>,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `role` with `text`.
    pub fn with_response(self, role: AgentRole, text: impl Into<String>) -> Self {
        let text = text.into();
        self.with_handler(role, move |_| Ok(text.clone()))
    }

    /// Always fail `role` with `error`.
    pub fn with_failure(self, role: AgentRole, error: GenerationError) -> Self {
        self.with_handler(role, move |_| Err(error.clone()))
    }

    /// Compute the answer for `role` from the request.
    pub fn with_handler<F>(self, role: AgentRole, handler: F) -> Self
    where
        F: Fn(&GenerationRequest) -> Result<String, GenerationError> + Send + Sync + 'static,
    {
        lock(&self.responders).insert(role, Arc::new(handler));
        self
    }

    /// Every request, in arrival order.
    pub fn calls(&self) -> Vec<GenerationRequest> {
        lock(&self.calls).clone()
    }

    pub fn calls_for(&self, role: AgentRole) -> Vec<GenerationRequest> {
        lock(&self.calls)
            .iter()
            .filter(|r| r.role == role)
            .cloned()
            .collect()
    }

    pub fn call_count(&self, role: AgentRole) -> usize {
        lock(&self.calls).iter().filter(|r| r.role == role).count()
    }
}

#[async_trait]
impl TextGenerator for MockLlm {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        lock(&self.calls).push(request.clone());
        let responder = lock(&self.responders).get(&request.role).cloned();
        match responder {
            Some(respond) => respond(request),
            None => Err(GenerationError::Malformed(format!(
                "no scripted response for {}",
                request.role
            ))),
        }
    }
}

/// A scripted search provider.
///
/// Unknown queries return no hits. Every query is recorded.
#[derive(Default)]
pub struct MockWebSearcher {
    results: Mutex<HashMap<String, Vec<SearchHit>>>,
    failing: Mutex<HashSet<String>>,
    fail_all: Mutex<Option<SearchError>>,
    queries: Mutex<Vec<String>>,
}

impl MockWebSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hits(self, query: impl Into<String>, hits: Vec<SearchHit>) -> Self {
        lock(&self.results).insert(query.into(), hits);
        self
    }

    /// Hits carrying only snippets.
    pub fn with_snippets(self, query: impl Into<String>, snippets: &[&str]) -> Self {
        let hits = snippets.iter().map(|s| SearchHit::snippet(*s)).collect();
        self.with_hits(query, hits)
    }

    /// Fail this query with a 500.
    pub fn with_failing_query(self, query: impl Into<String>) -> Self {
        lock(&self.failing).insert(query.into());
        self
    }

    /// Fail every query with `error`.
    pub fn failing_always(self, error: SearchError) -> Self {
        *lock(&self.fail_all) = Some(error);
        self
    }

    /// Every query searched, including repeats from retries.
    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl WebSearcher for MockWebSearcher {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        lock(&self.queries).push(query.to_string());

        if let Some(error) = lock(&self.fail_all).clone() {
            return Err(error);
        }
        if lock(&self.failing).contains(query) {
            return Err(SearchError::Api {
                status: 500,
                message: format!("scripted failure for {query:?}"),
            });
        }

        let mut hits = lock(&self.results).get(query).cloned().unwrap_or_default();
        hits.truncate(limit);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::generator::ChatMessage;

    #[tokio::test]
    async fn test_mock_llm_routes_by_role() {
        let llm = MockLlm::new()
            .with_response(AgentRole::Verifier, "Supports")
            .with_handler(AgentRole::Answerer, |r| {
                Ok(format!("echo: {}", r.user_prompt().unwrap_or_default()))
            });

        let verify = GenerationRequest::new(AgentRole::Verifier, "m");
        let answer = GenerationRequest::new(AgentRole::Answerer, "m").message(ChatMessage::user("hi"));
        let judge = GenerationRequest::new(AgentRole::Judge, "m");

        assert_eq!(llm.generate(&verify).await.unwrap(), "Supports");
        assert_eq!(llm.generate(&answer).await.unwrap(), "echo: hi");
        assert!(llm.generate(&judge).await.is_err());
        assert_eq!(llm.calls().len(), 3);
        assert_eq!(llm.call_count(AgentRole::Verifier), 1);
    }

    #[tokio::test]
    async fn test_mock_searcher() {
        let searcher = MockWebSearcher::new()
            .with_snippets("a", &["one", "two", "three", "four"])
            .with_failing_query("b");

        assert_eq!(searcher.search("a", 3).await.unwrap().len(), 3);
        assert!(searcher.search("b", 3).await.is_err());
        assert!(searcher.search("c", 3).await.unwrap().is_empty());
        assert_eq!(searcher.queries(), vec!["a", "b", "c"]);
    }
}
