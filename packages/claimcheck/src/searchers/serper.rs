//! Serper-backed web searcher.

use std::time::Duration;

use async_trait::async_trait;
use serper_client::{SerperClient, SerperError};

use crate::error::SearchError;
use crate::security::SecretString;
use crate::traits::searcher::{SearchHit, WebSearcher};

/// Google results through Serper.dev.
#[derive(Debug, Clone)]
pub struct SerperWebSearcher {
    client: SerperClient,
}

impl SerperWebSearcher {
    pub fn new(client: SerperClient) -> Self {
        Self { client }
    }

    pub fn from_api_key(api_key: &SecretString, timeout: Option<Duration>) -> Result<Self, SearchError> {
        let mut client = SerperClient::new(api_key.expose().to_string());
        if let Some(timeout) = timeout {
            client = client.with_timeout(timeout)?;
        }
        Ok(Self::new(client))
    }
}

impl From<SerperError> for SearchError {
    fn from(err: SerperError) -> Self {
        match err {
            SerperError::Http(e) => Self::Transport(e.to_string()),
            SerperError::Api { status, message } => Self::Api { status, message },
            SerperError::Malformed(msg) => Self::Malformed(msg),
        }
    }
}

#[async_trait]
impl WebSearcher for SerperWebSearcher {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        let results = self.client.search(query, limit).await?;

        Ok(results
            .into_iter()
            .map(|r| SearchHit {
                title: Some(r.title).filter(|t| !t.is_empty()),
                url: Some(r.link).filter(|l| !l.is_empty()),
                snippet: r.snippet,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let api = SearchError::from(SerperError::Api {
            status: 403,
            message: "bad key".into(),
        });
        assert_eq!(
            api,
            SearchError::Api {
                status: 403,
                message: "bad key".into()
            }
        );
        assert!(matches!(
            SearchError::from(SerperError::Malformed("eof".into())),
            SearchError::Malformed(_)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = SerperClient::new("key".into())
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2))
            .unwrap();
        let searcher = SerperWebSearcher::new(client);

        let err = searcher.search("Ed Wood nationality", 3).await.unwrap_err();
        assert!(matches!(err, SearchError::Transport(_)));
    }
}
