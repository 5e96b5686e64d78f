//! Claim to search queries.

use schemars::JsonSchema;
use serde::Deserialize;

use super::{call_structured, AgentSettings};
use crate::error::AgentResult;
use crate::pipeline::prompts::format_query_planner_prompt;
use crate::retry::RetryableCaller;
use crate::traits::generator::AgentRole;
use crate::types::{Claim, PipelineConfig};

#[derive(Debug, Deserialize, JsonSchema)]
struct QueryPlan {
    queries: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct QueryPlanner {
    caller: RetryableCaller,
    settings: AgentSettings,
    max_queries: usize,
}

impl QueryPlanner {
    pub fn new(caller: RetryableCaller, settings: AgentSettings, max_queries: usize) -> Self {
        Self {
            caller,
            settings,
            max_queries,
        }
    }

    pub fn from_config(caller: RetryableCaller, config: &PipelineConfig) -> Self {
        Self::new(
            caller,
            AgentSettings::for_role(config, AgentRole::QueryPlanner),
            config.max_queries_per_claim,
        )
    }

    /// Queries for `claim` in the model's order. Order is verification
    /// precedence, so it is never rearranged.
    pub async fn plan(&self, claim: &Claim) -> AgentResult<Vec<String>> {
        let plan: QueryPlan = call_structured(
            &self.caller,
            AgentRole::QueryPlanner,
            &self.settings,
            format_query_planner_prompt(claim),
        )
        .await?;

        Ok(normalize_queries(plan.queries, self.max_queries))
    }
}

/// Trim, drop blanks and repeats (first occurrence wins), cap at `max`.
fn normalize_queries(raw: Vec<String>, max: usize) -> Vec<String> {
    let mut queries: Vec<String> = Vec::with_capacity(max.min(raw.len()));
    for query in raw {
        if queries.len() == max {
            break;
        }
        let query = query.trim();
        if query.is_empty() || queries.iter().any(|q| q == query) {
            continue;
        }
        queries.push(query.to_string());
    }
    queries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use crate::retry::RetryPolicy;
    use crate::testing::MockLlm;
    use std::sync::Arc;
    use std::time::Duration;

    fn planner(response: &str) -> QueryPlanner {
        let llm = Arc::new(MockLlm::new().with_response(AgentRole::QueryPlanner, response));
        let caller = RetryableCaller::new(llm, RetryPolicy::new(1, Duration::ZERO));
        QueryPlanner::from_config(caller, &PipelineConfig::default())
    }

    fn claim() -> Claim {
        Claim::new("Ed Wood", "nationality", "?").unwrap()
    }

    #[tokio::test]
    async fn test_keeps_model_order() {
        let queries = planner(r#"{"queries": ["Ed Wood nationality", "Ed Wood birthplace", "American film directors Ed Wood"]}"#)
            .plan(&claim())
            .await
            .unwrap();
        assert_eq!(
            queries,
            vec!["Ed Wood nationality", "Ed Wood birthplace", "American film directors Ed Wood"]
        );
    }

    #[tokio::test]
    async fn test_empty_list_is_valid() {
        let queries = planner(r#"{"queries": []}"#).plan(&claim()).await.unwrap();
        assert!(queries.is_empty());
    }

    #[tokio::test]
    async fn test_bad_payload_is_error() {
        let err = planner(r#"["a", "b"]"#).plan(&claim()).await.unwrap_err();
        assert!(matches!(err, AgentError::StructuredOutput(_)));
    }

    #[test]
    fn test_normalize() {
        let raw = vec![
            " a ".to_string(),
            "".to_string(),
            "a".to_string(),
            "b".to_string(),
            "   ".to_string(),
            "c".to_string(),
            "d".to_string(),
        ];
        assert_eq!(normalize_queries(raw, 3), vec!["a", "b", "c"]);
        assert!(normalize_queries(vec!["x".into()], 0).is_empty());
    }
}
