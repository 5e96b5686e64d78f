//! Question to claim graph.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

use super::{call_structured, AgentSettings};
use crate::error::{AgentResult, StructuredOutputError};
use crate::pipeline::prompts::format_hypothesizer_prompt;
use crate::retry::RetryableCaller;
use crate::traits::generator::AgentRole;
use crate::types::{Claim, ClaimGraph, PipelineConfig};

#[derive(Debug, Deserialize, JsonSchema)]
struct HypothesisResponse {
    reasoning: String,
    triples: Vec<Vec<String>>,
}

/// A parsed hypothesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hypothesis {
    pub reasoning: String,
    pub claims: ClaimGraph,
}

#[derive(Debug, Clone)]
pub struct HypothesisGenerator {
    caller: RetryableCaller,
    settings: AgentSettings,
}

impl HypothesisGenerator {
    pub fn new(caller: RetryableCaller, settings: AgentSettings) -> Self {
        Self { caller, settings }
    }

    pub fn from_config(caller: RetryableCaller, config: &PipelineConfig) -> Self {
        Self::new(caller, AgentSettings::for_role(config, AgentRole::Hypothesizer))
    }

    /// Ask for the claims needed to answer `question`.
    ///
    /// A single malformed triple rejects the whole response.
    pub async fn generate(&self, question: &str) -> AgentResult<Hypothesis> {
        let response: HypothesisResponse = call_structured(
            &self.caller,
            AgentRole::Hypothesizer,
            &self.settings,
            format_hypothesizer_prompt(question),
        )
        .await?;

        let claims = response
            .triples
            .into_iter()
            .enumerate()
            .map(|(index, triple)| {
                Claim::try_from(triple)
                    .map_err(|reason| StructuredOutputError::InvalidClaim { index, reason })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(claims = claims.len(), "Hypothesis generated");

        Ok(Hypothesis {
            reasoning: response.reasoning,
            claims: ClaimGraph::new(claims),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AgentError, ClaimError};
    use crate::retry::RetryPolicy;
    use crate::testing::MockLlm;
    use std::sync::Arc;
    use std::time::Duration;

    fn generator(llm: MockLlm) -> (HypothesisGenerator, Arc<MockLlm>) {
        let llm = Arc::new(llm);
        let caller = RetryableCaller::new(llm.clone(), RetryPolicy::new(1, Duration::ZERO));
        (
            HypothesisGenerator::from_config(caller, &PipelineConfig::default()),
            llm,
        )
    }

    #[tokio::test]
    async fn test_parses_claims_in_order() {
        let (hypothesizer, llm) = generator(MockLlm::new().with_response(
            AgentRole::Hypothesizer,
            r#"{"reasoning": "compare nationalities",
                "triples": [["Scott Derrickson", "nationality", "?"], ["Ed Wood", "nationality", "?"]]}"#,
        ));

        let hypothesis = hypothesizer.generate("Were Scott Derrickson and Ed Wood of the same nationality?").await.unwrap();

        assert_eq!(hypothesis.reasoning, "compare nationalities");
        let subjects: Vec<_> = hypothesis.claims.iter().map(Claim::subject).collect();
        assert_eq!(subjects, vec!["Scott Derrickson", "Ed Wood"]);

        let request = &llm.calls_for(AgentRole::Hypothesizer)[0];
        assert_eq!(request.model, "gpt-4o");
        assert!(request.user_prompt().unwrap().contains("Scott Derrickson and Ed Wood"));
    }

    #[tokio::test]
    async fn test_wrong_arity_rejected() {
        let (hypothesizer, _) = generator(MockLlm::new().with_response(
            AgentRole::Hypothesizer,
            r#"{"reasoning": "r", "triples": [["A", "nationality", "?"], ["B", "nationality"]]}"#,
        ));

        let err = hypothesizer.generate("q").await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::StructuredOutput(StructuredOutputError::InvalidClaim {
                index: 1,
                reason: ClaimError::WrongArity(2)
            })
        ));
    }

    #[tokio::test]
    async fn test_missing_field_rejected() {
        let (hypothesizer, _) = generator(
            MockLlm::new().with_response(AgentRole::Hypothesizer, r#"{"reasoning": "r"}"#),
        );
        let err = hypothesizer.generate("q").await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::StructuredOutput(StructuredOutputError::InvalidPayload { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_triples_is_empty_graph() {
        let (hypothesizer, _) = generator(MockLlm::new().with_response(
            AgentRole::Hypothesizer,
            r#"{"reasoning": "nothing to check", "triples": []}"#,
        ));
        let hypothesis = hypothesizer.generate("q").await.unwrap();
        assert!(hypothesis.claims.is_empty());
    }

    #[tokio::test]
    async fn test_call_failure_surfaces() {
        let (hypothesizer, _) = generator(MockLlm::new());
        let err = hypothesizer.generate("q").await.unwrap_err();
        assert!(matches!(err, AgentError::Call(_)));
    }
}
