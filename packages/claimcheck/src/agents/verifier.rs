//! Evidence against claim classification.

use tracing::{debug, warn};

use super::{text_request, AgentSettings};
use crate::pipeline::prompts::format_verifier_prompt;
use crate::retry::RetryableCaller;
use crate::traits::generator::AgentRole;
use crate::types::{is_usable_evidence, Claim, PipelineConfig, VerificationStatus};

/// Fail-closed verifier: anything short of an exact label is `Neutral`.
#[derive(Debug, Clone)]
pub struct Verifier {
    caller: RetryableCaller,
    settings: AgentSettings,
}

impl Verifier {
    pub fn new(caller: RetryableCaller, settings: AgentSettings) -> Self {
        Self { caller, settings }
    }

    pub fn from_config(caller: RetryableCaller, config: &PipelineConfig) -> Self {
        Self::new(caller, AgentSettings::for_role(config, AgentRole::Verifier))
    }

    /// Judge `claim` against `evidence`. Blank or sentinel evidence is
    /// `Neutral` without a model call; so is a failed call.
    pub async fn verify(&self, claim: &Claim, evidence: &str) -> VerificationStatus {
        if !is_usable_evidence(evidence) {
            return VerificationStatus::Neutral;
        }

        let request = text_request(
            AgentRole::Verifier,
            &self.settings,
            format_verifier_prompt(claim, evidence),
        );

        match self.caller.call(&request).await {
            Ok(label) => {
                let status = VerificationStatus::from_label(label.trim());
                debug!(%claim, label = %label, %status, "Verified");
                status
            }
            Err(e) => {
                warn!(%claim, error = %e, "Verifier call failed, treating as Neutral");
                VerificationStatus::Neutral
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::retry::RetryPolicy;
    use crate::testing::MockLlm;
    use crate::types::SEARCH_ERROR_SENTINEL;
    use std::sync::Arc;
    use std::time::Duration;

    fn verifier(llm: MockLlm) -> (Verifier, Arc<MockLlm>) {
        let llm = Arc::new(llm);
        let caller = RetryableCaller::new(llm.clone(), RetryPolicy::new(1, Duration::ZERO));
        (Verifier::from_config(caller, &PipelineConfig::default()), llm)
    }

    fn claim() -> Claim {
        Claim::new("Ed Wood", "nationality", "American").unwrap()
    }

    #[tokio::test]
    async fn test_exact_label() {
        let (verifier, _) = verifier(MockLlm::new().with_response(AgentRole::Verifier, "Supports"));
        assert_eq!(
            verifier.verify(&claim(), "Ed Wood was an American filmmaker.").await,
            VerificationStatus::Supports
        );
    }

    #[tokio::test]
    async fn test_surrounding_whitespace_ignored() {
        let (verifier, _) = verifier(MockLlm::new().with_response(AgentRole::Verifier, "Refutes\n"));
        assert_eq!(verifier.verify(&claim(), "evidence").await, VerificationStatus::Refutes);
    }

    #[tokio::test]
    async fn test_loose_labels_are_neutral() {
        for label in ["supports", "Supports.", "The evidence Supports the claim", "SUPPORTS"] {
            let (verifier, _) = verifier(MockLlm::new().with_response(AgentRole::Verifier, label));
            assert_eq!(
                verifier.verify(&claim(), "evidence").await,
                VerificationStatus::Neutral,
                "label {label:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_unusable_evidence_skips_model() {
        let (verifier, llm) = verifier(MockLlm::new().with_response(AgentRole::Verifier, "Supports"));

        assert_eq!(verifier.verify(&claim(), "").await, VerificationStatus::Neutral);
        assert_eq!(verifier.verify(&claim(), "  \n").await, VerificationStatus::Neutral);
        assert_eq!(
            verifier.verify(&claim(), SEARCH_ERROR_SENTINEL).await,
            VerificationStatus::Neutral
        );
        assert_eq!(llm.call_count(AgentRole::Verifier), 0);
    }

    #[tokio::test]
    async fn test_call_failure_is_neutral() {
        let (verifier, llm) = verifier(
            MockLlm::new().with_failure(AgentRole::Verifier, GenerationError::Transport("reset".into())),
        );
        assert_eq!(verifier.verify(&claim(), "evidence").await, VerificationStatus::Neutral);
        assert_eq!(llm.call_count(AgentRole::Verifier), 1);
    }
}
