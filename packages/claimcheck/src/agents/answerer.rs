//! Verified facts to final answer.

use tracing::warn;

use super::{text_request, AgentSettings};
use crate::pipeline::prompts::format_answerer_prompt;
use crate::retry::RetryableCaller;
use crate::traits::generator::AgentRole;
use crate::types::{PipelineConfig, VerifiedFactSet, ANSWER_ERROR, INSUFFICIENT_EVIDENCE_ANSWER};

#[derive(Debug, Clone)]
pub struct Answerer {
    caller: RetryableCaller,
    settings: AgentSettings,
}

impl Answerer {
    pub fn new(caller: RetryableCaller, settings: AgentSettings) -> Self {
        Self { caller, settings }
    }

    pub fn from_config(caller: RetryableCaller, config: &PipelineConfig) -> Self {
        Self::new(caller, AgentSettings::for_role(config, AgentRole::Answerer))
    }

    /// Answer `question` from `facts` only.
    ///
    /// An empty fact set returns [`INSUFFICIENT_EVIDENCE_ANSWER`] without a
    /// model call; a failed call returns [`ANSWER_ERROR`].
    pub async fn answer(&self, question: &str, facts: &VerifiedFactSet) -> String {
        if facts.is_empty() {
            return INSUFFICIENT_EVIDENCE_ANSWER.to_string();
        }

        let request = text_request(
            AgentRole::Answerer,
            &self.settings,
            format_answerer_prompt(question, facts),
        );

        match self.caller.call(&request).await {
            Ok(answer) => answer.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "Answerer call failed");
                ANSWER_ERROR.to_string()
            }
        }
    }
}
