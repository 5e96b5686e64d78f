//! LLM judge comparing a generated answer to the reference answer.

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::warn;

use super::{decode, structured_request, AgentSettings};
use crate::pipeline::prompts::format_judge_prompt;
use crate::retry::RetryableCaller;
use crate::traits::generator::AgentRole;
use crate::types::{JudgeDecision, JudgeVerdict, PipelineConfig};

#[derive(Debug, Deserialize, JsonSchema)]
struct JudgeResponse {
    reasoning: String,
    decision: String,
}

/// Grades answers. Every failure grades as `Incorrect`.
#[derive(Debug, Clone)]
pub struct Judge {
    caller: RetryableCaller,
    settings: AgentSettings,
}

impl Judge {
    pub fn new(caller: RetryableCaller, settings: AgentSettings) -> Self {
        Self { caller, settings }
    }

    pub fn from_config(caller: RetryableCaller, config: &PipelineConfig) -> Self {
        Self::new(caller, AgentSettings::for_role(config, AgentRole::Judge))
    }

    pub async fn judge(&self, question: &str, ideal_answer: &str, generated_answer: &str) -> JudgeVerdict {
        let request = structured_request::<JudgeResponse>(
            AgentRole::Judge,
            &self.settings,
            format_judge_prompt(question, ideal_answer, generated_answer),
        );

        let raw = match self.caller.call(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Judge call failed");
                return JudgeVerdict::incorrect(format!(
                    "Failed to get a response from the judge model: {e}"
                ));
            }
        };

        let response: JudgeResponse = match decode(AgentRole::Judge, &raw) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Judge output unparseable");
                return JudgeVerdict::incorrect(format!(
                    "Failed to parse judge output ({e}): {raw}"
                ));
            }
        };

        match response.decision.trim() {
            "Correct" => JudgeVerdict {
                decision: JudgeDecision::Correct,
                reasoning: response.reasoning,
            },
            "Incorrect" => JudgeVerdict::incorrect(response.reasoning),
            other => JudgeVerdict::incorrect(format!(
                "Unrecognized judge decision {other:?}, counted as Incorrect. {}",
                response.reasoning
            )),
        }
    }
}
