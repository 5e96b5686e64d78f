//! The pipeline's agents.
//!
//! Every model call goes through a [`RetryableCaller`]. Structured agents
//! decode into a typed response struct and reject anything that does not fit;
//! the orchestrator decides how to degrade.

pub mod answerer;
pub mod collector;
pub mod hypothesizer;
pub mod judge;
pub mod planner;
pub mod verifier;

pub use answerer::Answerer;
pub use collector::EvidenceCollector;
pub use hypothesizer::{Hypothesis, HypothesisGenerator};
pub use judge::Judge;
pub use planner::QueryPlanner;
pub use verifier::Verifier;

use openai_client::StructuredOutput;
use serde::de::DeserializeOwned;

use crate::error::{AgentResult, StructuredOutputError};
use crate::retry::RetryableCaller;
use crate::traits::generator::{AgentRole, ChatMessage, GenerationRequest, ResponseShape};
use crate::types::PipelineConfig;

/// Model settings for one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub model: String,
    pub temperature: f32,
    pub strict_schemas: bool,
}

impl AgentSettings {
    pub fn for_role(config: &PipelineConfig, role: AgentRole) -> Self {
        Self {
            model: config.models.for_role(role).to_string(),
            temperature: config.temperature,
            strict_schemas: config.strict_schemas,
        }
    }
}

pub(crate) fn text_request(role: AgentRole, settings: &AgentSettings, prompt: String) -> GenerationRequest {
    GenerationRequest::new(role, settings.model.as_str())
        .message(ChatMessage::user(prompt))
        .temperature(settings.temperature)
}

pub(crate) fn structured_request<T: StructuredOutput>(
    role: AgentRole,
    settings: &AgentSettings,
    prompt: String,
) -> GenerationRequest {
    let shape = if settings.strict_schemas {
        ResponseShape::JsonSchema {
            name: <T as StructuredOutput>::schema_name(),
            schema: T::strict_schema(),
        }
    } else {
        ResponseShape::JsonObject
    };
    text_request(role, settings, prompt).response_format(shape)
}

/// Decode a model payload into `T`. No repair is attempted.
pub(crate) fn decode<T: DeserializeOwned>(role: AgentRole, raw: &str) -> Result<T, StructuredOutputError> {
    serde_json::from_str(raw.trim())
        .map_err(|source| StructuredOutputError::InvalidPayload { role, source })
}

pub(crate) async fn call_structured<T: StructuredOutput>(
    caller: &RetryableCaller,
    role: AgentRole,
    settings: &AgentSettings,
    prompt: String,
) -> AgentResult<T> {
    let request = structured_request::<T>(role, settings, prompt);
    let raw = caller.call(&request).await?;
    Ok(decode(role, &raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct Probe {
        value: String,
    }

    fn settings(strict: bool) -> AgentSettings {
        AgentSettings {
            model: "gpt-4o".into(),
            temperature: 0.1,
            strict_schemas: strict,
        }
    }

    #[test]
    fn test_structured_request_shapes() {
        let loose = structured_request::<Probe>(AgentRole::Judge, &settings(false), "p".into());
        assert_eq!(loose.response_format, ResponseShape::JsonObject);

        let strict = structured_request::<Probe>(AgentRole::Judge, &settings(true), "p".into());
        match strict.response_format {
            ResponseShape::JsonSchema { name, schema } => {
                assert_eq!(name, "Probe");
                assert_eq!(schema["additionalProperties"], false);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_missing_field() {
        let ok: Probe = decode(AgentRole::Judge, r#" {"value": "x"} "#).unwrap();
        assert_eq!(ok.value, "x");

        let err = decode::<Probe>(AgentRole::Judge, r#"{"other": 1}"#).unwrap_err();
        assert!(matches!(
            err,
            StructuredOutputError::InvalidPayload {
                role: AgentRole::Judge,
                ..
            }
        ));
        assert!(decode::<Probe>(AgentRole::Judge, "not json").is_err());
    }

    #[test]
    fn test_settings_follow_role() {
        let config = PipelineConfig::default();
        let planner = AgentSettings::for_role(&config, AgentRole::QueryPlanner);
        assert_eq!(planner.model, "gpt-4o-mini");
        assert_eq!(planner.temperature, 0.1);
    }
}
