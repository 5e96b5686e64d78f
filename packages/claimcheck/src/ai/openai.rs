//! OpenAI implementation of the [`TextGenerator`] trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use claimcheck::ai::OpenAiGenerator;
//! use claimcheck::security::LlmCredentials;
//!
//! let generator = OpenAiGenerator::from_credentials(&LlmCredentials::new("sk-..."), None)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient, OpenAIError};
use tracing::debug;

use crate::error::GenerationError;
use crate::security::LlmCredentials;
use crate::traits::generator::{
    ChatMessage, GenerationRequest, MessageRole, ResponseShape, TextGenerator,
};

/// Chat-completions backed generator.
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    client: OpenAIClient,
}

impl OpenAiGenerator {
    pub fn new(client: OpenAIClient) -> Self {
        Self { client }
    }

    /// Build a client from credentials, optionally bounding each request.
    pub fn from_credentials(
        credentials: &LlmCredentials,
        timeout: Option<Duration>,
    ) -> openai_client::Result<Self> {
        let mut client = OpenAIClient::new(credentials.api_key.expose());
        if let Some(url) = &credentials.base_url {
            client = client.with_base_url(url.as_str());
        }
        if let Some(timeout) = timeout {
            client = client.with_timeout(timeout)?;
        }
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &OpenAIClient {
        &self.client
    }
}

fn to_chat_request(request: &GenerationRequest) -> ChatRequest {
    let chat = request
        .messages
        .iter()
        .map(to_message)
        .fold(ChatRequest::new(request.model.as_str()), ChatRequest::message)
        .temperature(request.temperature);

    match &request.response_format {
        ResponseShape::Text => chat,
        ResponseShape::JsonObject => chat.json_object(),
        ResponseShape::JsonSchema { name, schema } => chat.json_schema(name.as_str(), schema.clone()),
    }
}

fn to_message(message: &ChatMessage) -> Message {
    match message.role {
        MessageRole::System => Message::system(message.content.as_str()),
        MessageRole::User => Message::user(message.content.as_str()),
        MessageRole::Assistant => Message::assistant(message.content.as_str()),
    }
}

impl From<OpenAIError> for GenerationError {
    fn from(err: OpenAIError) -> Self {
        match err {
            OpenAIError::Network(msg) | OpenAIError::Config(msg) => Self::Transport(msg),
            OpenAIError::Api { status, message } => Self::Api { status, message },
            OpenAIError::Parse(msg) => Self::Malformed(msg),
            OpenAIError::EmptyResponse { model } => {
                Self::Malformed(format!("{model} returned no content"))
            }
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let response = self.client.chat_completion(to_chat_request(request)).await?;

        if let Some(usage) = &response.usage {
            debug!(
                role = %request.role,
                model = %request.model,
                total_tokens = usage.total_tokens,
                "Generation usage"
            );
        }

        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::generator::AgentRole;
    use openai_client::ResponseFormat;

    #[test]
    fn test_request_mapping() {
        let request = GenerationRequest::new(AgentRole::QueryPlanner, "gpt-4o-mini")
            .message(ChatMessage::system("plan"))
            .message(ChatMessage::user("claim"))
            .temperature(0.1)
            .response_format(ResponseShape::JsonObject);

        let chat = to_chat_request(&request);
        assert_eq!(chat.model, "gpt-4o-mini");
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0], Message::system("plan"));
        assert_eq!(chat.temperature, Some(0.1));
        assert!(matches!(chat.response_format, Some(ResponseFormat::JsonObject)));
    }

    #[test]
    fn test_text_shape_sends_no_format() {
        let request = GenerationRequest::new(AgentRole::Verifier, "gpt-4o");
        assert!(to_chat_request(&request).response_format.is_none());
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            GenerationError::from(OpenAIError::Network("refused".into())),
            GenerationError::Transport("refused".into())
        );
        assert_eq!(
            GenerationError::from(OpenAIError::Api {
                status: 429,
                message: "slow down".into()
            }),
            GenerationError::Api {
                status: 429,
                message: "slow down".into()
            }
        );
        assert!(matches!(
            GenerationError::from(OpenAIError::EmptyResponse { model: "m".into() }),
            GenerationError::Malformed(_)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let credentials = LlmCredentials::new("sk-test").with_base_url("http://127.0.0.1:9");
        let generator =
            OpenAiGenerator::from_credentials(&credentials, Some(Duration::from_secs(2))).unwrap();
        let request = GenerationRequest::new(AgentRole::Answerer, "gpt-4o")
            .message(ChatMessage::user("hi"));

        let err = generator.generate(&request).await.unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
    }
}
