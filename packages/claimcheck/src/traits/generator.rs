//! Text generation seam.
//!
//! Every agent talks to the language model through [`TextGenerator`]. The
//! OpenAI adapter lives in [`crate::ai`]; tests use
//! [`MockLlm`](crate::testing::MockLlm).

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Which pipeline step issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentRole {
    Hypothesizer,
    QueryPlanner,
    Verifier,
    Answerer,
    Judge,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hypothesizer => "hypothesizer",
            Self::QueryPlanner => "query_planner",
            Self::Verifier => "verifier",
            Self::Answerer => "answerer",
            Self::Judge => "judge",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Output shape requested from the model.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    Text,
    JsonObject,
    JsonSchema {
        name: String,
        schema: serde_json::Value,
    },
}

/// One text-generation request, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub role: AgentRole,
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub response_format: ResponseShape,
}

impl GenerationRequest {
    pub fn new(role: AgentRole, model: impl Into<String>) -> Self {
        Self {
            role,
            model: model.into(),
            messages: Vec::new(),
            temperature: 0.0,
            response_format: ResponseShape::Text,
        }
    }

    pub fn message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn response_format(mut self, shape: ResponseShape) -> Self {
        self.response_format = shape;
        self
    }

    /// Content of the last user message, if any.
    pub fn user_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }
}

/// A language model endpoint. One call, one attempt: retries belong to
/// [`RetryableCaller`](crate::retry::RetryableCaller).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Return the model's text payload for `request`.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}
