//! Trait seams for the external collaborators.

pub mod generator;
pub mod searcher;

pub use generator::{
    AgentRole, ChatMessage, GenerationRequest, MessageRole, ResponseShape, TextGenerator,
};
pub use searcher::{SearchHit, WebSearcher};
