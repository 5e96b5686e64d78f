//! Language model adapters.

pub mod openai;

pub use openai::OpenAiGenerator;
