//! The hypothesize, verify, answer pipeline.

pub mod orchestrator;
pub mod prompts;

pub use orchestrator::{Pipeline, PipelineObserver};
