//! Hypothesize, verify, answer question answering over web evidence.
//!
//! A question is decomposed into the claims needed to answer it. Each claim is
//! checked against web search snippets, and the final answer is synthesized
//! from the verified claims only.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use claimcheck::{Pipeline, PipelineConfig, RetryPolicy, RetryableCaller};
//! use claimcheck::testing::{MockLlm, MockWebSearcher};
//!
//! let caller = RetryableCaller::new(Arc::new(MockLlm::new()), RetryPolicy::default());
//! let pipeline = Pipeline::new(caller, Arc::new(MockWebSearcher::new()), &PipelineConfig::default());
//!
//! let result = pipeline.run("Were Scott Derrickson and Ed Wood of the same nationality?").await;
//! println!("{}", result.final_answer);
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams for the language model and the search provider
//! - [`retry`] - Retry policy and the retrying model caller
//! - [`agents`] - Hypothesizer, planner, collector, verifier, answerer, judge
//! - [`pipeline`] - The orchestrator and its prompts
//! - [`harness`] - Concurrent evaluation with a markdown log
//! - [`ai`], [`searchers`] - OpenAI and Serper adapters
//! - [`testing`] - Mock implementations for testing

pub mod agents;
pub mod ai;
pub mod error;
pub mod harness;
pub mod pipeline;
pub mod retry;
pub mod searchers;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;

pub use agents::{
    AgentSettings, Answerer, EvidenceCollector, Hypothesis, HypothesisGenerator, Judge,
    QueryPlanner, Verifier,
};
pub use ai::OpenAiGenerator;
pub use error::{
    AgentError, CallError, ClaimError, GenerationError, HarnessError, SearchError,
    StructuredOutputError, SuiteError,
};
pub use harness::{
    load_test_suite, EvaluationHarness, EvaluationLog, EvaluationReport, RunningTotals, WorkerPool,
};
pub use pipeline::{Pipeline, PipelineObserver};
pub use retry::{retry, JitterSource, NoJitter, RandomJitter, RetryPolicy, RetryableCaller};
pub use searchers::{RateLimitedSearcher, SerperWebSearcher};
pub use security::{LlmCredentials, SecretString};
pub use traits::{
    AgentRole, ChatMessage, GenerationRequest, MessageRole, ResponseShape, SearchHit,
    TextGenerator, WebSearcher,
};
pub use types::{
    Claim, ClaimGraph, ClaimOutcome, ClaimVerdict, EvaluationRecord, EvaluationSummary, Evidence,
    HarnessConfig, JudgeDecision, JudgeVerdict, ModelConfig, PipelineConfig, PipelineResult,
    PipelineStage, QueryAttempt, TestCase, VerificationRecord, VerificationStatus,
    VerifiedFactSet, ANSWER_ERROR, CANNOT_HYPOTHESIZE_ANSWER, INSUFFICIENT_EVIDENCE_ANSWER,
    PIPELINE_ERROR_ANSWER, SEARCH_ERROR_SENTINEL,
};
