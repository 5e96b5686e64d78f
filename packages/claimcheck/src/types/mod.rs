//! Data model for claims, verification, pipeline results, and evaluation.

pub mod claim;
pub mod config;
pub mod evaluation;
pub mod result;
pub mod verification;

pub use claim::{Claim, ClaimGraph};
pub use config::{HarnessConfig, ModelConfig, PipelineConfig};
pub use evaluation::{EvaluationRecord, EvaluationSummary, JudgeDecision, JudgeVerdict, TestCase};
pub use result::{
    ClaimOutcome, ClaimVerdict, PipelineResult, PipelineStage, QueryAttempt, ANSWER_ERROR,
    CANNOT_HYPOTHESIZE_ANSWER, INSUFFICIENT_EVIDENCE_ANSWER, PIPELINE_ERROR_ANSWER,
};
pub use verification::{
    is_usable_evidence, Evidence, VerificationRecord, VerificationStatus, VerifiedFactSet,
    SEARCH_ERROR_SENTINEL,
};
