//! Pipeline output and its diagnostic trace.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::claim::{Claim, ClaimGraph};
use super::verification::{VerificationStatus, VerifiedFactSet};

/// Answer when the hypothesizer produced no claims.
pub const CANNOT_HYPOTHESIZE_ANSWER: &str =
    "Could not generate a hypothesis for this question, so no answer can be given.";

/// Answer when no claim could be verified.
pub const INSUFFICIENT_EVIDENCE_ANSWER: &str =
    "I could not find sufficient verified evidence to answer this question.";

/// Answer when the answerer's model call failed.
pub const ANSWER_ERROR: &str = "Error generating the final answer.";

/// Answer recorded for a case whose pipeline run never finished.
pub const PIPELINE_ERROR_ANSWER: &str = "PIPELINE_ERROR";

/// States of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    Start,
    Hypothesizing,
    /// Terminal: the claim graph was empty.
    Aborted,
    VerifyingClaims,
    Synthesizing,
    /// Terminal.
    Done,
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Aborted | Self::Done)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Hypothesizing => "hypothesizing",
            Self::Aborted => "aborted",
            Self::VerifyingClaims => "verifying_claims",
            Self::Synthesizing => "synthesizing",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// How a claim ended up after its query loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimVerdict {
    /// Some query produced `Supports`.
    Supported,
    /// No `Supports`, at least one `Refutes`.
    Refuted,
    /// Only `Neutral` verdicts, or no queries at all.
    Unverified,
}

/// One evaluated query for a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAttempt {
    pub query: String,
    pub status: VerificationStatus,
    /// False when the search failed or returned nothing usable.
    pub evidence_found: bool,
}

/// Trace of one claim through the verification loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimOutcome {
    pub claim: Claim,
    /// Everything the planner returned, in order.
    pub queries: Vec<String>,
    /// The queries actually evaluated; stops at the first `Supports`.
    pub attempts: Vec<QueryAttempt>,
    pub verdict: ClaimVerdict,
}

impl ClaimOutcome {
    /// Fold query attempts into a verdict.
    pub fn verdict_from(attempts: &[QueryAttempt]) -> ClaimVerdict {
        if attempts
            .iter()
            .any(|a| a.status == VerificationStatus::Supports)
        {
            ClaimVerdict::Supported
        } else if attempts
            .iter()
            .any(|a| a.status == VerificationStatus::Refutes)
        {
            ClaimVerdict::Refuted
        } else {
            ClaimVerdict::Unverified
        }
    }
}

/// Everything one pipeline run produced. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub question: String,
    pub claim_graph: ClaimGraph,
    /// The hypothesizer's reasoning trace, when it parsed.
    pub hypothesis_reasoning: Option<String>,
    pub claim_outcomes: Vec<ClaimOutcome>,
    pub verified_facts: VerifiedFactSet,
    pub final_answer: String,
    /// Wall-clock time from `Start` to the terminal stage.
    pub elapsed: Duration,
    pub final_stage: PipelineStage,
    /// Degradations along the way (bad structured output, failed calls).
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl PipelineResult {
    /// Synthetic result for a run that crashed or timed out.
    pub fn failed(question: impl Into<String>, elapsed: Duration, reason: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            claim_graph: ClaimGraph::empty(),
            hypothesis_reasoning: None,
            claim_outcomes: Vec::new(),
            verified_facts: VerifiedFactSet::new(),
            final_answer: PIPELINE_ERROR_ANSWER.to_string(),
            elapsed,
            final_stage: PipelineStage::Aborted,
            warnings: vec![reason.into()],
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.final_stage == PipelineStage::Aborted
    }
}
