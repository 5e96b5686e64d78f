//! Evaluation inputs, per-case records, and run summaries.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::result::PipelineResult;

/// One question with its reference answer. Extra JSONL fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub question: String,
    #[serde(rename = "answer")]
    pub ideal_answer: String,
}

impl TestCase {
    pub fn new(question: impl Into<String>, ideal_answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ideal_answer: ideal_answer.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JudgeDecision {
    Correct,
    Incorrect,
}

impl fmt::Display for JudgeDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Correct => f.write_str("Correct"),
            Self::Incorrect => f.write_str("Incorrect"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeVerdict {
    pub decision: JudgeDecision,
    pub reasoning: String,
}

impl JudgeVerdict {
    pub fn incorrect(reasoning: impl Into<String>) -> Self {
        Self {
            decision: JudgeDecision::Incorrect,
            reasoning: reasoning.into(),
        }
    }
}

/// Outcome of one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub test_case: TestCase,
    pub pipeline_result: PipelineResult,
    pub judge_verdict: JudgeVerdict,
    pub success: bool,
}

impl EvaluationRecord {
    pub fn new(test_case: TestCase, pipeline_result: PipelineResult, judge_verdict: JudgeVerdict) -> Self {
        let success = judge_verdict.decision == JudgeDecision::Correct;
        Self {
            test_case,
            pipeline_result,
            judge_verdict,
            success,
        }
    }

    pub fn latency_secs(&self) -> f64 {
        self.pipeline_result.elapsed.as_secs_f64()
    }
}

/// Aggregate metrics over one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub sample_count: usize,
    pub success_count: usize,
    /// Fraction in `[0, 1]`.
    pub success_rate: f64,
    pub mean_latency_secs: f64,
    /// Population standard deviation.
    pub std_dev_latency_secs: f64,
}

impl EvaluationSummary {
    /// All zeros for an empty run.
    pub fn from_records(records: &[EvaluationRecord]) -> Self {
        let successes = records.iter().filter(|r| r.success).count();
        let latencies: Vec<f64> = records.iter().map(EvaluationRecord::latency_secs).collect();
        Self::from_parts(successes, &latencies)
    }

    /// Build from a success count and the latency of every record.
    pub fn from_parts(success_count: usize, latencies: &[f64]) -> Self {
        let n = latencies.len();
        if n == 0 {
            return Self {
                sample_count: 0,
                success_count: 0,
                success_rate: 0.0,
                mean_latency_secs: 0.0,
                std_dev_latency_secs: 0.0,
            };
        }

        let mean = latencies.iter().sum::<f64>() / n as f64;
        let variance = latencies.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / n as f64;

        Self {
            sample_count: n,
            success_count,
            success_rate: success_count as f64 / n as f64,
            mean_latency_secs: mean,
            std_dev_latency_secs: variance.sqrt(),
        }
    }

    pub fn success_percent(&self) -> f64 {
        self.success_rate * 100.0
    }
}
