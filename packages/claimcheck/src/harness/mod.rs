//! Concurrent evaluation harness.
//!
//! ```text
//! cases ─► WorkerPool (W tasks) ─► per case: spawn(pipeline.run + judge)
//!                                       │
//!                          records ◄────┘ (mpsc, arrival order)
//!                             │
//!                             └─► accumulator: log append, running totals, progress
//! ```
//!
//! A case that panics or misses its deadline becomes a failed record. It
//! never stops the batch.

pub mod log;
pub mod pool;
pub mod suite;

pub use log::EvaluationLog;
pub use pool::WorkerPool;
pub use suite::load_test_suite;

use std::any::Any;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::task::JoinError;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::agents::Judge;
use crate::error::HarnessError;
use crate::pipeline::Pipeline;
use crate::types::{
    EvaluationRecord, EvaluationSummary, HarnessConfig, JudgeVerdict, PipelineResult, TestCase,
};

/// Totals maintained by the accumulator while a run is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningTotals {
    pub total: usize,
    pub completed: usize,
    pub successes: usize,
    pub latency_sum_secs: f64,
}

impl RunningTotals {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    fn record(&mut self, record: &EvaluationRecord) {
        self.completed += 1;
        self.latency_sum_secs += record.latency_secs();
        if record.success {
            self.successes += 1;
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.completed == 0 {
            0.0
        } else {
            self.successes as f64 / self.completed as f64
        }
    }
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub started_at: DateTime<Local>,
    /// In arrival order.
    pub records: Vec<EvaluationRecord>,
    pub summary: EvaluationSummary,
}

pub struct EvaluationHarness {
    pipeline: Arc<Pipeline>,
    judge: Arc<Judge>,
    config: HarnessConfig,
}

impl EvaluationHarness {
    pub fn new(pipeline: Pipeline, judge: Judge, config: HarnessConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            judge: Arc::new(judge),
            config,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Apply `max_samples`: keep the first N cases.
    pub fn select_cases(&self, mut cases: Vec<TestCase>) -> Vec<TestCase> {
        if let Some(max) = self.config.max_samples {
            if max > 0 && max < cases.len() {
                info!(max, available = cases.len(), "Limiting evaluation to the first samples");
                cases.truncate(max);
            }
        }
        cases
    }

    /// Load `suite`, run it, and append the results to the log at `log_path`.
    pub async fn run_suite(
        &self,
        suite: impl AsRef<Path>,
        log_path: impl AsRef<Path>,
        on_record: impl FnMut(&EvaluationRecord, &RunningTotals),
    ) -> Result<EvaluationReport, HarnessError> {
        let cases = load_test_suite(suite).await?;
        let log = EvaluationLog::open(log_path).await?;
        self.run(cases, Some(&log), on_record).await
    }

    /// Evaluate `cases` on the worker pool.
    ///
    /// `on_record` is called once per finished case, in arrival order, after
    /// the record has been logged.
    pub async fn run(
        &self,
        cases: Vec<TestCase>,
        log: Option<&EvaluationLog>,
        mut on_record: impl FnMut(&EvaluationRecord, &RunningTotals),
    ) -> Result<EvaluationReport, HarnessError> {
        if cases.is_empty() {
            return Err(HarnessError::EmptySuite);
        }
        let cases = self.select_cases(cases);
        let total = cases.len();

        let started_at = Local::now();
        if let Some(log) = log {
            log.write_run_header(started_at).await?;
        }

        let pool = WorkerPool::new(self.config.workers);
        info!(total, workers = pool.workers(), "Starting evaluation");

        let pipeline = self.pipeline.clone();
        let judge = self.judge.clone();
        let deadline = self.config.run_timeout;
        let mut rx = pool.run(cases, move |case| {
            evaluate_case(pipeline.clone(), judge.clone(), case, deadline)
        });

        let mut totals = RunningTotals::new(total);
        let mut records = Vec::with_capacity(total);
        while let Some(record) = rx.recv().await {
            if let Some(log) = log {
                if let Err(e) = log.append(&record).await {
                    warn!(path = %log.path().display(), error = %e, "Failed to append evaluation record");
                }
            }
            totals.record(&record);
            on_record(&record, &totals);
            records.push(record);
        }

        let summary = EvaluationSummary::from_records(&records);
        if let Some(log) = log {
            if let Err(e) = log.write_summary(&summary).await {
                warn!(path = %log.path().display(), error = %e, "Failed to write run summary");
            }
        }

        info!(
            samples = summary.sample_count,
            success_rate = summary.success_rate,
            mean_latency_secs = summary.mean_latency_secs,
            "Evaluation finished"
        );

        Ok(EvaluationReport {
            started_at,
            records,
            summary,
        })
    }
}

/// Run the pipeline and the judge for one case in its own task.
async fn evaluate_case(
    pipeline: Arc<Pipeline>,
    judge: Arc<Judge>,
    case: TestCase,
    deadline: Option<Duration>,
) -> EvaluationRecord {
    let started = Instant::now();
    let task_case = case.clone();
    let work = tokio::spawn(async move {
        let result = pipeline.run(&task_case.question).await;
        let verdict = judge
            .judge(&task_case.question, &task_case.ideal_answer, &result.final_answer)
            .await;
        (result, verdict)
    });

    let outcome = match deadline {
        Some(limit) => {
            let abort = work.abort_handle();
            match tokio::time::timeout(limit, work).await {
                Ok(joined) => joined.map_err(describe_join_error),
                Err(_) => {
                    abort.abort();
                    Err(format!("run exceeded the {:.1}s deadline", limit.as_secs_f64()))
                }
            }
        }
        None => work.await.map_err(describe_join_error),
    };

    match outcome {
        Ok((result, verdict)) => EvaluationRecord::new(case, result, verdict),
        Err(reason) => {
            warn!(question = %case.question, %reason, "Test case failed");
            let result = PipelineResult::failed(case.question.as_str(), started.elapsed(), reason.as_str());
            let verdict = JudgeVerdict::incorrect(format!("An unexpected error occurred: {reason}"));
            EvaluationRecord::new(case, result, verdict)
        }
    }
}

fn describe_join_error(err: JoinError) -> String {
    if err.is_panic() {
        format!("pipeline panicked: {}", panic_message(err.into_panic()))
    } else {
        "pipeline task was cancelled".to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(msg) => *msg,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown panic".to_string()),
    }
}
