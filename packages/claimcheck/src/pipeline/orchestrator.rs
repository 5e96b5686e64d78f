//! Pipeline orchestrator: hypothesize, verify each claim, answer.
//!
//! ```text
//! Start -> Hypothesizing -> Aborted            (empty claim graph)
//!                        -> VerifyingClaims -> Synthesizing -> Done
//! ```
//!
//! Nothing here returns an error. Agent failures degrade (empty graph, no
//! queries, `Neutral`, fixed answers) and are recorded as warnings on the
//! [`PipelineResult`].

use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use futures::future;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::agents::{Answerer, EvidenceCollector, HypothesisGenerator, QueryPlanner, Verifier};
use crate::retry::RetryableCaller;
use crate::traits::searcher::WebSearcher;
use crate::types::{
    Claim, ClaimGraph, ClaimOutcome, Evidence, PipelineConfig, PipelineResult, PipelineStage, QueryAttempt,
    VerificationStatus, VerifiedFactSet, CANNOT_HYPOTHESIZE_ANSWER,
};

/// Progress hooks for one run. Every method defaults to a no-op.
pub trait PipelineObserver: Send + Sync {
    fn on_stage(&self, _stage: PipelineStage) {}

    fn on_hypothesis(&self, _claims: &ClaimGraph, _reasoning: Option<&str>) {}

    fn on_claim_start(&self, _index: usize, _claim: &Claim) {}

    fn on_queries(&self, _claim: &Claim, _queries: &[String]) {}

    fn on_query_verdict(&self, _claim: &Claim, _attempt: &QueryAttempt) {}

    fn on_claim_done(&self, _outcome: &ClaimOutcome, _elapsed: Duration) {}

    fn on_answer(&self, _answer: &str, _elapsed: Duration) {}
}

/// Evidence and query that settled a claim.
struct Support {
    evidence: String,
    query: String,
}

/// The hypothesize, verify, answer pipeline.
#[derive(Clone)]
pub struct Pipeline {
    hypothesizer: HypothesisGenerator,
    planner: QueryPlanner,
    collector: EvidenceCollector,
    verifier: Verifier,
    answerer: Answerer,
    observer: Option<Arc<dyn PipelineObserver>>,
}

impl Pipeline {
    /// Wire every agent to one caller and one searcher. Searches share the
    /// caller's retry policy.
    pub fn new(caller: RetryableCaller, searcher: Arc<dyn WebSearcher>, config: &PipelineConfig) -> Self {
        let collector = EvidenceCollector::new(searcher, caller.policy().clone(), config.search_result_count);
        Self {
            hypothesizer: HypothesisGenerator::from_config(caller.clone(), config),
            planner: QueryPlanner::from_config(caller.clone(), config),
            collector,
            verifier: Verifier::from_config(caller.clone(), config),
            answerer: Answerer::from_config(caller, config),
            observer: None,
        }
    }

    pub fn from_parts(
        hypothesizer: HypothesisGenerator,
        planner: QueryPlanner,
        collector: EvidenceCollector,
        verifier: Verifier,
        answerer: Answerer,
    ) -> Self {
        Self {
            hypothesizer,
            planner,
            collector,
            verifier,
            answerer,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    fn notify(&self, f: impl FnOnce(&dyn PipelineObserver)) {
        if let Some(observer) = &self.observer {
            f(observer.as_ref());
        }
    }

    fn enter(&self, stage: PipelineStage) {
        debug!(%stage, "Pipeline stage");
        self.notify(|o| o.on_stage(stage));
    }

    /// Run one question to a terminal stage.
    #[instrument(skip_all, fields(question = %question))]
    pub async fn run(&self, question: &str) -> PipelineResult {
        let started = Instant::now();
        let mut warnings = Vec::new();

        self.enter(PipelineStage::Start);
        self.enter(PipelineStage::Hypothesizing);

        let (claim_graph, hypothesis_reasoning) = match self.hypothesizer.generate(question).await {
            Ok(hypothesis) => (hypothesis.claims, Some(hypothesis.reasoning)),
            Err(e) => {
                warn!(error = %e, "Hypothesis generation failed");
                warnings.push(format!("hypothesizer: {e}"));
                (ClaimGraph::empty(), None)
            }
        };
        self.notify(|o| o.on_hypothesis(&claim_graph, hypothesis_reasoning.as_deref()));

        if claim_graph.is_empty() {
            self.enter(PipelineStage::Aborted);
            let elapsed = started.elapsed();
            info!(elapsed_ms = elapsed.as_millis() as u64, "Pipeline aborted: no claims");
            return PipelineResult {
                question: question.to_string(),
                claim_graph,
                hypothesis_reasoning,
                claim_outcomes: Vec::new(),
                verified_facts: VerifiedFactSet::new(),
                final_answer: CANNOT_HYPOTHESIZE_ANSWER.to_string(),
                elapsed,
                final_stage: PipelineStage::Aborted,
                warnings,
            };
        }

        self.enter(PipelineStage::VerifyingClaims);
        let mut verified_facts = VerifiedFactSet::new();
        let mut claim_outcomes = Vec::with_capacity(claim_graph.len());

        for (index, claim) in claim_graph.iter().enumerate() {
            self.notify(|o| o.on_claim_start(index, claim));
            let claim_started = Instant::now();

            let (outcome, support) = self.verify_claim(claim, &mut warnings).await;
            if let Some(Support { evidence, query }) = support {
                verified_facts.record_support(claim.clone(), evidence, query);
            }

            self.notify(|o| o.on_claim_done(&outcome, claim_started.elapsed()));
            claim_outcomes.push(outcome);
        }

        self.enter(PipelineStage::Synthesizing);
        let answer_started = Instant::now();
        let final_answer = self.answerer.answer(question, &verified_facts).await;
        self.notify(|o| o.on_answer(&final_answer, answer_started.elapsed()));

        self.enter(PipelineStage::Done);
        let elapsed = started.elapsed();
        info!(
            claims = claim_graph.len(),
            verified = verified_facts.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Pipeline done"
        );

        PipelineResult {
            question: question.to_string(),
            claim_graph,
            hypothesis_reasoning,
            claim_outcomes,
            verified_facts,
            final_answer,
            elapsed,
            final_stage: PipelineStage::Done,
            warnings,
        }
    }

    /// Run the planner's queries as a lazy stream and take the first
    /// `Supports`. Dropping the stream there means later queries are never
    /// searched or verified. `Refutes` and `Neutral` both move on.
    async fn verify_claim(&self, claim: &Claim, warnings: &mut Vec<String>) -> (ClaimOutcome, Option<Support>) {
        let queries = match self.planner.plan(claim).await {
            Ok(queries) => queries,
            Err(e) => {
                warn!(%claim, error = %e, "Query planning failed");
                warnings.push(format!("query planner for {claim}: {e}"));
                Vec::new()
            }
        };
        self.notify(|o| o.on_queries(claim, &queries));

        let mut attempts = Vec::with_capacity(queries.len());
        let support = {
            let checks = stream::iter(&queries)
                .then(|query| self.check_query(claim, query))
                .filter_map(|(attempt, evidence)| {
                    self.notify(|o| o.on_query_verdict(claim, &attempt));
                    let support = (attempt.status == VerificationStatus::Supports).then(|| Support {
                        evidence: evidence.as_text().to_string(),
                        query: attempt.query.clone(),
                    });
                    attempts.push(attempt);
                    future::ready(support)
                });
            let mut checks = pin!(checks);
            checks.next().await
        };

        let outcome = ClaimOutcome {
            claim: claim.clone(),
            verdict: ClaimOutcome::verdict_from(&attempts),
            queries,
            attempts,
        };
        (outcome, support)
    }

    /// Search one query and ask the verifier about what came back.
    async fn check_query(&self, claim: &Claim, query: &str) -> (QueryAttempt, Evidence) {
        let evidence = self.collector.collect(query).await;
        let status = self.verifier.verify(claim, evidence.as_text()).await;
        debug!(%claim, query, %status, "Query verdict");

        let attempt = QueryAttempt {
            query: query.to_string(),
            status,
            evidence_found: evidence.usable().is_some(),
        };
        (attempt, evidence)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("collector", &self.collector)
            .field("observed", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}
