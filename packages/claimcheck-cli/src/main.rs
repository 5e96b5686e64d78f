// Command line entry point: answer one question, or evaluate a test suite

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use claimcheck::{
    Claim, ClaimGraph, ClaimOutcome, ClaimVerdict, EvaluationHarness, EvaluationReport, Judge,
    OpenAiGenerator, Pipeline, PipelineObserver, PipelineStage, QueryAttempt, RateLimitedSearcher,
    RetryableCaller, SerperWebSearcher, VerificationStatus, WebSearcher,
};
use console::{measure_text_width, style};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{secs_to_duration, Config};

#[derive(Parser)]
#[command(name = "claimcheck", version, about = "Hypothesize, verify, answer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a single question and show every step
    Ask {
        question: String,
    },
    /// Run a JSONL test suite and append the results to a markdown log
    Evaluate {
        #[arg(long, default_value = "./data/hotpotqa_test_set.jsonl")]
        suite: PathBuf,

        #[arg(long, default_value = "./data/evaluation_log.md")]
        log: PathBuf,

        /// Concurrent test cases (overrides EVAL_WORKERS)
        #[arg(long)]
        workers: Option<usize>,

        /// Evaluate only the first N cases (overrides EVAL_MAX_SAMPLES)
        #[arg(long)]
        max_samples: Option<usize>,

        /// Per-case deadline in seconds (overrides EVAL_RUN_TIMEOUT_SECS)
        #[arg(long)]
        timeout_secs: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,claimcheck=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Command::Ask { question } => ask(&config, &question).await,
        Command::Evaluate {
            suite,
            log,
            workers,
            max_samples,
            timeout_secs,
        } => {
            let mut harness = config.harness.clone();
            if let Some(workers) = workers {
                harness = harness.with_workers(workers);
            }
            if let Some(max) = max_samples {
                harness = harness.with_max_samples(max);
            }
            if let Some(secs) = timeout_secs {
                harness = harness.with_run_timeout(secs_to_duration("--timeout-secs", secs)?);
            }
            let config = Config { harness, ..config };
            evaluate(&config, &suite, &log).await
        }
    }
}

fn build_caller(config: &Config) -> Result<RetryableCaller> {
    let generator = OpenAiGenerator::from_credentials(&config.llm, Some(config.http_timeout))
        .context("Failed to build the OpenAI client")?;
    Ok(RetryableCaller::new(Arc::new(generator), config.retry.clone()))
}

fn build_searcher(config: &Config) -> Result<Arc<dyn WebSearcher>> {
    let serper = SerperWebSearcher::from_api_key(&config.serper_api_key, Some(config.http_timeout))
        .context("Failed to build the Serper client")?;
    Ok(match config.search_requests_per_second {
        Some(rps) => {
            tracing::info!(requests_per_second = rps.get(), "Rate limiting web searches");
            Arc::new(RateLimitedSearcher::new(serper, rps))
        }
        None => Arc::new(serper),
    })
}

async fn ask(config: &Config, question: &str) -> Result<()> {
    let caller = build_caller(config)?;
    let pipeline = Pipeline::new(caller, build_searcher(config)?, &config.pipeline)
        .with_observer(Arc::new(ConsoleObserver));

    println!("{} {}", style("Question:").bold(), question);
    let result = pipeline.run(question).await;

    for warning in &result.warnings {
        println!("{} {}", style("warning:").yellow().bold(), warning);
    }

    println!();
    println!("{}", style(boxed("FINAL ANSWER", &result.final_answer)).cyan());
    println!(
        "{}",
        style(format!("Completed in {:.2}s", result.elapsed.as_secs_f64())).dim()
    );
    Ok(())
}

/// Draws a double-line panel around `body`, sized to its widest line.
fn boxed(title: &str, body: &str) -> String {
    let lines: Vec<&str> = body.lines().collect();
    let width = lines
        .iter()
        .chain(std::iter::once(&title))
        .map(|line| measure_text_width(line))
        .max()
        .unwrap_or(0);
    let row = |text: &str| format!("║ {text}{} ║", " ".repeat(width - measure_text_width(text)));

    let mut panel = vec![format!("╔{}╗", "═".repeat(width + 2)), row(title)];
    panel.push(format!("╟{}╢", "─".repeat(width + 2)));
    panel.extend(lines.iter().map(|&line| row(line)));
    panel.push(format!("╚{}╝", "═".repeat(width + 2)));
    panel.join("\n")
}

async fn evaluate(config: &Config, suite: &Path, log: &Path) -> Result<()> {
    let caller = build_caller(config)?;
    let pipeline = Pipeline::new(caller.clone(), build_searcher(config)?, &config.pipeline);
    let judge = Judge::from_config(caller, &config.pipeline);
    let harness = EvaluationHarness::new(pipeline, judge, config.harness.clone());

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .context("Invalid progress template")?,
    );
    progress.enable_steady_tick(Duration::from_millis(200));

    let bar = progress.clone();
    let report = harness
        .run_suite(suite, log, move |record, totals| {
            bar.set_length(totals.total as u64);
            bar.set_position(totals.completed as u64);
            bar.set_message(format!("success {:.1}%", totals.success_rate() * 100.0));
            let mark = if record.success {
                style("✔").green()
            } else {
                style("✘").red()
            };
            bar.println(format!(
                "{mark} {} ({:.2}s)",
                record.test_case.question,
                record.latency_secs()
            ));
        })
        .await
        .with_context(|| format!("Evaluation of {} failed", suite.display()))?;
    progress.finish_and_clear();

    print_summary(&report, log);
    Ok(())
}

fn print_summary(report: &EvaluationReport, log: &Path) {
    let summary = &report.summary;
    println!();
    println!(
        "{} {}",
        style("Evaluation run").bold(),
        report.started_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("  {:<20} {}", "Total samples", summary.sample_count);
    println!(
        "  {:<20} {}",
        "Task success rate",
        style(format!("{:.2}%", summary.success_percent())).bold()
    );
    println!(
        "  {:<20} {:.3}s (±{:.3}s)",
        "Average latency", summary.mean_latency_secs, summary.std_dev_latency_secs
    );
    println!("  {:<20} {}", "Log", log.display());
}

/// Prints each pipeline step to stdout as it happens.
struct ConsoleObserver;

impl PipelineObserver for ConsoleObserver {
    fn on_stage(&self, stage: PipelineStage) {
        match stage {
            PipelineStage::Hypothesizing => println!("\n{}", style("Generating hypothesis...").bold()),
            PipelineStage::VerifyingClaims => println!("\n{}", style("Verifying claims...").bold()),
            PipelineStage::Synthesizing => println!("\n{}", style("Synthesizing answer...").bold()),
            PipelineStage::Aborted => println!("{}", style("No claims to verify, stopping.").yellow()),
            _ => {}
        }
    }

    fn on_hypothesis(&self, claims: &ClaimGraph, reasoning: Option<&str>) {
        if let Some(reasoning) = reasoning {
            println!("  {} {}", style("reasoning:").dim(), reasoning);
        }
        for claim in claims.iter() {
            println!("  - {claim}");
        }
    }

    fn on_claim_start(&self, index: usize, claim: &Claim) {
        println!("\n  [{}] {}", index + 1, style(claim).cyan());
    }

    fn on_queries(&self, _claim: &Claim, queries: &[String]) {
        if queries.is_empty() {
            println!("    {}", style("no queries planned").yellow());
        }
    }

    fn on_query_verdict(&self, _claim: &Claim, attempt: &QueryAttempt) {
        let status = match attempt.status {
            VerificationStatus::Supports => style(attempt.status).green(),
            VerificationStatus::Refutes => style(attempt.status).red(),
            VerificationStatus::Neutral => style(attempt.status).dim(),
        };
        println!("    search {:?} -> {status}", attempt.query);
    }

    fn on_claim_done(&self, outcome: &ClaimOutcome, elapsed: Duration) {
        let verdict = match outcome.verdict {
            ClaimVerdict::Supported => style("verified").green().bold(),
            ClaimVerdict::Refuted => style("refuted").red().bold(),
            ClaimVerdict::Unverified => style("unverified").yellow().bold(),
        };
        println!("    {verdict} in {:.2}s", elapsed.as_secs_f64());
    }
}
