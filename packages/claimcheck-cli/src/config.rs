use anyhow::{Context, Result};
use claimcheck::{HarnessConfig, LlmCredentials, ModelConfig, PipelineConfig, RetryPolicy, SecretString};
use dotenvy::dotenv;
use std::env;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmCredentials,
    pub serper_api_key: SecretString,
    pub pipeline: PipelineConfig,
    pub retry: RetryPolicy,
    pub harness: HarnessConfig,
    pub http_timeout: Duration,
    pub search_requests_per_second: Option<NonZeroU32>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        let _ = dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let vars = Vars(&lookup);

        let mut llm = LlmCredentials::new(vars.required("OPENAI_API_KEY")?);
        if let Some(url) = vars.get("OPENAI_BASE_URL") {
            llm = llm.with_base_url(url);
        }

        let defaults = ModelConfig::default();
        let models = ModelConfig {
            hypothesizer: vars.get("HYPOTHESIZER_MODEL").unwrap_or(defaults.hypothesizer),
            query_planner: vars.get("QUERY_PLANNER_MODEL").unwrap_or(defaults.query_planner),
            verifier: vars.get("VERIFIER_MODEL").unwrap_or(defaults.verifier),
            answerer: vars.get("ANSWERER_MODEL").unwrap_or(defaults.answerer),
            judge: vars.get("JUDGE_MODEL").unwrap_or(defaults.judge),
        };

        let pipeline = PipelineConfig::new()
            .with_models(models)
            .with_temperature(vars.parse_or("LLM_TEMPERATURE", 0.1)?)
            .with_strict_schemas(vars.parse_or("LLM_STRICT_SCHEMAS", false)?)
            .with_search_result_count(vars.parse_or("SEARCH_RESULT_COUNT", 3)?);

        let jitter_ms: u64 = vars.parse_or("RETRY_JITTER_MS", 250)?;
        let retry = RetryPolicy {
            max_attempts: vars.parse_or("RETRY_MAX_ATTEMPTS", 2)?,
            initial_backoff_ms: vars.parse_or("RETRY_INITIAL_BACKOFF_MS", 1000)?,
            jitter_ms: (jitter_ms > 0).then_some(jitter_ms),
        };

        let mut harness = HarnessConfig::new().with_workers(vars.parse_or("EVAL_WORKERS", 5)?);
        if let Some(max) = vars.parse_opt("EVAL_MAX_SAMPLES")? {
            harness = harness.with_max_samples(max);
        }
        if let Some(secs) = vars.parse_opt::<f64>("EVAL_RUN_TIMEOUT_SECS")? {
            harness = harness.with_run_timeout(secs_to_duration("EVAL_RUN_TIMEOUT_SECS", secs)?);
        }

        Ok(Self {
            llm,
            serper_api_key: SecretString::new(vars.required("SERPER_API_KEY")?),
            pipeline,
            retry,
            harness,
            http_timeout: Duration::from_secs(vars.parse_or("HTTP_TIMEOUT_SECS", 60)?),
            search_requests_per_second: vars.parse_opt("SEARCH_REQUESTS_PER_SECOND")?,
        })
    }
}

pub fn secs_to_duration(name: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).with_context(|| format!("{name} must be a non-negative number of seconds"))
}

struct Vars<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    /// Unset and blank are the same.
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, name: &str) -> Result<String> {
        self.get(name).with_context(|| format!("{name} must be set"))
    }

    fn parse_opt<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.get(name)
            .map(|raw| {
                raw.trim()
                    .parse()
                    .with_context(|| format!("{name} has an invalid value {raw:?}"))
            })
            .transpose()
    }

    fn parse_or<T>(&self, name: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        Ok(self.parse_opt(name)?.unwrap_or(default))
    }
}
