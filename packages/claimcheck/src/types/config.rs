//! Configuration types for the pipeline and the evaluation harness.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::traits::generator::AgentRole;

/// Model identifier per agent role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub hypothesizer: String,
    pub query_planner: String,
    pub verifier: String,
    pub answerer: String,
    pub judge: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            hypothesizer: "gpt-4o".to_string(),
            query_planner: "gpt-4o-mini".to_string(),
            verifier: "gpt-4o".to_string(),
            answerer: "gpt-4o".to_string(),
            judge: "gpt-4o-mini".to_string(),
        }
    }
}

impl ModelConfig {
    pub fn for_role(&self, role: AgentRole) -> &str {
        match role {
            AgentRole::Hypothesizer => &self.hypothesizer,
            AgentRole::QueryPlanner => &self.query_planner,
            AgentRole::Verifier => &self.verifier,
            AgentRole::Answerer => &self.answerer,
            AgentRole::Judge => &self.judge,
        }
    }

    /// Use one model for every role.
    pub fn uniform(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            hypothesizer: model.clone(),
            query_planner: model.clone(),
            verifier: model.clone(),
            answerer: model.clone(),
            judge: model,
        }
    }
}

/// Configuration shared by the agents of one pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub models: ModelConfig,

    /// Sampling temperature for every request. Default: 0.1.
    pub temperature: f32,

    /// Send generated JSON schemas (`json_schema` mode) instead of asking
    /// for a bare JSON object.
    ///
    /// Default: false.
    pub strict_schemas: bool,

    /// Snippets kept per search query. Default: 3.
    pub search_result_count: usize,

    /// Upper bound on planner queries per claim. Default: 3.
    pub max_queries_per_claim: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            models: ModelConfig::default(),
            temperature: 0.1,
            strict_schemas: false,
            search_result_count: 3,
            max_queries_per_claim: 3,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_models(mut self, models: ModelConfig) -> Self {
        self.models = models;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_strict_schemas(mut self, strict: bool) -> Self {
        self.strict_schemas = strict;
        self
    }

    pub fn with_search_result_count(mut self, count: usize) -> Self {
        self.search_result_count = count;
        self
    }

    pub fn with_max_queries_per_claim(mut self, max: usize) -> Self {
        self.max_queries_per_claim = max;
        self
    }
}

/// Configuration for one evaluation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Worker-pool width. Values below 1 behave as 1. Default: 5.
    pub workers: usize,

    /// Keep only the first N test cases.
    pub max_samples: Option<usize>,

    /// Deadline for one case (pipeline plus judging). None waits forever.
    #[serde(default, with = "opt_secs")]
    pub run_timeout: Option<Duration>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            max_samples: None,
            run_timeout: None,
        }
    }
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_max_samples(mut self, max: usize) -> Self {
        self.max_samples = Some(max);
        self
    }

    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }
}

mod opt_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.as_secs_f64()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let secs = Option::<f64>::deserialize(d)?;
        Ok(secs.filter(|s| s.is_finite() && *s >= 0.0).map(Duration::from_secs_f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_defaults() {
        let models = ModelConfig::default();
        assert_eq!(models.for_role(AgentRole::Hypothesizer), "gpt-4o");
        assert_eq!(models.for_role(AgentRole::QueryPlanner), "gpt-4o-mini");
        assert_eq!(models.for_role(AgentRole::Judge), "gpt-4o-mini");
    }

    #[test]
    fn test_harness_config_serde() {
        let config = HarnessConfig::new()
            .with_workers(8)
            .with_run_timeout(Duration::from_secs(90));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["run_timeout"], 90.0);

        let back: HarnessConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);

        let bare: HarnessConfig =
            serde_json::from_str(r#"{"workers": 2, "max_samples": null}"#).unwrap();
        assert_eq!(bare.run_timeout, None);
    }
}
