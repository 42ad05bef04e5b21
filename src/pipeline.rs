//! Trace pipeline: the configured transformer chain an interceptor runs for
//! every observed exchange.

use crate::config::TraceConfig;
use crate::context::{RequestInfo, ResponseInfo};
use crate::record::TraceRecord;
use crate::rule::{CompiledRule, RuleEngine, RuleError};
use crate::transformer::{BoxedTransformer, TraceTransformer};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, trace};

/// Configured trace transformation pipeline.
///
/// Shareable across threads: [`apply`](Self::apply) only needs `&self`.
#[derive(Debug)]
pub struct TracePipeline {
    /// Configuration
    config: TraceConfig,
    /// Compiled rule summaries
    rules: Vec<CompiledRule>,
    /// Full transformer chain
    chain: BoxedTransformer,
    /// Metrics: total records processed.
    records_processed: AtomicU64,
}

impl TracePipeline {
    /// Create a new pipeline from configuration.
    pub fn new(config: TraceConfig) -> Result<Self, RuleError> {
        let engine = RuleEngine::new(&config)?;

        info!(
            rules = engine.rules().len(),
            max_body_length = config.settings.max_body_length,
            "Trace pipeline initialized"
        );

        let rules = engine.rules().to_vec();
        Ok(Self {
            config,
            rules,
            chain: engine.into_chain(),
            records_processed: AtomicU64::new(0),
        })
    }

    /// Create from a YAML configuration string.
    pub fn from_yaml(yaml: &str) -> Result<Self, TracePipelineError> {
        let config: TraceConfig = serde_yaml::from_str(yaml)?;
        Self::new(config).map_err(TracePipelineError::from)
    }

    /// Create from a JSON configuration string.
    pub fn from_json(json: &str) -> Result<Self, TracePipelineError> {
        let config: TraceConfig = serde_json::from_str(json)?;
        Self::new(config).map_err(TracePipelineError::from)
    }

    /// Load a configuration file; `.yaml`/`.yml` files (any case) are read as
    /// YAML, anything else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TracePipelineError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Append a transformer after the configured chain.
    pub fn with_transformer<T>(mut self, transformer: T) -> Self
    where
        T: TraceTransformer + 'static,
    {
        self.chain = self.chain.and_then(transformer).boxed();
        self
    }

    /// Run a record through the pipeline.
    pub fn apply(
        &self,
        request: &RequestInfo,
        response: &ResponseInfo,
        record: TraceRecord,
    ) -> TraceRecord {
        self.records_processed.fetch_add(1, Ordering::Relaxed);
        trace!(url = %record.url, method = %record.method, "Transforming trace record");
        self.chain.transform(request, response, record)
    }

    /// Get the configuration.
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Get the compiled rules, in application order.
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Number of records processed so far.
    pub fn records_processed(&self) -> u64 {
        self.records_processed.load(Ordering::Relaxed)
    }
}

impl TraceTransformer for TracePipeline {
    fn transform(
        &self,
        request: &RequestInfo,
        response: &ResponseInfo,
        record: TraceRecord,
    ) -> TraceRecord {
        self.apply(request, response, record)
    }

    fn name(&self) -> &'static str {
        "trace_pipeline"
    }
}

/// Trace pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum TracePipelineError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),
}
