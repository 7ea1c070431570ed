// Process-wide Prometheus metrics
//
// Counters for the response pipeline, rendered in the text exposition
// format by the HTTP API's /metrics endpoint.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// How a query was resolved by the response policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The model produced a reply
    Answered,
    /// The model was asked but produced nothing usable
    Fallback,
    /// The query was too short to be sent
    Rejected,
}

impl QueryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOutcome::Answered => "answered",
            QueryOutcome::Fallback => "fallback",
            QueryOutcome::Rejected => "rejected",
        }
    }
}

pub struct Metrics {
    registry: Registry,
    queries: IntCounterVec,
    inference_attempts: IntCounterVec,
}

impl Metrics {
    fn new() -> Self {
        let registry = Registry::new_custom(Some("legal_assistant".to_string()), None)
            .expect("static registry prefix is valid");

        let queries = IntCounterVec::new(
            Opts::new("queries_total", "Queries handled, by outcome"),
            &["outcome"],
        )
        .expect("static metric definition is valid");

        let inference_attempts = IntCounterVec::new(
            Opts::new(
                "inference_attempts_total",
                "Chat requests sent to the inference server, by backend and outcome",
            ),
            &["backend", "outcome"],
        )
        .expect("static metric definition is valid");

        registry
            .register(Box::new(queries.clone()))
            .expect("queries_total registered once");
        registry
            .register(Box::new(inference_attempts.clone()))
            .expect("inference_attempts_total registered once");

        Self {
            registry,
            queries,
            inference_attempts,
        }
    }

    pub fn record_query(&self, outcome: QueryOutcome) {
        self.queries.with_label_values(&[outcome.as_str()]).inc();
    }

    pub fn record_attempt(&self, backend: &str, outcome: &str) {
        self.inference_attempts
            .with_label_values(&[backend, outcome])
            .inc();
    }

    pub fn query_count(&self, outcome: QueryOutcome) -> u64 {
        self.queries.with_label_values(&[outcome.as_str()]).get()
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output is not UTF-8")
    }
}

pub static METRICS: Lazy<Metrics> = Lazy::new(Metrics::new);
