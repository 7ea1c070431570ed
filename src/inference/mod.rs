// Inference client for the local LLM server
//
// Replies come from an ordered list of chat backends (native `/api/chat`
// first, OpenAI-compatible `/v1/chat/completions` second). The first backend
// that produces a non-empty reply wins; every failure is logged and treated
// as "no reply" so callers never see an error.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::config::InferenceConfig;
use crate::metrics::METRICS;

pub mod compat;
pub mod native;
pub mod types;

pub use compat::CompatChatBackend;
pub use native::NativeChatBackend;
pub use types::{ChatMessage, ChatPayload};

/// One way of asking the inference server for a chat completion.
///
/// `Ok(None)` means the server answered but carried no usable content;
/// `Err` covers non-200 statuses, transport failures and malformed bodies.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Short label used in logs and metrics
    fn name(&self) -> &str;

    async fn send(&self, payload: &ChatPayload) -> Result<Option<String>>;
}

/// Anything that can turn a query into an optional reply.
///
/// The response policy depends on this rather than on `InferenceClient`
/// directly, so other providers can be plugged in.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate_reply(&self, query: &str) -> Option<String>;
}

/// POST a JSON payload and insist on HTTP 200
pub(crate) async fn post_json(
    client: &Client,
    url: &str,
    payload: &ChatPayload,
) -> Result<reqwest::Response> {
    tracing::debug!(url, model = %payload.model, "sending chat request");

    let response = client
        .post(url)
        .header("content-type", "application/json")
        .json(payload)
        .send()
        .await
        .with_context(|| format!("Failed to send request to {}", url))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        bail!("{} returned HTTP {}", url, status);
    }

    Ok(response)
}

pub struct InferenceClient {
    config: InferenceConfig,
    client: Client,
    backends: Vec<Box<dyn ChatBackend>>,
}

impl InferenceClient {
    /// Client with the default strategy order: native, then OpenAI-compatible
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = config.base_url().to_string();
        let backends: Vec<Box<dyn ChatBackend>> = vec![
            Box::new(NativeChatBackend::new(client.clone(), base_url.clone())),
            Box::new(CompatChatBackend::new(client.clone(), base_url)),
        ];

        Ok(Self {
            config,
            client,
            backends,
        })
    }

    /// Client with a caller-supplied strategy list, tried in order
    pub fn with_backends(
        config: InferenceConfig,
        backends: Vec<Box<dyn ChatBackend>>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            client,
            backends,
        })
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Names of the configured backends, in trial order
    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Ask the inference server for a reply to `query`.
    ///
    /// Returns `None` when disabled (no request is made) or when every
    /// backend fails or answers with empty content.
    pub async fn generate_reply(&self, query: &str) -> Option<String> {
        if !self.config.enabled {
            tracing::debug!("inference disabled, skipping request");
            return None;
        }

        let payload = ChatPayload::for_query(&self.config, query);

        for backend in &self.backends {
            match backend.send(&payload).await {
                Ok(Some(reply)) => {
                    METRICS.record_attempt(backend.name(), "ok");
                    tracing::debug!(backend = backend.name(), chars = reply.len(), "reply received");
                    return Some(reply);
                }
                Ok(None) => {
                    METRICS.record_attempt(backend.name(), "empty");
                    tracing::info!(
                        backend = backend.name(),
                        "inference server returned no content"
                    );
                }
                Err(e) => {
                    METRICS.record_attempt(backend.name(), "error");
                    tracing::warn!(
                        backend = backend.name(),
                        model = %self.config.model,
                        "inference request failed: {:#}",
                        e
                    );
                }
            }
        }

        tracing::warn!(
            "local LLM not available at {} (is the model '{}' pulled?)",
            self.config.base_url(),
            self.config.model
        );
        None
    }

    /// Readiness probe: `GET {host}/api/tags` answers 200 within the probe timeout
    pub async fn is_ready(&self) -> bool {
        let url = format!("{}/api/tags", self.config.base_url());
        match self
            .client
            .get(&url)
            .timeout(self.config.probe_timeout())
            .send()
            .await
        {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(e) => {
                tracing::debug!("readiness probe failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl ReplyGenerator for InferenceClient {
    async fn generate_reply(&self, query: &str) -> Option<String> {
        InferenceClient::generate_reply(self, query).await
    }
}
