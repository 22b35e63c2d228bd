//! OpenAI-compatible embedding backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use recall_core::{defaults, EmbeddingBackend, Error, Result, Vector};

/// Configuration for the OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL, e.g. `https://api.openai.com`.
    pub base_url: String,
    /// Bearer token; omitted from requests when `None` (self-hosted gateways).
    pub api_key: Option<String>,
    /// Embedding model name.
    pub model: String,
    /// Expected vector dimension for `model`.
    pub dimension: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::EMBED_URL.to_string(),
            api_key: None,
            model: defaults::EMBED_MODEL.to_string(),
            dimension: defaults::EMBED_DIMENSION,
            timeout_secs: defaults::EMBED_TIMEOUT_SECS,
        }
    }
}

/// OpenAI-compatible embedding backend over `/v1/embeddings`.
pub struct OpenAiEmbeddings {
    client: Client,
    config: OpenAiConfig,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbeddings {
    /// Create a backend with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        info!(
            subsystem = "embed",
            component = "openai",
            op = "init",
            model = %config.model,
            dimension = config.dimension,
            "Initializing embedding backend"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    ///
    /// `RECALL_EMBED_URL`, `RECALL_EMBED_API_KEY`, `RECALL_EMBED_MODEL`,
    /// `RECALL_EMBED_DIM`, `RECALL_EMBED_TIMEOUT_SECS`, each falling back to
    /// the crate defaults.
    pub fn from_env() -> Self {
        let config = OpenAiConfig {
            base_url: std::env::var("RECALL_EMBED_URL")
                .unwrap_or_else(|_| defaults::EMBED_URL.to_string()),
            api_key: std::env::var("RECALL_EMBED_API_KEY").ok(),
            model: std::env::var("RECALL_EMBED_MODEL")
                .unwrap_or_else(|_| defaults::EMBED_MODEL.to_string()),
            dimension: std::env::var("RECALL_EMBED_DIM")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::EMBED_DIMENSION),
            timeout_secs: std::env::var("RECALL_EMBED_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::EMBED_TIMEOUT_SECS),
        };

        // Client construction only fails on TLS backend misconfiguration.
        Self::new(config).expect("failed to construct embedding HTTP client")
    }
}

#[async_trait]
impl EmbeddingBackend for OpenAiEmbeddings {
    #[instrument(
        skip(self, text),
        fields(subsystem = "embed", component = "openai", op = "embed", model = %self.config.model)
    )]
    async fn embed(&self, text: &str) -> Result<Vector> {
        let start = Instant::now();

        let request = EmbeddingRequest {
            model: &self.config.model,
            input: text,
        };

        let mut builder = self
            .client
            .post(format!("{}/v1/embeddings", self.config.base_url))
            .json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("provider unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "provider returned {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("malformed provider response: {e}")))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::Embedding("provider returned no embedding".to_string()))?;

        if embedding.len() != self.config.dimension {
            return Err(Error::Embedding(format!(
                "expected dimension {}, provider returned {}",
                self.config.dimension,
                embedding.len()
            )));
        }

        debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            dimension = embedding.len(),
            "Embedding generated"
        );

        Ok(Vector::from(embedding))
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
