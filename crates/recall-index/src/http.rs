//! REST client for the vector index service.
//!
//! Wire protocol (bearer-authenticated JSON over HTTP):
//!
//! - `POST /upsert`  `{id, vector, metadata}` — insert or replace
//! - `POST /update`  `{id, metadata}` — metadata-only refresh
//! - `POST /query`   `{vector, topK, includeMetadata}` →
//!   `{result: [{id, score, metadata}]}`
//! - `POST /delete`  `{ids: [id]}` — idempotent

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use uuid::Uuid;

use recall_core::{defaults, Error, IndexHit, IndexMetadata, Result, Vector, VectorIndex};

/// Configuration for the vector index client.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Base URL of the index service.
    pub base_url: String,
    /// Bearer token; omitted when `None`.
    pub token: Option<String>,
    /// Per-request timeout in seconds. Deliberately short so a slow index
    /// trips the fallback path instead of stalling the search.
    pub timeout_secs: u64,
}

/// HTTP implementation of `VectorIndex`.
pub struct HttpVectorIndex {
    client: Client,
    config: IndexConfig,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    id: Uuid,
    vector: &'a [f32],
    metadata: &'a IndexMetadata,
}

#[derive(Serialize)]
struct UpdateRequest<'a> {
    id: Uuid,
    metadata: &'a IndexMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: i64,
    include_metadata: bool,
}

#[derive(Serialize)]
struct DeleteRequest {
    ids: Vec<Uuid>,
}

#[derive(Deserialize)]
struct QueryResponse {
    result: Vec<QueryHit>,
}

#[derive(Deserialize)]
struct QueryHit {
    id: Uuid,
    score: f32,
    /// Absent or malformed metadata drops the hit: the index payload is
    /// untrusted and a hit we cannot attribute to a tenant is unusable.
    metadata: Option<IndexMetadata>,
}

impl HttpVectorIndex {
    /// Create a new client with the given configuration.
    pub fn new(config: IndexConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        info!(
            subsystem = "index",
            component = "http_index",
            op = "init",
            base_url = %config.base_url,
            timeout_secs = config.timeout_secs,
            "Initializing vector index client"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables, `None` when the index is not
    /// configured (`RECALL_INDEX_URL` unset) — the retrieval service then
    /// runs fallback-only.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("RECALL_INDEX_URL").ok()?;
        let config = IndexConfig {
            base_url,
            token: std::env::var("RECALL_INDEX_TOKEN").ok(),
            timeout_secs: std::env::var("RECALL_INDEX_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::INDEX_TIMEOUT_SECS),
        };
        Self::new(config).ok()
    }

    async fn post<T: Serialize + ?Sized>(&self, endpoint: &str, body: &T) -> Result<reqwest::Response> {
        let mut builder = self
            .client
            .post(format!("{}/{endpoint}", self.config.base_url))
            .json(body);
        if let Some(token) = &self.config.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Index(format!("index unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Index(format!("index returned {status}: {body}")));
        }
        Ok(response)
    }
}

#[async_trait]
impl VectorIndex for HttpVectorIndex {
    #[instrument(
        skip(self, vector, metadata),
        fields(subsystem = "index", component = "http_index", op = "upsert", item_id = %id)
    )]
    async fn upsert(&self, id: Uuid, vector: &Vector, metadata: IndexMetadata) -> Result<()> {
        self.post(
            "upsert",
            &UpsertRequest {
                id,
                vector: vector.as_slice(),
                metadata: &metadata,
            },
        )
        .await?;
        Ok(())
    }

    #[instrument(
        skip(self, metadata),
        fields(subsystem = "index", component = "http_index", op = "update_metadata", item_id = %id)
    )]
    async fn update_metadata(&self, id: Uuid, metadata: IndexMetadata) -> Result<()> {
        self.post(
            "update",
            &UpdateRequest {
                id,
                metadata: &metadata,
            },
        )
        .await?;
        Ok(())
    }

    #[instrument(
        skip(self, vector),
        fields(subsystem = "index", component = "http_index", op = "query", top_k)
    )]
    async fn query(&self, vector: &Vector, top_k: i64) -> Result<Vec<IndexHit>> {
        let start = Instant::now();

        let response = self
            .post(
                "query",
                &QueryRequest {
                    vector: vector.as_slice(),
                    top_k,
                    include_metadata: true,
                },
            )
            .await?;

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::Index(format!("malformed index response: {e}")))?;

        let mut hits = Vec::with_capacity(parsed.result.len());
        for hit in parsed.result {
            match hit.metadata {
                Some(metadata) => hits.push(IndexHit {
                    id: hit.id,
                    score: hit.score,
                    metadata,
                }),
                None => {
                    trace!(item_id = %hit.id, "Dropping index hit without metadata");
                }
            }
        }

        debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            result_count = hits.len(),
            "Index query complete"
        );

        Ok(hits)
    }

    #[instrument(
        skip(self),
        fields(subsystem = "index", component = "http_index", op = "delete", item_id = %id)
    )]
    async fn delete(&self, id: Uuid) -> Result<()> {
        self.post("delete", &DeleteRequest { ids: vec![id] }).await?;
        Ok(())
    }
}
