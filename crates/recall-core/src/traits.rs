//! Core traits for recall abstractions.
//!
//! These traits define the seams between the retrieval service and its
//! external collaborators: the durable relational store, the embedding
//! provider, and the approximate-nearest-neighbor index. Concrete
//! implementations are pluggable, which is what makes the service testable
//! with in-memory fakes.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// DURABLE STORE
// =============================================================================

/// Repository over the relational source-of-truth table of knowledge items.
///
/// Every method is scoped by `workspace_id`; an id that does not resolve
/// under that scope behaves as absent, never as an error. The durable store
/// is always ahead of or equal to the vector index in recency.
#[async_trait]
pub trait KnowledgeRepository: Send + Sync {
    /// Insert a new item. The embedding, when present, is the denormalized
    /// copy used by the fallback search path.
    async fn insert(
        &self,
        req: CreateItemRequest,
        embedding: Option<Vector>,
        embedding_model: Option<&str>,
    ) -> Result<KnowledgeItem>;

    /// Fetch one item by id within a workspace, any status.
    async fn fetch(&self, workspace_id: Uuid, id: Uuid) -> Result<Option<KnowledgeItem>>;

    /// Hydrate candidate ids back into full records, scoped by workspace.
    /// Ids that do not resolve under the scope are silently absent from the
    /// result.
    async fn fetch_many(&self, workspace_id: Uuid, ids: &[Uuid]) -> Result<Vec<KnowledgeItem>>;

    /// Apply a partial update. `new_embedding` replaces the stored vector
    /// when the content changed. Returns the updated row, or
    /// `Error::ItemNotFound` when the scoped row is absent.
    async fn update(
        &self,
        workspace_id: Uuid,
        id: Uuid,
        req: UpdateItemRequest,
        new_embedding: Option<(Vector, String)>,
    ) -> Result<KnowledgeItem>;

    /// Delete an item. Returns whether a row was removed; deleting a
    /// nonexistent id is not an error.
    async fn delete(&self, workspace_id: Uuid, id: Uuid) -> Result<bool>;

    /// Fetch fallback-search candidates: `ready` items matching the
    /// filters, up to `cap` rows.
    async fn scan_ready(
        &self,
        workspace_id: Uuid,
        filters: &SearchFilters,
        cap: i64,
    ) -> Result<Vec<KnowledgeItem>>;

    /// List items with pagination.
    async fn list(&self, workspace_id: Uuid, req: ListItemsRequest) -> Result<ListItemsResponse>;
}

// =============================================================================
// EMBEDDING PROVIDER
// =============================================================================

/// Backend for generating text embeddings.
///
/// Failures are `Error::Embedding` and abort the enclosing operation;
/// callers never persist a partial or zero vector.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate an embedding for the given text.
    async fn embed(&self, text: &str) -> Result<Vector>;

    /// Expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Model name being used.
    fn model_name(&self) -> &str;
}

// =============================================================================
// VECTOR INDEX
// =============================================================================

/// Client for the approximate-nearest-neighbor index.
///
/// The index is a disposable mirror of the durable store with no
/// transactional guarantees across calls. All failures are `Error::Index`
/// and are recovered by the caller (fallback search, degraded writes).
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace the vector and metadata for an item.
    async fn upsert(&self, id: Uuid, vector: &Vector, metadata: IndexMetadata) -> Result<()>;

    /// Refresh only the metadata payload, keeping the stored vector.
    /// Used for non-content updates, which need no re-embedding.
    async fn update_metadata(&self, id: Uuid, metadata: IndexMetadata) -> Result<()>;

    /// Query the `top_k` nearest neighbors by similarity.
    async fn query(&self, vector: &Vector, top_k: i64) -> Result<Vec<IndexHit>>;

    /// Remove an item from the index. Deleting an unknown id is a no-op.
    async fn delete(&self, id: Uuid) -> Result<()>;
}
