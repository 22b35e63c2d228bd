//! Retrieval service: ingestion, updates, deletes, and index repair.
//!
//! Writes follow a dual-store discipline. The relational store is the
//! source of truth and must commit before anything touches the vector
//! index; the index mirror is best effort, and a failed mirror write
//! degrades the outcome instead of failing the call. Reads never
//! require the index because the fallback path scans the durable store.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use recall_core::{
    CreateItemRequest, EmbeddingBackend, Error, IndexMetadata, ItemStatus, KnowledgeItem,
    KnowledgeRepository, ListItemsRequest, ListItemsResponse, ReindexReport, Result,
    SearchFilters, StoreOutcome, UpdateItemRequest, Vector, VectorIndex,
};
use recall_db::Database;

/// Orchestrates the durable store, the embedding backend, and the
/// optional vector index mirror.
pub struct RetrievalService {
    pub(crate) repo: Arc<dyn KnowledgeRepository>,
    pub(crate) embedder: Arc<dyn EmbeddingBackend>,
    pub(crate) index: Option<Arc<dyn VectorIndex>>,
}

impl RetrievalService {
    /// Create a service without a vector index. Search runs entirely on
    /// the brute-force fallback path.
    pub fn new(repo: Arc<dyn KnowledgeRepository>, embedder: Arc<dyn EmbeddingBackend>) -> Self {
        Self {
            repo,
            embedder,
            index: None,
        }
    }

    /// Attach a vector index mirror.
    pub fn with_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Wire the service against a live Postgres handle.
    pub fn from_database(db: Database, embedder: Arc<dyn EmbeddingBackend>) -> Self {
        Self::new(Arc::new(db.items), embedder)
    }

    /// Store a new knowledge item: embed, persist, then mirror.
    ///
    /// The durable insert only happens after embedding succeeds, so the
    /// store never holds content without a vector. A mirror failure is
    /// logged and reported as a degraded commit; the item remains fully
    /// retrievable through the fallback search path.
    #[instrument(skip(self, req), fields(
        subsystem = "retrieval",
        component = "dual_write",
        op = "store_item",
        workspace_id = %req.workspace_id,
    ))]
    pub async fn store_item(&self, req: CreateItemRequest) -> Result<StoreOutcome> {
        if req.title.trim().is_empty() {
            return Err(Error::InvalidInput("title must not be empty".into()));
        }
        if req.content.trim().is_empty() {
            return Err(Error::InvalidInput("content must not be empty".into()));
        }

        let embedding = self.embedder.embed(&req.content).await?;
        let model = self.embedder.model_name().to_string();

        let item = self
            .repo
            .insert(req, Some(embedding.clone()), Some(&model))
            .await?;

        debug!(item_id = %item.id, "Knowledge item committed to durable store");

        match self.mirror_upsert(&item, &embedding).await {
            Ok(()) => Ok(StoreOutcome::Committed { id: item.id }),
            Err(e) => {
                warn!(
                    item_id = %item.id,
                    error = %e,
                    degraded = true,
                    "Vector index upsert failed after durable commit"
                );
                Ok(StoreOutcome::CommittedDegraded {
                    id: item.id,
                    mirror_error: e.to_string(),
                })
            }
        }
    }

    /// Apply a partial update to an item owned by `workspace_id`.
    ///
    /// Content changes re-embed before the durable write, so an
    /// embedding failure leaves the stored row untouched. Metadata-only
    /// updates refresh the index payload without recomputing anything.
    #[instrument(skip(self, req), fields(
        subsystem = "retrieval",
        component = "dual_write",
        op = "update_item",
        workspace_id = %workspace_id,
        item_id = %id,
    ))]
    pub async fn update_item(
        &self,
        workspace_id: Uuid,
        id: Uuid,
        req: UpdateItemRequest,
    ) -> Result<StoreOutcome> {
        if req.is_empty() {
            return Err(Error::InvalidInput("update contains no fields".into()));
        }
        if let Some(title) = &req.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidInput("title must not be empty".into()));
            }
        }
        if let Some(content) = &req.content {
            if content.trim().is_empty() {
                return Err(Error::InvalidInput("content must not be empty".into()));
            }
        }

        let embedding: Option<Vector> = match &req.content {
            Some(content) => Some(self.embedder.embed(content).await?),
            None => None,
        };
        let new_embedding = embedding
            .clone()
            .map(|v| (v, self.embedder.model_name().to_string()));

        let item = self.repo.update(workspace_id, id, req, new_embedding).await?;

        let mirror = match &embedding {
            Some(vector) => self.mirror_upsert(&item, vector).await,
            None => self.mirror_metadata(&item).await,
        };

        match mirror {
            Ok(()) => Ok(StoreOutcome::Committed { id: item.id }),
            Err(e) => {
                warn!(
                    item_id = %item.id,
                    error = %e,
                    degraded = true,
                    "Vector index refresh failed after durable update"
                );
                Ok(StoreOutcome::CommittedDegraded {
                    id: item.id,
                    mirror_error: e.to_string(),
                })
            }
        }
    }

    /// Delete an item from both stores. Idempotent: deleting an absent
    /// item succeeds. The index delete only runs after the scoped
    /// durable delete removed a row, so one workspace can never evict
    /// another workspace's index entry. A failed index delete leaves an
    /// orphaned entry; hydration drops it from every search, but it
    /// persists until the index itself is wiped and rebuilt.
    #[instrument(skip(self), fields(
        subsystem = "retrieval",
        component = "dual_write",
        op = "delete_item",
        workspace_id = %workspace_id,
        item_id = %id,
    ))]
    pub async fn delete_item(&self, workspace_id: Uuid, id: Uuid) -> Result<()> {
        let removed = self.repo.delete(workspace_id, id).await?;
        if removed {
            debug!("Knowledge item removed from durable store");
            if let Some(index) = &self.index {
                if let Err(e) = index.delete(id).await {
                    warn!(error = %e, "Vector index delete failed; entry may linger");
                }
            }
        }
        Ok(())
    }

    /// Fetch a single item scoped to its workspace.
    pub async fn get_item(&self, workspace_id: Uuid, id: Uuid) -> Result<Option<KnowledgeItem>> {
        self.repo.fetch(workspace_id, id).await
    }

    /// List items in a workspace with optional collection, type, and
    /// status filters.
    pub async fn list_items(
        &self,
        workspace_id: Uuid,
        req: ListItemsRequest,
    ) -> Result<ListItemsResponse> {
        self.repo.list(workspace_id, req).await
    }

    /// Sweep every ready item in a workspace back into the vector
    /// index. Used to repair drift after degraded writes or an index
    /// wipe. Items without a stored embedding, or whose embedding no
    /// longer matches the backend dimension, are skipped.
    #[instrument(skip(self), fields(
        subsystem = "retrieval",
        component = "dual_write",
        op = "reindex_workspace",
        workspace_id = %workspace_id,
    ))]
    pub async fn reindex_workspace(&self, workspace_id: Uuid) -> Result<ReindexReport> {
        let index = self
            .index
            .as_ref()
            .ok_or_else(|| Error::Config("vector index not configured".into()))?;

        let items = self
            .repo
            .scan_ready(workspace_id, &SearchFilters::default(), i64::MAX)
            .await?;

        let mut report = ReindexReport::default();
        for item in &items {
            let embedding = match &item.embedding {
                Some(v) if v.as_slice().len() == self.embedder.dimension() => v,
                _ => {
                    report.skipped += 1;
                    continue;
                }
            };
            match index
                .upsert(item.id, embedding, IndexMetadata::for_item(item))
                .await
            {
                Ok(()) => report.upserted += 1,
                Err(e) => {
                    warn!(item_id = %item.id, error = %e, "Reindex upsert failed");
                    report.failed += 1;
                }
            }
        }

        info!(
            upserted = report.upserted,
            skipped = report.skipped,
            failed = report.failed,
            "Workspace reindex complete"
        );
        Ok(report)
    }

    async fn mirror_upsert(&self, item: &KnowledgeItem, embedding: &Vector) -> Result<()> {
        match &self.index {
            Some(index) => {
                index
                    .upsert(item.id, embedding, IndexMetadata::for_item(item))
                    .await
            }
            None => Ok(()),
        }
    }

    async fn mirror_metadata(&self, item: &KnowledgeItem) -> Result<()> {
        match &self.index {
            Some(index) => index.update_metadata(item.id, IndexMetadata::for_item(item)).await,
            None => Ok(()),
        }
    }

    pub(crate) fn item_visible(workspace_id: Uuid, item: &KnowledgeItem) -> bool {
        item.workspace_id == workspace_id && item.status == ItemStatus::Ready
    }
}
