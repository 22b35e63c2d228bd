//! Shared fixtures for the retrieval service integration tests: an
//! in-memory repository standing in for Postgres, plus service builders
//! wired against the mock embedding backend and mock vector index.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use recall_core::{
    CreateItemRequest, Error, ItemMetadata, ItemStatus, ItemType, KnowledgeItem,
    KnowledgeRepository, ListItemsRequest, ListItemsResponse, Result, SearchFilters,
    UpdateItemRequest, Vector,
};
use recall_embed::MockEmbeddingBackend;
use recall_index::MockVectorIndex;
use recall_retrieval::RetrievalService;

/// In-memory [`KnowledgeRepository`] with the same scoping and ordering
/// behavior as the Postgres implementation.
#[derive(Default)]
pub struct InMemoryRepository {
    items: Mutex<HashMap<Uuid, KnowledgeItem>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    /// Seed a fully-formed row, bypassing the service's embed step.
    pub fn insert_raw(&self, item: KnowledgeItem) {
        self.items.lock().unwrap().insert(item.id, item);
    }

    pub fn get(&self, id: Uuid) -> Option<KnowledgeItem> {
        self.items.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl KnowledgeRepository for InMemoryRepository {
    async fn insert(
        &self,
        req: CreateItemRequest,
        embedding: Option<Vector>,
        embedding_model: Option<&str>,
    ) -> Result<KnowledgeItem> {
        let now = Utc::now();
        let item = KnowledgeItem {
            id: Uuid::now_v7(),
            workspace_id: req.workspace_id,
            collection_id: req.collection_id,
            item_type: req.item_type,
            status: req.status.unwrap_or_default(),
            title: req.title,
            content: req.content,
            tags: req.tags,
            metadata: req.metadata,
            embedding,
            embedding_model: embedding_model.map(String::from),
            source_url: req.source_url,
            file_name: req.file_name,
            file_size: req.file_size,
            mime_type: req.mime_type,
            processing_error: None,
            created_by: req.created_by,
            created_at: now,
            updated_at: now,
        };
        self.items.lock().unwrap().insert(item.id, item.clone());
        Ok(item)
    }

    async fn fetch(&self, workspace_id: Uuid, id: Uuid) -> Result<Option<KnowledgeItem>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .get(&id)
            .filter(|i| i.workspace_id == workspace_id)
            .cloned())
    }

    async fn fetch_many(&self, workspace_id: Uuid, ids: &[Uuid]) -> Result<Vec<KnowledgeItem>> {
        let items = self.items.lock().unwrap();
        let mut out: Vec<KnowledgeItem> = ids
            .iter()
            .filter_map(|id| items.get(id))
            .filter(|i| i.workspace_id == workspace_id)
            .cloned()
            .collect();
        out.sort_by_key(|i| i.id);
        Ok(out)
    }

    async fn update(
        &self,
        workspace_id: Uuid,
        id: Uuid,
        req: UpdateItemRequest,
        new_embedding: Option<(Vector, String)>,
    ) -> Result<KnowledgeItem> {
        let mut items = self.items.lock().unwrap();
        let item = items
            .get_mut(&id)
            .filter(|i| i.workspace_id == workspace_id)
            .ok_or(Error::ItemNotFound(id))?;

        if let Some(title) = req.title {
            item.title = title;
        }
        if let Some(content) = req.content {
            item.content = content;
        }
        if let Some(collection_id) = req.collection_id {
            item.collection_id = collection_id;
        }
        if let Some(tags) = req.tags {
            item.tags = tags;
        }
        if let Some(metadata) = req.metadata {
            item.metadata = metadata;
        }
        if let Some(status) = req.status {
            item.status = status;
        }
        if let Some((vector, model)) = new_embedding {
            item.embedding = Some(vector);
            item.embedding_model = Some(model);
        }
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn delete(&self, workspace_id: Uuid, id: Uuid) -> Result<bool> {
        let mut items = self.items.lock().unwrap();
        match items.get(&id) {
            Some(i) if i.workspace_id == workspace_id => {
                items.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn scan_ready(
        &self,
        workspace_id: Uuid,
        filters: &SearchFilters,
        cap: i64,
    ) -> Result<Vec<KnowledgeItem>> {
        let items = self.items.lock().unwrap();
        let mut out: Vec<KnowledgeItem> = items
            .values()
            .filter(|i| {
                i.workspace_id == workspace_id
                    && i.status == ItemStatus::Ready
                    && filters.matches_item(i)
            })
            .cloned()
            .collect();
        out.sort_by_key(|i| i.id);
        out.truncate(cap.max(0) as usize);
        Ok(out)
    }

    async fn list(&self, workspace_id: Uuid, req: ListItemsRequest) -> Result<ListItemsResponse> {
        let items = self.items.lock().unwrap();
        let mut matching: Vec<KnowledgeItem> = items
            .values()
            .filter(|i| {
                i.workspace_id == workspace_id
                    && req.collection_id.map_or(true, |c| i.collection_id == Some(c))
                    && req.item_type.map_or(true, |t| i.item_type == t)
                    && req.status.map_or(true, |s| i.status == s)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let total = matching.len() as i64;
        let offset = req.offset.unwrap_or(0).max(0) as usize;
        let limit = req.limit.unwrap_or(50).clamp(1, 500) as usize;
        let page = matching.into_iter().skip(offset).take(limit).collect();
        Ok(ListItemsResponse { items: page, total })
    }
}

/// A service backed by the in-memory repository and mock embedder, with
/// no vector index: every search takes the fallback path.
pub fn fallback_service(
    embedder: MockEmbeddingBackend,
) -> (RetrievalService, Arc<InMemoryRepository>) {
    let repo = Arc::new(InMemoryRepository::new());
    let service = RetrievalService::new(repo.clone(), Arc::new(embedder));
    (service, repo)
}

/// A service with the mock vector index attached.
pub fn indexed_service(
    embedder: MockEmbeddingBackend,
) -> (RetrievalService, Arc<InMemoryRepository>, MockVectorIndex) {
    let repo = Arc::new(InMemoryRepository::new());
    let index = MockVectorIndex::new();
    let service = RetrievalService::new(repo.clone(), Arc::new(embedder))
        .with_index(Arc::new(index.clone()));
    (service, repo, index)
}

/// A ready text item with a pinned embedding, for seeding the
/// repository directly.
pub fn ready_item(workspace_id: Uuid, title: &str, content: &str, embedding: Vec<f32>) -> KnowledgeItem {
    let now = Utc::now();
    KnowledgeItem {
        id: Uuid::now_v7(),
        workspace_id,
        collection_id: None,
        item_type: ItemType::Text,
        status: ItemStatus::Ready,
        title: title.to_string(),
        content: content.to_string(),
        tags: Vec::new(),
        metadata: ItemMetadata::default(),
        embedding: Some(Vector::from(embedding)),
        embedding_model: Some("mock-embedder".to_string()),
        source_url: None,
        file_name: None,
        file_size: None,
        mime_type: None,
        processing_error: None,
        created_by: Uuid::new_v4(),
        created_at: now,
        updated_at: now,
    }
}
