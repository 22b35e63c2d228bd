//! Core data models for the recall retrieval library.
//!
//! These types are shared across all recall crates and represent the core
//! domain entities: knowledge items, search requests/results, and the typed
//! outcomes of dual-write operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use uuid::Uuid;

use crate::defaults;

// =============================================================================
// EMBEDDING VECTOR
// =============================================================================

/// Embedding vector type (re-exported from pgvector).
pub use pgvector::Vector;

// =============================================================================
// KNOWLEDGE ITEM
// =============================================================================

/// Kind of source a knowledge item was ingested from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// Uploaded or processed document
    Document,
    /// Scraped/fetched URL
    Url,
    /// Image with extracted (OCR) text
    Image,
    /// Plain text entry
    #[default]
    Text,
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Url => write!(f, "url"),
            Self::Image => write!(f, "image"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl std::str::FromStr for ItemType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document" => Ok(Self::Document),
            "url" => Ok(Self::Url),
            "image" => Ok(Self::Image),
            "text" => Ok(Self::Text),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown item type: {other}"
            ))),
        }
    }
}

/// Processing status of a knowledge item.
///
/// `processing` transitions to `ready` or `failed`; both are terminal until
/// the item is re-ingested. Only `ready` items are eligible for search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Ingestion/extraction still in flight
    Processing,
    /// Searchable
    #[default]
    Ready,
    /// Ingestion failed; see `processing_error`
    Failed,
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Processing => write!(f, "processing"),
            Self::Ready => write!(f, "ready"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(Self::Processing),
            "ready" => Ok(Self::Ready),
            "failed" => Ok(Self::Failed),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown item status: {other}"
            ))),
        }
    }
}

/// Provider-specific metadata attached to a knowledge item.
///
/// Named fields for the attributes extraction pipelines commonly produce;
/// anything else lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_at: Option<DateTime<Utc>>,
    /// OCR confidence for image items (0.0 to 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_confidence: Option<f64>,
    /// Open extension point for provider-specific attributes.
    #[serde(flatten)]
    pub extra: HashMap<String, JsonValue>,
}

/// The unit of retrieval.
///
/// The durable store row is the source of truth; `embedding` is the
/// denormalized copy used by the fallback search path.
#[derive(Debug, Clone)]
pub struct KnowledgeItem {
    pub id: Uuid,
    /// Tenant partition key. Immutable after creation; every read/write
    /// path is scoped by it.
    pub workspace_id: Uuid,
    pub collection_id: Option<Uuid>,
    pub item_type: ItemType,
    pub status: ItemStatus,
    pub title: String,
    /// Raw text used for embedding and snippeting.
    pub content: String,
    pub tags: Vec<String>,
    pub metadata: ItemMetadata,
    /// Denormalized embedding for fallback search. `None` or a vector of
    /// the wrong dimension excludes the item from search without erroring.
    pub embedding: Option<Vector>,
    /// Model that produced `embedding`.
    pub embedding_model: Option<String>,
    pub source_url: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    /// Populated when `status` is `failed`.
    pub processing_error: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for creating a knowledge item.
#[derive(Debug, Clone)]
pub struct CreateItemRequest {
    pub workspace_id: Uuid,
    pub created_by: Uuid,
    pub collection_id: Option<Uuid>,
    pub item_type: ItemType,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub metadata: ItemMetadata,
    pub source_url: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    /// Defaults to `ready` when not supplied.
    pub status: Option<ItemStatus>,
}

impl CreateItemRequest {
    /// Minimal request: a text item owned by `created_by` in `workspace_id`.
    pub fn text(workspace_id: Uuid, created_by: Uuid, title: &str, content: &str) -> Self {
        Self {
            workspace_id,
            created_by,
            collection_id: None,
            item_type: ItemType::Text,
            title: title.to_string(),
            content: content.to_string(),
            tags: Vec::new(),
            metadata: ItemMetadata::default(),
            source_url: None,
            file_name: None,
            file_size: None,
            mime_type: None,
            status: None,
        }
    }
}

/// Partial update to a knowledge item.
///
/// `None` means "leave unchanged". For `collection_id` the outer `Option`
/// is the unchanged marker and the inner one clears the assignment.
#[derive(Debug, Clone, Default)]
pub struct UpdateItemRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub collection_id: Option<Option<Uuid>>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<ItemMetadata>,
    pub status: Option<ItemStatus>,
}

impl UpdateItemRequest {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.collection_id.is_none()
            && self.tags.is_none()
            && self.metadata.is_none()
            && self.status.is_none()
    }
}

/// Request for listing items in a workspace.
#[derive(Debug, Clone, Default)]
pub struct ListItemsRequest {
    pub collection_id: Option<Uuid>,
    pub item_type: Option<ItemType>,
    pub status: Option<ItemStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response for listing items.
#[derive(Debug, Clone)]
pub struct ListItemsResponse {
    pub items: Vec<KnowledgeItem>,
    pub total: i64,
}

// =============================================================================
// VECTOR INDEX TYPES
// =============================================================================

/// Metadata payload mirrored into the vector index alongside each vector.
///
/// The index is not tenant-partitioned; `workspace_id` here is the only
/// tenant signal it carries, and search treats it as untrusted (the durable
/// store re-validates every hit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub workspace_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<Uuid>,
    pub item_type: ItemType,
    pub status: ItemStatus,
}

impl IndexMetadata {
    /// Build the mirror payload for an item.
    pub fn for_item(item: &KnowledgeItem) -> Self {
        Self {
            workspace_id: item.workspace_id,
            collection_id: item.collection_id,
            item_type: item.item_type,
            status: item.status,
        }
    }
}

/// A single nearest-neighbor hit returned by the vector index.
#[derive(Debug, Clone)]
pub struct IndexHit {
    pub id: Uuid,
    /// Cosine similarity in [0, 1] as reported by the index.
    pub score: f32,
    pub metadata: IndexMetadata,
}

// =============================================================================
// SEARCH TYPES
// =============================================================================

/// Typed search filters, one named field per dimension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Restrict to these collections (OR within the list).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collection_ids: Vec<Uuid>,
    /// Restrict to these item types (OR within the list).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<ItemType>,
    /// Require at least one of these tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl SearchFilters {
    /// True when no filter dimension is set.
    pub fn is_empty(&self) -> bool {
        self.collection_ids.is_empty() && self.types.is_empty() && self.tags.is_empty()
    }

    /// Apply the collection and type dimensions to index metadata.
    ///
    /// Tags are not mirrored into the index, so the tag dimension is
    /// checked separately against the hydrated durable row.
    pub fn matches_metadata(&self, meta: &IndexMetadata) -> bool {
        if !self.collection_ids.is_empty() {
            match meta.collection_id {
                Some(cid) if self.collection_ids.contains(&cid) => {}
                _ => return false,
            }
        }
        if !self.types.is_empty() && !self.types.contains(&meta.item_type) {
            return false;
        }
        true
    }

    /// Apply the tag dimension: at least one requested tag must be present.
    pub fn matches_tags(&self, item_tags: &[String]) -> bool {
        if self.tags.is_empty() {
            return true;
        }
        self.tags.iter().any(|t| item_tags.iter().any(|it| it == t))
    }

    /// Apply all dimensions to a full durable-store row.
    pub fn matches_item(&self, item: &KnowledgeItem) -> bool {
        if !self.collection_ids.is_empty() {
            match item.collection_id {
                Some(cid) if self.collection_ids.contains(&cid) => {}
                _ => return false,
            }
        }
        if !self.types.is_empty() && !self.types.contains(&item.item_type) {
            return false;
        }
        self.matches_tags(&item.tags)
    }
}

/// A similarity search request, always scoped to one workspace.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub workspace_id: Uuid,
    pub limit: Option<i64>,
    /// Minimum acceptable similarity score.
    pub threshold: Option<f32>,
    pub filters: SearchFilters,
}

impl SearchRequest {
    /// Create a request with default limit and threshold.
    pub fn new(query: impl Into<String>, workspace_id: Uuid) -> Self {
        Self {
            query: query.into(),
            workspace_id,
            limit: None,
            threshold: None,
            filters: SearchFilters::default(),
        }
    }

    /// Set the maximum number of results.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the minimum similarity score.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Set the search filters.
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Effective limit with the default applied.
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(defaults::SEARCH_LIMIT).max(1)
    }

    /// Effective threshold with the default applied.
    pub fn effective_threshold(&self) -> f32 {
        self.threshold.unwrap_or(defaults::SIMILARITY_THRESHOLD)
    }
}

/// A single search result: the durable item plus its score and snippet.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub item: KnowledgeItem,
    pub relevance_score: f32,
    pub snippet: String,
}

/// Which path served a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPath {
    /// Approximate nearest-neighbor index
    Primary,
    /// Brute-force scan of the durable store
    Fallback,
}

impl std::fmt::Display for SearchPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Search results plus provenance about how they were produced.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub path: SearchPath,
    /// True when the fallback scan hit its row cap and may have missed
    /// candidates.
    pub truncated: bool,
}

/// Context assembled for downstream generation callers.
#[derive(Debug, Clone)]
pub struct RetrievalContext {
    pub sources: Vec<SearchResult>,
    /// "title: snippet" lines joined by blank lines.
    pub summary: String,
}

// =============================================================================
// WRITE OUTCOMES
// =============================================================================

/// Typed outcome of a dual-write operation.
///
/// The durable store is the commit point; the vector index is a best-effort
/// mirror. A mirror failure degrades the outcome instead of failing the
/// call, so operators can observe drift without losing availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Both stores accepted the write.
    Committed { id: Uuid },
    /// The durable store committed but the index mirror failed.
    CommittedDegraded { id: Uuid, mirror_error: String },
}

impl StoreOutcome {
    /// Id of the durably committed item.
    pub fn id(&self) -> Uuid {
        match self {
            Self::Committed { id } | Self::CommittedDegraded { id, .. } => *id,
        }
    }

    /// True when the index mirror did not accept the write.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::CommittedDegraded { .. })
    }
}

/// Report from an explicit reindex sweep over a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexReport {
    /// Items re-upserted into the index.
    pub upserted: usize,
    /// Items skipped (no stored embedding, or not `ready`).
    pub skipped: usize,
    /// Items whose upsert failed.
    pub failed: usize,
}
