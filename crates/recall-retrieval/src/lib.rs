//! # recall-retrieval
//!
//! The retrieval service for recall: dual-store ingestion, workspace-scoped
//! similarity search with a brute-force fallback path, and context assembly
//! for generation callers.
//!
//! The service composes three seams defined in `recall-core`: a
//! [`KnowledgeRepository`](recall_core::KnowledgeRepository) over the durable
//! store, an [`EmbeddingBackend`](recall_core::EmbeddingBackend), and an
//! optional [`VectorIndex`](recall_core::VectorIndex) mirror. Without the
//! mirror every search runs on the fallback path; with it, the index serves
//! queries and the fallback absorbs its failures.

pub mod scoring;
pub mod search;
pub mod service;
pub mod snippet;

pub use scoring::cosine_similarity;
pub use service::RetrievalService;
pub use snippet::extract_snippet;

// Re-export the domain types callers need to drive the service.
pub use recall_core::{
    CreateItemRequest, Error, ItemMetadata, ItemStatus, ItemType, KnowledgeItem,
    ListItemsRequest, ListItemsResponse, ReindexReport, Result, RetrievalContext, SearchFilters,
    SearchPath, SearchRequest, SearchResponse, SearchResult, StoreOutcome, UpdateItemRequest,
};
