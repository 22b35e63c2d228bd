//! Dual-store write behavior: commit ordering, degraded outcomes,
//! workspace scoping, and index repair.

mod helpers;

use uuid::Uuid;

use helpers::{fallback_service, indexed_service, ready_item};
use recall_core::{ItemStatus, ItemType};
use recall_embed::MockEmbeddingBackend;
use recall_retrieval::{
    CreateItemRequest, Error, ListItemsRequest, RetrievalService, UpdateItemRequest,
};

fn text_item(workspace_id: Uuid, title: &str, content: &str) -> CreateItemRequest {
    CreateItemRequest::text(workspace_id, Uuid::new_v4(), title, content)
}

#[tokio::test]
async fn store_commits_to_both_stores() {
    let (service, repo, index) = indexed_service(MockEmbeddingBackend::new());
    let ws = Uuid::new_v4();

    let outcome = service
        .store_item(text_item(ws, "Q3 report", "Quarterly revenue grew 12%"))
        .await
        .unwrap();
    assert!(!outcome.is_degraded());

    let id = outcome.id();
    let stored = repo.get(id).unwrap();
    assert_eq!(stored.workspace_id, ws);
    assert_eq!(stored.status, ItemStatus::Ready);
    assert!(stored.embedding.is_some());
    assert_eq!(stored.embedding_model.as_deref(), Some("mock-embedder"));

    assert!(index.contains(id));
    let meta = index.metadata_for(id).unwrap();
    assert_eq!(meta.workspace_id, ws);
    assert_eq!(meta.status, ItemStatus::Ready);
}

#[tokio::test]
async fn store_rejects_blank_fields_before_embedding() {
    let embedder = MockEmbeddingBackend::new();
    let (service, repo) = fallback_service(embedder.clone());
    let ws = Uuid::new_v4();

    let err = service.store_item(text_item(ws, "  ", "content")).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = service.store_item(text_item(ws, "title", " \n ")).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    assert_eq!(repo.len(), 0);
    assert_eq!(embedder.call_count(), 0);
}

#[tokio::test]
async fn store_aborts_when_embedding_fails() {
    let (service, repo, index) = indexed_service(MockEmbeddingBackend::failing());
    let ws = Uuid::new_v4();

    let err = service
        .store_item(text_item(ws, "title", "content"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Embedding(_)));
    assert_eq!(repo.len(), 0);
    assert!(index.is_empty());
}

#[tokio::test]
async fn store_survives_index_failure_as_degraded_commit() {
    let (service, repo, index) = indexed_service(MockEmbeddingBackend::new());
    index.set_fail_upsert(true);
    let ws = Uuid::new_v4();

    let outcome = service
        .store_item(text_item(ws, "title", "durable content"))
        .await
        .unwrap();
    assert!(outcome.is_degraded());

    // Durable store holds the item even though the mirror missed it.
    assert!(repo.get(outcome.id()).is_some());
    assert!(index.is_empty());
}

#[tokio::test]
async fn update_content_reembeds_and_mirrors() {
    let embedder = MockEmbeddingBackend::new();
    let (service, repo, index) = indexed_service(embedder.clone());
    let ws = Uuid::new_v4();

    let id = service
        .store_item(text_item(ws, "notes", "first draft"))
        .await
        .unwrap()
        .id();

    let outcome = service
        .update_item(
            ws,
            id,
            UpdateItemRequest {
                content: Some("second draft".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!outcome.is_degraded());

    assert_eq!(embedder.calls(), vec!["first draft", "second draft"]);
    assert_eq!(repo.get(id).unwrap().content, "second draft");
    assert!(index.contains(id));
}

#[tokio::test]
async fn metadata_only_update_skips_reembedding() {
    let embedder = MockEmbeddingBackend::new();
    let (service, repo, index) = indexed_service(embedder.clone());
    let ws = Uuid::new_v4();

    let id = service
        .store_item(text_item(ws, "notes", "stable content"))
        .await
        .unwrap()
        .id();
    assert_eq!(embedder.call_count(), 1);

    service
        .update_item(
            ws,
            id,
            UpdateItemRequest {
                tags: Some(vec!["finance".into()]),
                status: Some(ItemStatus::Processing),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(embedder.call_count(), 1);
    assert_eq!(repo.get(id).unwrap().tags, vec!["finance"]);
    // The index payload follows the durable row without a new vector.
    assert_eq!(
        index.metadata_for(id).unwrap().status,
        ItemStatus::Processing
    );
}

#[tokio::test]
async fn update_requires_at_least_one_field() {
    let (service, _repo) = fallback_service(MockEmbeddingBackend::new());
    let err = service
        .update_item(Uuid::new_v4(), Uuid::new_v4(), UpdateItemRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn update_is_scoped_to_the_owning_workspace() {
    let (service, repo) = fallback_service(MockEmbeddingBackend::new());
    let ws = Uuid::new_v4();

    let id = service
        .store_item(text_item(ws, "private", "original"))
        .await
        .unwrap()
        .id();

    let err = service
        .update_item(
            Uuid::new_v4(),
            id,
            UpdateItemRequest {
                title: Some("hijacked".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ItemNotFound(found) if found == id));
    assert_eq!(repo.get(id).unwrap().title, "private");
}

#[tokio::test]
async fn update_missing_item_is_not_found() {
    let (service, _repo) = fallback_service(MockEmbeddingBackend::new());
    let id = Uuid::new_v4();
    let err = service
        .update_item(
            Uuid::new_v4(),
            id,
            UpdateItemRequest {
                title: Some("anything".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ItemNotFound(found) if found == id));
}

#[tokio::test]
async fn delete_removes_from_both_stores_and_is_idempotent() {
    let (service, repo, index) = indexed_service(MockEmbeddingBackend::new());
    let ws = Uuid::new_v4();

    let id = service
        .store_item(text_item(ws, "temp", "to be removed"))
        .await
        .unwrap()
        .id();
    assert!(index.contains(id));

    service.delete_item(ws, id).await.unwrap();
    assert!(repo.get(id).is_none());
    assert!(!index.contains(id));

    // Second delete of the same id, and deletes of unknown ids, succeed.
    service.delete_item(ws, id).await.unwrap();
    service.delete_item(ws, Uuid::new_v4()).await.unwrap();
}

#[tokio::test]
async fn delete_from_another_workspace_leaves_item_intact() {
    let (service, repo, index) = indexed_service(MockEmbeddingBackend::new());
    let ws = Uuid::new_v4();

    let id = service
        .store_item(text_item(ws, "kept", "other tenants cannot remove this"))
        .await
        .unwrap()
        .id();

    service.delete_item(Uuid::new_v4(), id).await.unwrap();
    assert!(repo.get(id).is_some());
    assert!(index.contains(id));
}

#[tokio::test]
async fn get_item_is_workspace_scoped() {
    let (service, _repo) = fallback_service(MockEmbeddingBackend::new());
    let ws = Uuid::new_v4();

    let id = service
        .store_item(text_item(ws, "mine", "scoped read"))
        .await
        .unwrap()
        .id();

    assert!(service.get_item(ws, id).await.unwrap().is_some());
    assert!(service.get_item(Uuid::new_v4(), id).await.unwrap().is_none());
}

#[tokio::test]
async fn list_items_filters_and_pages() {
    let (service, _repo) = fallback_service(MockEmbeddingBackend::new());
    let ws = Uuid::new_v4();

    for i in 0..4 {
        service
            .store_item(text_item(ws, &format!("item {i}"), "body"))
            .await
            .unwrap();
    }
    service
        .store_item(text_item(Uuid::new_v4(), "elsewhere", "body"))
        .await
        .unwrap();

    let all = service
        .list_items(ws, ListItemsRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total, 4);
    assert_eq!(all.items.len(), 4);
    assert!(all.items.iter().all(|i| i.workspace_id == ws));

    let page = service
        .list_items(
            ws,
            ListItemsRequest {
                limit: Some(2),
                offset: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.items.len(), 2);

    let typed = service
        .list_items(
            ws,
            ListItemsRequest {
                item_type: Some(ItemType::Document),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(typed.total, 0);
}

#[tokio::test]
async fn reindex_repairs_degraded_writes() {
    let (service, _repo, index) = indexed_service(MockEmbeddingBackend::new());
    let ws = Uuid::new_v4();

    index.set_fail_upsert(true);
    let outcome = service
        .store_item(text_item(ws, "drifted", "missed the mirror"))
        .await
        .unwrap();
    assert!(outcome.is_degraded());
    assert!(index.is_empty());

    index.set_fail_upsert(false);
    let report = service.reindex_workspace(ws).await.unwrap();
    assert_eq!(report.upserted, 1);
    assert_eq!(report.failed, 0);
    assert!(index.contains(outcome.id()));
}

#[tokio::test]
async fn reindex_skips_items_without_usable_embeddings() {
    let (service, repo, index) = indexed_service(MockEmbeddingBackend::new());
    let ws = Uuid::new_v4();

    let mut no_embedding = ready_item(ws, "bare", "no vector stored", vec![1.0; 8]);
    no_embedding.embedding = None;
    repo.insert_raw(no_embedding);
    // Dimension drifted from the backend's current 8.
    repo.insert_raw(ready_item(ws, "stale dims", "old model output", vec![1.0; 4]));
    repo.insert_raw(ready_item(ws, "good", "usable vector", vec![1.0; 8]));

    let report = service.reindex_workspace(ws).await.unwrap();
    assert_eq!(report.upserted, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(index.len(), 1);
}

#[tokio::test]
async fn reindex_counts_failed_upserts() {
    let (service, repo, index) = indexed_service(MockEmbeddingBackend::new());
    let ws = Uuid::new_v4();
    repo.insert_raw(ready_item(ws, "a", "body", vec![1.0; 8]));
    index.set_fail_upsert(true);

    let report = service.reindex_workspace(ws).await.unwrap();
    assert_eq!(report.upserted, 0);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn reindex_without_an_index_is_a_config_error() {
    let (service, _repo) = fallback_service(MockEmbeddingBackend::new());
    let err = service.reindex_workspace(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn service_builds_without_index_by_default() {
    let repo = std::sync::Arc::new(helpers::InMemoryRepository::new());
    let service = RetrievalService::new(repo, std::sync::Arc::new(MockEmbeddingBackend::new()));
    // No index configured: reindex refuses, writes still commit.
    assert!(service.reindex_workspace(Uuid::new_v4()).await.is_err());
}
