//! Integration tests for the REST vector index client against a local mock
//! HTTP server.

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use recall_core::{Error, IndexMetadata, ItemStatus, ItemType, Vector, VectorIndex};
use recall_index::{HttpVectorIndex, IndexConfig};

fn client_for(server: &MockServer) -> HttpVectorIndex {
    HttpVectorIndex::new(IndexConfig {
        base_url: server.uri(),
        token: Some("index-token".to_string()),
        timeout_secs: 5,
    })
    .unwrap()
}

fn meta(workspace_id: Uuid) -> IndexMetadata {
    IndexMetadata {
        workspace_id,
        collection_id: None,
        item_type: ItemType::Document,
        status: ItemStatus::Ready,
    }
}

#[tokio::test]
async fn test_upsert_sends_vector_and_metadata() {
    let server = MockServer::start().await;
    let ws = Uuid::new_v4();
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/upsert"))
        .and(header("authorization", "Bearer index-token"))
        .and(body_partial_json(json!({
            "id": id,
            "vector": [0.5, 0.5],
            "metadata": { "workspace_id": ws, "item_type": "document", "status": "ready" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "Success"})))
        .expect(1)
        .mount(&server)
        .await;

    let index = client_for(&server);
    index
        .upsert(id, &Vector::from(vec![0.5, 0.5]), meta(ws))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_query_parses_hits_and_drops_metadata_less_results() {
    let server = MockServer::start().await;
    let ws = Uuid::new_v4();
    let good = Uuid::new_v4();
    let orphan = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({ "topK": 6, "includeMetadata": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [
                {
                    "id": good,
                    "score": 0.92,
                    "metadata": {
                        "workspace_id": ws,
                        "item_type": "text",
                        "status": "ready"
                    }
                },
                { "id": orphan, "score": 0.88 }
            ]
        })))
        .mount(&server)
        .await;

    let index = client_for(&server);
    let hits = index.query(&Vector::from(vec![1.0, 0.0]), 6).await.unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, good);
    assert!((hits[0].score - 0.92).abs() < 1e-6);
    assert_eq!(hits[0].metadata.workspace_id, ws);
}

#[tokio::test]
async fn test_delete_posts_id_list() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/delete"))
        .and(body_partial_json(json!({ "ids": [id] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let index = client_for(&server);
    index.delete(id).await.unwrap();
}

#[tokio::test]
async fn test_server_error_is_index_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let index = client_for(&server);
    let err = index
        .query(&Vector::from(vec![1.0]), 3)
        .await
        .unwrap_err();
    match err {
        Error::Index(msg) => assert!(msg.contains("503")),
        other => panic!("expected Index error, got {other:?}"),
    }
}
