//! Knowledge item repository implementation.
//!
//! All queries are scoped by `workspace_id`. The table carries a
//! denormalized `embedding` column so the fallback search path can score
//! candidates without the vector index.

use async_trait::async_trait;
use pgvector::Vector;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use recall_core::{
    defaults, CreateItemRequest, Error, ItemStatus, KnowledgeItem, KnowledgeRepository,
    ListItemsRequest, ListItemsResponse, Result, SearchFilters, UpdateItemRequest,
};

/// Column list shared by every SELECT/RETURNING on `knowledge_item`.
const ITEM_COLUMNS: &str = "id, workspace_id, collection_id, item_type, status, title, content, \
     tags, metadata, embedding, embedding_model, source_url, file_name, file_size, mime_type, \
     processing_error, created_by, created_at, updated_at";

/// PostgreSQL implementation of KnowledgeRepository.
#[derive(Clone)]
pub struct PgKnowledgeRepository {
    pool: Pool<Postgres>,
}

impl PgKnowledgeRepository {
    /// Create a new PgKnowledgeRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_item(row: &PgRow) -> Result<KnowledgeItem> {
    let item_type: String = row.get("item_type");
    let status: String = row.get("status");
    let metadata = serde_json::from_value(row.get("metadata"))?;

    Ok(KnowledgeItem {
        id: row.get("id"),
        workspace_id: row.get("workspace_id"),
        collection_id: row.get("collection_id"),
        item_type: item_type.parse()?,
        status: status.parse()?,
        title: row.get("title"),
        content: row.get("content"),
        tags: row.get("tags"),
        metadata,
        embedding: row.get("embedding"),
        embedding_model: row.get("embedding_model"),
        source_url: row.get("source_url"),
        file_name: row.get("file_name"),
        file_size: row.get("file_size"),
        mime_type: row.get("mime_type"),
        processing_error: row.get("processing_error"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl KnowledgeRepository for PgKnowledgeRepository {
    async fn insert(
        &self,
        req: CreateItemRequest,
        embedding: Option<Vector>,
        embedding_model: Option<&str>,
    ) -> Result<KnowledgeItem> {
        let id = Uuid::now_v7();
        let status = req.status.unwrap_or_default();
        let metadata = serde_json::to_value(&req.metadata)?;

        let query = format!(
            "INSERT INTO knowledge_item \
                 (id, workspace_id, collection_id, item_type, status, title, content, tags, \
                  metadata, embedding, embedding_model, source_url, file_name, file_size, \
                  mime_type, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING {ITEM_COLUMNS}"
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(req.workspace_id)
            .bind(req.collection_id)
            .bind(req.item_type.to_string())
            .bind(status.to_string())
            .bind(&req.title)
            .bind(&req.content)
            .bind(&req.tags)
            .bind(metadata)
            .bind(embedding)
            .bind(embedding_model)
            .bind(&req.source_url)
            .bind(&req.file_name)
            .bind(req.file_size)
            .bind(&req.mime_type)
            .bind(req.created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        row_to_item(&row)
    }

    async fn fetch(&self, workspace_id: Uuid, id: Uuid) -> Result<Option<KnowledgeItem>> {
        let query =
            format!("SELECT {ITEM_COLUMNS} FROM knowledge_item WHERE workspace_id = $1 AND id = $2");
        let row = sqlx::query(&query)
            .bind(workspace_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.as_ref().map(row_to_item).transpose()
    }

    async fn fetch_many(&self, workspace_id: Uuid, ids: &[Uuid]) -> Result<Vec<KnowledgeItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM knowledge_item \
             WHERE workspace_id = $1 AND id = ANY($2)"
        );
        let rows = sqlx::query(&query)
            .bind(workspace_id)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        rows.iter().map(row_to_item).collect()
    }

    async fn update(
        &self,
        workspace_id: Uuid,
        id: Uuid,
        req: UpdateItemRequest,
        new_embedding: Option<(Vector, String)>,
    ) -> Result<KnowledgeItem> {
        let metadata = req
            .metadata
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;
        let (embedding, embedding_model) = match new_embedding {
            Some((vec, model)) => (Some(vec), Some(model)),
            None => (None, None),
        };

        // Flag-guarded CASE per column keeps this a single statement for any
        // combination of changed fields.
        let query = format!(
            "UPDATE knowledge_item SET \
                 title = CASE WHEN $3 THEN $4 ELSE title END, \
                 content = CASE WHEN $5 THEN $6 ELSE content END, \
                 collection_id = CASE WHEN $7 THEN $8 ELSE collection_id END, \
                 tags = CASE WHEN $9 THEN $10 ELSE tags END, \
                 metadata = CASE WHEN $11 THEN $12 ELSE metadata END, \
                 status = CASE WHEN $13 THEN $14 ELSE status END, \
                 embedding = CASE WHEN $15 THEN $16 ELSE embedding END, \
                 embedding_model = CASE WHEN $15 THEN $17 ELSE embedding_model END, \
                 updated_at = now() \
             WHERE workspace_id = $1 AND id = $2 \
             RETURNING {ITEM_COLUMNS}"
        );

        let row = sqlx::query(&query)
            .bind(workspace_id)
            .bind(id)
            .bind(req.title.is_some())
            .bind(&req.title)
            .bind(req.content.is_some())
            .bind(&req.content)
            .bind(req.collection_id.is_some())
            .bind(req.collection_id.flatten())
            .bind(req.tags.is_some())
            .bind(req.tags.unwrap_or_default())
            .bind(metadata.is_some())
            .bind(metadata)
            .bind(req.status.is_some())
            .bind(req.status.map(|s| s.to_string()))
            .bind(embedding.is_some())
            .bind(embedding)
            .bind(embedding_model)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        match row {
            Some(row) => row_to_item(&row),
            None => Err(Error::ItemNotFound(id)),
        }
    }

    async fn delete(&self, workspace_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM knowledge_item WHERE workspace_id = $1 AND id = $2")
            .bind(workspace_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn scan_ready(
        &self,
        workspace_id: Uuid,
        filters: &SearchFilters,
        cap: i64,
    ) -> Result<Vec<KnowledgeItem>> {
        let types: Vec<String> = filters.types.iter().map(|t| t.to_string()).collect();

        // Ordered by id (v7, time-ordered) so repeated scans over a fixed
        // corpus are deterministic.
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM knowledge_item \
             WHERE workspace_id = $1 AND status = $2 \
               AND (cardinality($3::uuid[]) = 0 OR collection_id = ANY($3)) \
               AND (cardinality($4::text[]) = 0 OR item_type = ANY($4)) \
               AND (cardinality($5::text[]) = 0 OR tags && $5) \
             ORDER BY id \
             LIMIT $6"
        );

        let rows = sqlx::query(&query)
            .bind(workspace_id)
            .bind(ItemStatus::Ready.to_string())
            .bind(&filters.collection_ids)
            .bind(&types)
            .bind(&filters.tags)
            .bind(cap.max(0))
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "knowledge_items",
            op = "scan_ready",
            workspace_id = %workspace_id,
            candidate_count = rows.len(),
            "Fetched fallback scan candidates"
        );

        rows.iter().map(row_to_item).collect()
    }

    async fn list(&self, workspace_id: Uuid, req: ListItemsRequest) -> Result<ListItemsResponse> {
        let limit = req.limit.unwrap_or(defaults::LIST_LIMIT).clamp(1, 500);
        let offset = req.offset.unwrap_or(0).max(0);

        let query = format!(
            "SELECT {ITEM_COLUMNS}, count(*) OVER() AS total FROM knowledge_item \
             WHERE workspace_id = $1 \
               AND ($2::uuid IS NULL OR collection_id = $2) \
               AND ($3::text IS NULL OR item_type = $3) \
               AND ($4::text IS NULL OR status = $4) \
             ORDER BY created_at DESC \
             LIMIT $5 OFFSET $6"
        );

        let rows = sqlx::query(&query)
            .bind(workspace_id)
            .bind(req.collection_id)
            .bind(req.item_type.map(|t| t.to_string()))
            .bind(req.status.map(|s| s.to_string()))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let total = rows
            .first()
            .map(|row| row.get::<i64, _>("total"))
            .unwrap_or(0);
        let items = rows.iter().map(row_to_item).collect::<Result<Vec<_>>>()?;

        Ok(ListItemsResponse { items, total })
    }
}
