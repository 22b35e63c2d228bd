//! # recall-db
//!
//! PostgreSQL durable store for recall.
//!
//! This crate provides:
//! - Connection pool management
//! - The tenant-scoped `KnowledgeRepository` implementation over the
//!   `knowledge_item` table (source of truth, with a denormalized pgvector
//!   column for fallback search)
//!
//! Schema is managed externally; the repository expects:
//!
//! ```sql
//! CREATE TABLE knowledge_item (
//!     id               uuid PRIMARY KEY,
//!     workspace_id     uuid NOT NULL,
//!     collection_id    uuid,
//!     item_type        text NOT NULL,
//!     status           text NOT NULL,
//!     title            text NOT NULL,
//!     content          text NOT NULL,
//!     tags             text[] NOT NULL DEFAULT '{}',
//!     metadata         jsonb NOT NULL DEFAULT '{}',
//!     embedding        vector,
//!     embedding_model  text,
//!     source_url       text,
//!     file_name        text,
//!     file_size        bigint,
//!     mime_type        text,
//!     processing_error text,
//!     created_by       uuid NOT NULL,
//!     created_at       timestamptz NOT NULL DEFAULT now(),
//!     updated_at       timestamptz NOT NULL DEFAULT now()
//! );
//! CREATE INDEX knowledge_item_tenant_idx ON knowledge_item (workspace_id);
//! CREATE INDEX knowledge_item_status_idx ON knowledge_item (workspace_id, status);
//! CREATE INDEX knowledge_item_collection_idx ON knowledge_item (collection_id);
//! ```

pub mod knowledge_items;
pub mod pool;

// Re-export core types
pub use recall_core::*;

pub use knowledge_items::PgKnowledgeRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

/// Combined database context.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Knowledge item repository.
    pub items: PgKnowledgeRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            items: PgKnowledgeRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect with default pool configuration.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        Ok(Self::new(pool))
    }
}
