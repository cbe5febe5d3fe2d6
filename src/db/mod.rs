//! Document store: a named-collection record store behind one trait, with a
//! PostgreSQL (JSONB) backend and an in-memory backend.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use std::{sync::Arc, time::Duration};

pub use memory::MemoryStore;
pub use models::{Document, Fields, Filter, RecordId, Sort, ID_FIELD};
pub use postgres::{DbConfig, PgDocumentStore};

/// Connection string that selects the in-memory backend.
pub const MEMORY_URL: &str = "memory://";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored document {id} is not a JSON object")]
    InvalidDocument { id: RecordId },
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of `collection` matching `filter`, in filter order
    /// (insertion order when the filter has no sort).
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    async fn find_by_id(
        &self,
        collection: &str,
        id: RecordId,
    ) -> Result<Option<Document>, StoreError>;

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self.find(collection, filter).await?.into_iter().next())
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<RecordId, StoreError>;

    /// Shallow merge-patch. Returns `false` when no document matched.
    async fn update(
        &self,
        collection: &str,
        id: RecordId,
        patch: Fields,
    ) -> Result<bool, StoreError>;

    /// Returns `false` when no document matched.
    async fn delete(&self, collection: &str, id: RecordId) -> Result<bool, StoreError>;

    /// Merge-patches the first document of `collection`, or inserts `patch` as
    /// the first one. Concurrent calls never produce two documents.
    async fn upsert_singleton(
        &self,
        collection: &str,
        patch: Fields,
    ) -> Result<RecordId, StoreError>;

    /// Round-trip latency to the backend.
    async fn ping(&self) -> Result<Duration, StoreError>;
}

/// Opens the backend named by `config.url`, running migrations for PostgreSQL.
pub async fn connect(config: &DbConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    if config.url == MEMORY_URL {
        tracing::warn!("Using in-memory document store; data is lost on restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = PgDocumentStore::connect(config).await?;
    store.run_migrations().await?;
    Ok(Arc::new(store))
}
