use async_trait::async_trait;
use std::{collections::HashMap, time::Duration};
use tokio::sync::RwLock;

use super::{Document, DocumentStore, Fields, Filter, RecordId, StoreError};

/// Process-local store. Each collection keeps insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let mut documents: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.matches(&doc.fields))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if filter.sort.is_some() {
            documents.sort_by(|a, b| filter.compare(a, b));
        }

        Ok(documents)
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: RecordId,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<RecordId, StoreError> {
        let id = RecordId::new();
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id, fields));
        Ok(id)
    }

    async fn update(
        &self,
        collection: &str,
        id: RecordId,
        patch: Fields,
    ) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
        else {
            return Ok(false);
        };
        document.merge(patch);
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: RecordId) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|doc| doc.id != id);
        Ok(docs.len() != before)
    }

    async fn upsert_singleton(
        &self,
        collection: &str,
        patch: Fields,
    ) -> Result<RecordId, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.first_mut() {
            Some(document) => {
                document.merge(patch);
                Ok(document.id)
            }
            None => {
                let id = RecordId::new();
                docs.push(Document::new(id, patch));
                Ok(id)
            }
        }
    }

    async fn ping(&self) -> Result<Duration, StoreError> {
        Ok(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_insert_then_find_by_id() {
        let store = MemoryStore::new();
        let id = store
            .insert("projects", fields(json!({ "title": "Album" })))
            .await
            .unwrap();

        let found = store.find_by_id("projects", id).await.unwrap().unwrap();
        assert_eq!(found.get("title"), Some(&json!("Album")));
        assert!(store.find_by_id("portfolio", id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_merges_and_reports_match() {
        let store = MemoryStore::new();
        let id = store
            .insert("projects", fields(json!({ "title": "A", "description": "B" })))
            .await
            .unwrap();

        assert!(store
            .update("projects", id, fields(json!({ "title": "C" })))
            .await
            .unwrap());
        assert!(!store
            .update("projects", RecordId::new(), fields(json!({ "title": "C" })))
            .await
            .unwrap());

        let found = store.find_by_id("projects", id).await.unwrap().unwrap();
        assert_eq!(found.get("title"), Some(&json!("C")));
        assert_eq!(found.get("description"), Some(&json!("B")));
    }

    #[tokio::test]
    async fn test_delete_removes_only_target() {
        let store = MemoryStore::new();
        let keep = store.insert("tracks", fields(json!({ "n": 1 }))).await.unwrap();
        let gone = store.insert("tracks", fields(json!({ "n": 2 }))).await.unwrap();

        assert!(store.delete("tracks", gone).await.unwrap());
        assert!(!store.delete("tracks", gone).await.unwrap());
        assert!(store.find_by_id("tracks", keep).await.unwrap().is_some());
        assert_eq!(store.len("tracks").await, 1);
    }

    #[tokio::test]
    async fn test_find_filters_and_sorts() {
        let store = MemoryStore::new();
        for (n, approved, at) in [
            (1, true, "2024-01-01T00:00:00.000Z"),
            (2, false, "2024-02-01T00:00:00.000Z"),
            (3, true, "2024-03-01T00:00:00.000Z"),
        ] {
            store
                .insert(
                    "posts",
                    fields(json!({ "n": n, "approved": approved, "createdAt": at })),
                )
                .await
                .unwrap();
        }

        let filter = Filter::all().eq("approved", true).sort_by("createdAt", true);
        let found = store.find("posts", &filter).await.unwrap();
        let order: Vec<_> = found.iter().map(|d| d.get("n").cloned().unwrap()).collect();
        assert_eq!(order, vec![json!(3), json!(1)]);
    }

    #[tokio::test]
    async fn test_upsert_singleton_keeps_one_document() {
        let store = MemoryStore::new();
        let first = store
            .upsert_singleton("social_links", fields(json!({ "instagram": "a" })))
            .await
            .unwrap();
        let second = store
            .upsert_singleton("social_links", fields(json!({ "spotify": "b" })))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(store.len("social_links").await, 1);
        let doc = store.find_by_id("social_links", first).await.unwrap().unwrap();
        assert_eq!(doc.get("instagram"), Some(&json!("a")));
        assert_eq!(doc.get("spotify"), Some(&json!("b")));
    }
}
