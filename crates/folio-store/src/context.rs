//! The generic collection context.
//!
//! A context owns a disposable cache of one collection plus `loading` and
//! `error` state. Every public operation:
//!
//! 1. sets `loading` and clears `error`,
//! 2. calls the backend,
//! 3. on success updates the cache (prepend on create, replace on update,
//!    filter on delete),
//! 4. on failure logs, stores the display string in `error`, and returns the
//!    error to the caller.
//!
//! The `raw_*` operations do steps 2 and 3 only; per-entity contexts compose
//! them inside a single [`CollectionContext::track`].

use folio_appwrite::Query;
use folio_common::error::{FolioError, FolioResult};
use folio_common::models::Document;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::backend::DocumentStore;

/// Fixed page size when none is configured.
pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// Snapshot of a context's state.
#[derive(Debug, Clone)]
pub struct ContextState<T> {
    pub items: Vec<Document<T>>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ContextState<T> {
    fn default() -> Self {
        Self { items: Vec::new(), loading: false, error: None }
    }
}

pub struct CollectionContext<T> {
    /// Human name used in errors and logs, e.g. "Project"
    resource: &'static str,
    collection: String,
    store: Arc<dyn DocumentStore>,
    order: Query,
    limit: u32,
    state: RwLock<ContextState<T>>,
}

impl<T> CollectionContext<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// A context ordered newest-first by `$createdAt`.
    pub fn new(
        resource: &'static str,
        collection: impl Into<String>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            resource,
            collection: collection.into(),
            store,
            order: Query::order_desc("$createdAt"),
            limit: DEFAULT_LIST_LIMIT,
            state: RwLock::new(ContextState::default()),
        }
    }

    pub fn with_order(mut self, order: Query) -> Self {
        self.order = order;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    // ── State ─────────────────────────────────────────────────────────────────

    pub async fn snapshot(&self) -> ContextState<T> {
        self.state.read().await.clone()
    }

    pub async fn items(&self) -> Vec<Document<T>> {
        self.state.read().await.items.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    /// Look an item up in the cache only.
    pub async fn find(&self, id: &str) -> Option<Document<T>> {
        self.state
            .read()
            .await
            .items
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    /// Run `op` with loading/error bookkeeping. Errors are logged, stored as
    /// the display string, and returned.
    pub async fn track<R, F>(&self, action: &str, op: F) -> FolioResult<R>
    where
        F: Future<Output = FolioResult<R>>,
    {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        let result = op.await;

        let mut state = self.state.write().await;
        state.loading = false;
        if let Err(e) = &result {
            tracing::error!(collection = %self.collection, action, error = %e, "{} operation failed", self.resource);
            state.error = Some(e.to_string());
        }
        result
    }

    // ── Tracked operations ────────────────────────────────────────────────────

    /// Reload the whole collection, replacing the cache.
    pub async fn fetch_all(&self) -> FolioResult<Vec<Document<T>>> {
        self.track("fetch", self.raw_fetch_all()).await
    }

    /// Read one document from the backend.
    pub async fn get(&self, id: &str) -> FolioResult<Document<T>> {
        self.track("get", self.raw_get(id)).await
    }

    pub async fn create(&self, data: &T) -> FolioResult<Document<T>> {
        self.track("create", self.raw_create(data)).await
    }

    /// Partial update: only the keys present in `patch` change.
    pub async fn update(&self, id: &str, patch: Value) -> FolioResult<Document<T>> {
        self.track("update", self.raw_update(id, patch)).await
    }

    /// Full replace of the payload.
    pub async fn replace(&self, id: &str, data: &T) -> FolioResult<Document<T>> {
        self.track("replace", async {
            let patch = self.encode(data)?;
            self.raw_update(id, patch).await
        })
        .await
    }

    pub async fn delete(&self, id: &str) -> FolioResult<()> {
        self.track("delete", self.raw_delete(id)).await
    }

    // ── Untracked building blocks ─────────────────────────────────────────────

    pub async fn raw_fetch_all(&self) -> FolioResult<Vec<Document<T>>> {
        let queries = [self.order.clone(), Query::limit(self.limit)];
        let list = self
            .store
            .list_documents(&self.collection, &queries)
            .await
            .map_err(|e| self.rename(e))?;
        let items = list
            .documents
            .into_iter()
            .map(|v| self.decode(v))
            .collect::<FolioResult<Vec<_>>>()?;

        tracing::debug!(collection = %self.collection, count = items.len(), "fetched");
        self.state.write().await.items = items.clone();
        Ok(items)
    }

    pub async fn raw_get(&self, id: &str) -> FolioResult<Document<T>> {
        let value = self
            .store
            .get_document(&self.collection, id)
            .await
            .map_err(|e| self.rename(e))?;
        let doc = self.decode(value)?;
        self.replace_local(&doc).await;
        Ok(doc)
    }

    /// Cached copy if present, otherwise a backend read.
    pub async fn raw_current(&self, id: &str) -> FolioResult<Document<T>> {
        match self.find(id).await {
            Some(doc) => Ok(doc),
            None => self.raw_get(id).await,
        }
    }

    pub async fn raw_create(&self, data: &T) -> FolioResult<Document<T>> {
        let id = folio_appwrite::unique_id();
        let value = self
            .store
            .create_document(&self.collection, &id, self.encode(data)?)
            .await
            .map_err(|e| self.rename(e))?;
        let doc = self.decode(value)?;
        self.state.write().await.items.insert(0, doc.clone());
        Ok(doc)
    }

    pub async fn raw_update(&self, id: &str, patch: Value) -> FolioResult<Document<T>> {
        let value = self
            .store
            .update_document(&self.collection, id, patch)
            .await
            .map_err(|e| self.rename(e))?;
        let doc = self.decode(value)?;
        self.replace_local(&doc).await;
        Ok(doc)
    }

    pub async fn raw_delete(&self, id: &str) -> FolioResult<()> {
        let result = self
            .store
            .delete_document(&self.collection, id)
            .await
            .map_err(|e| self.rename(e));
        // A 404 means the cached copy is stale; drop it either way
        if result.is_ok() || matches!(result, Err(FolioError::NotFound { .. })) {
            self.state.write().await.items.retain(|d| d.id != id);
        }
        result
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    async fn replace_local(&self, doc: &Document<T>) {
        let mut state = self.state.write().await;
        if let Some(slot) = state.items.iter_mut().find(|d| d.id == doc.id) {
            *slot = doc.clone();
        }
    }

    fn encode(&self, data: &T) -> FolioResult<Value> {
        serde_json::to_value(data).map_err(|e| {
            FolioError::Internal(anyhow::anyhow!("Cannot encode {}: {e}", self.resource))
        })
    }

    fn decode(&self, value: Value) -> FolioResult<Document<T>> {
        serde_json::from_value(value).map_err(|e| {
            FolioError::Internal(anyhow::anyhow!("Malformed {} document: {e}", self.resource))
        })
    }

    /// Name 404s after this context's resource.
    fn rename(&self, err: FolioError) -> FolioError {
        match err {
            FolioError::NotFound { .. } => FolioError::not_found(self.resource),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{CallKind, MemoryBackend};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        title: String,
    }

    fn context(backend: &MemoryBackend) -> CollectionContext<Note> {
        CollectionContext::new("Note", "notes", Arc::new(backend.clone()))
    }

    #[tokio::test]
    async fn create_prepends_to_cache() {
        let backend = MemoryBackend::new();
        let ctx = context(&backend);
        ctx.create(&Note { title: "first".into() }).await.unwrap();
        ctx.create(&Note { title: "second".into() }).await.unwrap();

        let titles: Vec<_> = ctx.items().await.into_iter().map(|d| d.data.title).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn fetch_orders_newest_first() {
        let backend = MemoryBackend::new();
        backend.seed("notes", "old", json!({ "title": "old" }));
        backend.seed("notes", "new", json!({ "title": "new" }));

        let items = context(&backend).fetch_all().await.unwrap();
        assert_eq!(items[0].id, "new");
        assert_eq!(items[1].id, "old");
    }

    #[tokio::test]
    async fn failure_sets_error_and_clears_loading() {
        let backend = MemoryBackend::new();
        let ctx = context(&backend);
        backend.fail_next(CallKind::ListDocuments);

        assert!(ctx.fetch_all().await.is_err());
        let state = ctx.snapshot().await;
        assert!(!state.loading);
        assert!(state.error.unwrap().contains("injected"));

        // The next successful call clears the error
        ctx.fetch_all().await.unwrap();
        assert!(ctx.error().await.is_none());
    }

    #[tokio::test]
    async fn cache_untouched_when_update_fails() {
        let backend = MemoryBackend::new();
        let ctx = context(&backend);
        let doc = ctx.create(&Note { title: "keep".into() }).await.unwrap();
        backend.fail_next(CallKind::UpdateDocument);

        assert!(ctx.update(&doc.id, json!({ "title": "lost" })).await.is_err());
        assert_eq!(ctx.find(&doc.id).await.unwrap().title, "keep");
    }

    #[tokio::test]
    async fn missing_document_is_named_after_resource() {
        let backend = MemoryBackend::new();
        let err = context(&backend).get("nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Note not found");
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let backend = MemoryBackend::new();
        let ctx = context(&backend);
        let doc = ctx.create(&Note { title: "bye".into() }).await.unwrap();

        ctx.delete(&doc.id).await.unwrap();
        assert!(ctx.items().await.is_empty());
        let err = ctx.delete(&doc.id).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(ctx.error().await.as_deref(), Some("Note not found"));
    }
}
