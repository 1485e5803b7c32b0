//! A store wrapper for tests that need interleaved callers or failing calls.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    database::{Collection, Document, DocumentStore, Fields, memory::MemoryStore},
    error::AppError,
};

#[derive(Debug, Default)]
pub(crate) struct FaultyStore {
    pub inner: MemoryStore,
    /// Yield to the scheduler before every call, so tasks joined on one thread interleave.
    pub interleave: bool,
    pub fail_queries: bool,
    pub refuse_guarded_writes: bool,
    /// Guarded writes that did not apply.
    pub guarded_misses: AtomicUsize,
}

impl FaultyStore {
    pub fn interleaving() -> Self {
        Self {
            interleave: true,
            ..Self::default()
        }
    }

    pub fn misses(&self) -> usize {
        self.guarded_misses.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if self.interleave {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn get_by_id(&self, collection: Collection, id: &str) -> Result<Option<Document>, AppError> {
        self.pause().await;
        self.inner.get_by_id(collection, id).await
    }

    async fn query(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, AppError> {
        self.pause().await;
        if self.fail_queries {
            return Err(AppError::Network("connection reset".into()));
        }
        self.inner.query(collection, field, value).await
    }

    async fn insert(&self, collection: Collection, fields: Fields) -> Result<String, AppError> {
        self.pause().await;
        self.inner.insert(collection, fields).await
    }

    async fn insert_new(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<bool, AppError> {
        self.pause().await;
        self.inner.insert_new(collection, id, fields).await
    }

    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<bool, AppError> {
        self.pause().await;
        self.inner.update_fields(collection, id, fields).await
    }

    async fn update_fields_if(
        &self,
        collection: Collection,
        id: &str,
        guard: &str,
        expected: &Value,
        fields: Fields,
    ) -> Result<bool, AppError> {
        self.pause().await;
        let applied = !self.refuse_guarded_writes
            && self
                .inner
                .update_fields_if(collection, id, guard, expected, fields)
                .await?;
        if !applied {
            self.guarded_misses.fetch_add(1, Ordering::SeqCst);
        }
        Ok(applied)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, AppError> {
        self.pause().await;
        self.inner.delete(collection, id).await
    }
}
