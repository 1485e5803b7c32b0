//! An in-process document store, used for local runs (`store = "memory"`) and tests.

use std::collections::{BTreeMap, HashMap, btree_map::Entry};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    database::{Collection, Document, DocumentStore, Fields, generate_id},
    error::AppError,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, BTreeMap<String, Fields>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record under a caller-chosen id, replacing any previous one.
    #[cfg(test)]
    pub async fn put(&self, collection: Collection, id: impl Into<String>, fields: Fields) {
        self.collections
            .lock()
            .await
            .entry(collection)
            .or_default()
            .insert(id.into(), fields);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_by_id(&self, collection: Collection, id: &str) -> Result<Option<Document>, AppError> {
        let collections = self.collections.lock().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.to_owned(),
                fields: fields.clone(),
            }))
    }

    async fn query(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, AppError> {
        let collections = self.collections.lock().await;
        let Some(docs) = collections.get(&collection) else {
            return Ok(vec![]);
        };

        Ok(docs
            .iter()
            .filter(|(_, fields)| fields.get(field) == Some(value))
            .map(|(id, fields)| Document {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect())
    }

    async fn insert(&self, collection: Collection, fields: Fields) -> Result<String, AppError> {
        let mut collections = self.collections.lock().await;
        let docs = collections.entry(collection).or_default();

        let mut id = generate_id();
        while docs.contains_key(&id) {
            id = generate_id();
        }
        docs.insert(id.clone(), fields);
        Ok(id)
    }

    async fn insert_new(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<bool, AppError> {
        let mut collections = self.collections.lock().await;
        match collections.entry(collection).or_default().entry(id.to_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(fields);
                Ok(true)
            }
            Entry::Occupied(_) => Ok(false),
        }
    }

    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<bool, AppError> {
        let mut collections = self.collections.lock().await;
        let Some(existing) = collections.get_mut(&collection).and_then(|docs| docs.get_mut(id))
        else {
            return Ok(false);
        };

        existing.extend(fields);
        Ok(true)
    }

    async fn update_fields_if(
        &self,
        collection: Collection,
        id: &str,
        guard: &str,
        expected: &Value,
        fields: Fields,
    ) -> Result<bool, AppError> {
        let mut collections = self.collections.lock().await;
        let Some(existing) = collections.get_mut(&collection).and_then(|docs| docs.get_mut(id))
        else {
            return Ok(false);
        };

        if existing.get(guard).unwrap_or(&Value::Null) != expected {
            return Ok(false);
        }

        existing.extend(fields);
        Ok(true)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, AppError> {
        let mut collections = self.collections.lock().await;
        Ok(collections
            .get_mut(&collection)
            .and_then(|docs| docs.remove(id))
            .is_some())
    }
}
