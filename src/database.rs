//! The document store seam and the operations built on top of it.
//!
//! Records are schemaless JSON objects grouped in collections and addressed by a generated id.
//! `postgres` keeps them in a JSONB table, `memory` in a map; everything else in this module only
//! sees the [`DocumentStore`] trait.

use std::fmt;

use async_trait::async_trait;
use rand::{Rng, distr::Alphanumeric};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::AppError;

pub mod auth;
pub mod memory;
pub mod operations;
pub mod postgres;
pub mod student;
pub mod teacher;
#[cfg(test)]
pub(crate) mod testing;
pub mod user;

pub type Fields = serde_json::Map<String, Value>;

const ID_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Students,
    Teachers,
    QuestionSets,
    AnswerSets,
    Credentials,
    Sessions,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Students => "students",
            Collection::Teachers => "teachers",
            Collection::QuestionSets => "question_sets",
            Collection::AnswerSets => "answer_sets",
            Collection::Credentials => "credentials",
            Collection::Sessions => "sessions",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    /// Deserializes the record, exposing the store id as the `id` field.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, AppError> {
        let mut fields = self.fields;
        fields.insert("id".into(), Value::String(self.id));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

/// Serializes a record for storage. The `id` field belongs to the store and is dropped.
pub fn encode<T: Serialize>(value: &T) -> Result<Fields, AppError> {
    match serde_json::to_value(value)? {
        Value::Object(mut fields) => {
            fields.remove("id");
            Ok(fields)
        }
        other => Err(AppError::Network(format!(
            "Expected an object record, found {other}"
        ))),
    }
}

pub fn generate_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_by_id(&self, collection: Collection, id: &str) -> Result<Option<Document>, AppError>;

    /// All records whose top-level `field` equals `value`, ordered by id.
    async fn query(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, AppError>;

    /// Stores a new record and returns its generated id.
    async fn insert(&self, collection: Collection, fields: Fields) -> Result<String, AppError>;

    /// Stores a record under `id` unless that id is taken. Returns false if it was.
    async fn insert_new(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<bool, AppError>;

    /// Merges `fields` into an existing record. Returns false if the record is absent.
    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<bool, AppError>;

    /// Merges `fields` only while `guard` still holds `expected` (a missing field reads as null).
    /// Returns false if the record is absent or the guard no longer matches.
    async fn update_fields_if(
        &self,
        collection: Collection,
        id: &str,
        guard: &str,
        expected: &Value,
        fields: Fields,
    ) -> Result<bool, AppError>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, AppError>;
}

/// Typed helpers over the raw trait.
pub async fn get<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: &str,
) -> Result<Option<T>, AppError> {
    store
        .get_by_id(collection, id)
        .await?
        .map(Document::decode)
        .transpose()
}

pub async fn find<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    field: &str,
    value: impl Into<Value>,
) -> Result<Vec<T>, AppError> {
    store
        .query(collection, field, &value.into())
        .await?
        .into_iter()
        .map(Document::decode)
        .collect()
}
