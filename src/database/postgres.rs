//! Document store backed by a single JSONB table in PostgreSQL.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{Pool, Postgres, Row, postgres::PgPoolOptions, postgres::PgRow, types::Json};

use crate::{
    config::DatabaseConfig,
    database::{Collection, Document, DocumentStore, Fields, generate_id},
    error::AppError,
};

pub struct PgDocumentStore {
    pool: Pool<Postgres>,
}

impl PgDocumentStore {
    /// Connects with the `PSQL_NAME`/`PSQL_PASS` credentials and creates the schema if needed.
    pub async fn connect(config: &DatabaseConfig, name: &str, pass: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&format!("postgres://{}:{}@{}", name, pass, config.host))
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), AppError> {
        let mut transaction = self.pool.begin().await?;

        if let Err(e) = sqlx::query("CREATE SCHEMA IF NOT EXISTS peak;")
            .execute(&mut *transaction)
            .await
        {
            return Err(AppError::Network(format!("Could not create schema 'peak': {e}")));
        }

        if let Err(e) = sqlx::query(
            "CREATE TABLE IF NOT EXISTS peak.documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            body JSONB NOT NULL,
            CONSTRAINT documents_pkey PRIMARY KEY (collection, id)
        );",
        )
        .execute(&mut *transaction)
        .await
        {
            return Err(AppError::Network(format!("Could not create table documents: {e}")));
        }

        transaction.commit().await?;
        Ok(())
    }
}

fn to_document(row: PgRow) -> Result<Document, AppError> {
    let id: String = row.try_get("id")?;
    let Json(fields): Json<Fields> = row.try_get("body")?;
    Ok(Document { id, fields })
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get_by_id(&self, collection: Collection, id: &str) -> Result<Option<Document>, AppError> {
        sqlx::query("SELECT id, body FROM peak.documents WHERE collection = $1 AND id = $2;")
            .bind(collection.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(to_document)
            .transpose()
    }

    async fn query(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, AppError> {
        sqlx::query(
            "SELECT id, body FROM peak.documents
            WHERE collection = $1 AND body -> $2 = $3
            ORDER BY id ASC;",
        )
        .bind(collection.as_str())
        .bind(field)
        .bind(Json(value))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(to_document)
        .collect()
    }

    async fn insert(&self, collection: Collection, fields: Fields) -> Result<String, AppError> {
        loop {
            let id = generate_id();
            let inserted = sqlx::query(
                "INSERT INTO peak.documents (collection, id, body) VALUES ($1, $2, $3)
                ON CONFLICT (collection, id) DO NOTHING;",
            )
            .bind(collection.as_str())
            .bind(&id)
            .bind(Json(&fields))
            .execute(&self.pool)
            .await?;

            if inserted.rows_affected() == 1 {
                return Ok(id);
            }
        }
    }

    async fn insert_new(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<bool, AppError> {
        let inserted = sqlx::query(
            "INSERT INTO peak.documents (collection, id, body) VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO NOTHING;",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(&fields))
        .execute(&self.pool)
        .await?;

        Ok(inserted.rows_affected() == 1)
    }

    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<bool, AppError> {
        let updated = sqlx::query(
            "UPDATE peak.documents SET body = body || $3 WHERE collection = $1 AND id = $2;",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(&fields))
        .execute(&self.pool)
        .await?;

        Ok(updated.rows_affected() > 0)
    }

    async fn update_fields_if(
        &self,
        collection: Collection,
        id: &str,
        guard: &str,
        expected: &Value,
        fields: Fields,
    ) -> Result<bool, AppError> {
        let updated = sqlx::query(
            "UPDATE peak.documents SET body = body || $5
            WHERE collection = $1 AND id = $2
            AND COALESCE(body -> $3, 'null'::jsonb) = $4;",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(guard)
        .bind(Json(expected))
        .bind(Json(&fields))
        .execute(&self.pool)
        .await?;

        Ok(updated.rows_affected() > 0)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, AppError> {
        let deleted = sqlx::query("DELETE FROM peak.documents WHERE collection = $1 AND id = $2;")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(deleted.rows_affected() > 0)
    }
}
