//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewUrlRecord, UrlPatch, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// Row shape shared by every query returning a record.
#[derive(sqlx::FromRow)]
struct UrlRow {
    id: i64,
    original_url: String,
    short_code: String,
    access_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UrlRow> for UrlRecord {
    fn from(row: UrlRow) -> Self {
        Self {
            id: row.id,
            original_url: row.original_url,
            short_code: row.short_code,
            access_count: row.access_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL repository for URL records.
///
/// Uniqueness of `short_code` is enforced by the `urls_short_code_key`
/// constraint; a violation surfaces as [`AppError::DuplicateKey`].
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn not_found(code: &str) -> AppError {
    AppError::not_found("Short URL not found", json!({ "short_code": code }))
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn insert(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            INSERT INTO urls (original_url, short_code, access_count, created_at, updated_at)
            VALUES ($1, $2, 0, $3, $3)
            RETURNING id, original_url, short_code, access_count, created_at, updated_at
            "#,
        )
        .bind(&new_record.original_url)
        .bind(&new_record.short_code)
        .bind(new_record.created_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, original_url, short_code, access_count, created_at, updated_at
            FROM urls
            WHERE short_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UrlRecord::from))
    }

    async fn update(&self, code: &str, patch: UrlPatch) -> Result<UrlRecord, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            UPDATE urls
            SET original_url = $2,
                updated_at = GREATEST($3, created_at)
            WHERE short_code = $1
            RETURNING id, original_url, short_code, access_count, created_at, updated_at
            "#,
        )
        .bind(code)
        .bind(&patch.original_url)
        .bind(patch.updated_at)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(UrlRecord::from).ok_or_else(|| not_found(code))
    }

    async fn delete(&self, code: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM urls WHERE short_code = $1")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(code));
        }

        Ok(())
    }

    async fn increment_access_count(&self, code: &str) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE urls SET access_count = access_count + 1 WHERE short_code = $1")
                .bind(code)
                .execute(self.pool.as_ref())
                .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(code));
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
