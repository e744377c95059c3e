//! PostgreSQL repository tests.
//!
//! Each test gets a fresh database with migrations applied. They need a
//! reachable server in `DATABASE_URL`; run with `cargo test -- --ignored`.

use chrono::{Duration, Utc};
use shortcode_service::AppError;
use shortcode_service::domain::entities::{NewUrlRecord, UrlPatch};
use shortcode_service::domain::repositories::UrlRepository;
use shortcode_service::infrastructure::persistence::PgUrlRepository;
use sqlx::PgPool;
use std::sync::Arc;

fn new_record(code: &str, url: &str) -> NewUrlRecord {
    NewUrlRecord {
        original_url: url.to_string(),
        short_code: code.to_string(),
        created_at: Utc::now(),
    }
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_insert_and_find(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));

    let created = repo
        .insert(new_record("abc123", "https://example.com"))
        .await
        .unwrap();

    assert_eq!(created.short_code, "abc123");
    assert_eq!(created.original_url, "https://example.com");
    assert_eq!(created.access_count, 0);
    assert_eq!(created.created_at, created.updated_at);

    let found = repo.find_by_code("abc123").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_find_unknown_code(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));

    assert!(repo.find_by_code("nope00").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_insert_duplicate_code(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));
    repo.insert(new_record("abc123", "https://example.com"))
        .await
        .unwrap();

    let result = repo
        .insert(new_record("abc123", "https://rust-lang.org"))
        .await;

    assert!(matches!(result, Err(AppError::DuplicateKey { .. })));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_update_overwrites_destination(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));
    let created = repo
        .insert(new_record("abc123", "https://example.com"))
        .await
        .unwrap();
    repo.increment_access_count("abc123").await.unwrap();

    let updated = repo
        .update(
            "abc123",
            UrlPatch {
                original_url: "https://rust-lang.org".to_string(),
                updated_at: created.created_at + Duration::seconds(5),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.original_url, "https://rust-lang.org");
    assert_eq!(updated.access_count, 1);
    assert!(updated.updated_at > created.updated_at);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_update_never_moves_before_creation(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));
    let created = repo
        .insert(new_record("abc123", "https://example.com"))
        .await
        .unwrap();

    let updated = repo
        .update(
            "abc123",
            UrlPatch {
                original_url: "https://rust-lang.org".to_string(),
                updated_at: created.created_at - Duration::hours(1),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.updated_at, created.created_at);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_missing_code_operations(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));

    assert!(matches!(
        repo.delete("nope00").await,
        Err(AppError::NotFound { .. })
    ));
    assert!(matches!(
        repo.increment_access_count("nope00").await,
        Err(AppError::NotFound { .. })
    ));
    assert!(matches!(
        repo.update(
            "nope00",
            UrlPatch {
                original_url: "https://example.com".to_string(),
                updated_at: Utc::now(),
            }
        )
        .await,
        Err(AppError::NotFound { .. })
    ));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_delete_removes_record(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));
    repo.insert(new_record("abc123", "https://example.com"))
        .await
        .unwrap();

    repo.delete("abc123").await.unwrap();

    assert!(repo.find_by_code("abc123").await.unwrap().is_none());
    assert!(matches!(
        repo.delete("abc123").await,
        Err(AppError::NotFound { .. })
    ));
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_concurrent_increments(pool: PgPool) {
    let repo = Arc::new(PgUrlRepository::new(Arc::new(pool)));
    repo.insert(new_record("abc123", "https://example.com"))
        .await
        .unwrap();

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.increment_access_count("abc123").await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let record = repo.find_by_code("abc123").await.unwrap().unwrap();
    assert_eq!(record.access_count, 20);
}

#[sqlx::test]
#[ignore = "requires PostgreSQL"]
async fn test_ping(pool: PgPool) {
    let repo = PgUrlRepository::new(Arc::new(pool));

    assert!(repo.ping().await.is_ok());
}
