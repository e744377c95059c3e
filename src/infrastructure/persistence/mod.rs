//! Store implementations of [`crate::domain::repositories::UrlRepository`].
//!
//! # Repositories
//!
//! - [`PgUrlRepository`] - PostgreSQL storage via SQLx, unique index on `short_code`
//! - [`InMemoryUrlRepository`] - Process-local map for tests and database-less runs

pub mod memory_url_repository;
pub mod pg_url_repository;

pub use memory_url_repository::InMemoryUrlRepository;
pub use pg_url_repository::PgUrlRepository;
