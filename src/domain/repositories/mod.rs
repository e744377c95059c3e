//! Repository trait definitions for the domain layer.
//!
//! The service depends only on [`UrlRepository`]; concrete stores live in
//! `crate::infrastructure::persistence`.
//!
//! - Implementations: PostgreSQL and in-memory
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod url_repository;

pub use url_repository::UrlRepository;

#[cfg(test)]
pub use url_repository::MockUrlRepository;
