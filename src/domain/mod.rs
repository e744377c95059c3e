//! Domain layer containing business entities and repository contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`access_event`] - Access counting event model
//! - [`access_worker`] - Asynchronous access counter worker
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Business logic is encapsulated in services (see [`crate::application::services`])
//!
//! # Access Counting Flow
//!
//! 1. [`crate::application::services::UrlService::resolve`] finds the record
//! 2. An [`access_event::AccessEvent`] is pushed to a bounded channel (never awaited)
//! 3. [`access_worker::run_access_worker`] applies the increment with retry
//! 4. The counter is updated via [`repositories::UrlRepository::increment_access_count`]

pub mod access_event;
pub mod access_worker;
pub mod entities;
pub mod repositories;
