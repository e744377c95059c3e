//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod links;
pub mod shorten;
pub mod stats;

pub use health::health_handler;
pub use links::{delete_handler, resolve_handler, update_handler};
pub use shorten::shorten_handler;
pub use stats::stats_handler;
