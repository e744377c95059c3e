//! API route configuration.

use crate::api::handlers::{
    delete_handler, resolve_handler, shorten_handler, stats_handler, update_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// URL lifecycle routes.
///
/// # Endpoints
///
/// - `POST   /shorten`              - Create a short code (201)
/// - `GET    /shorten/{code}`       - Resolve and count an access
/// - `PUT    /shorten/{code}`       - Replace the destination URL
/// - `DELETE /shorten/{code}`       - Remove the record (204)
/// - `GET    /shorten/{code}/stats` - Read the record without counting
pub fn shorten_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route(
            "/shorten/{code}",
            get(resolve_handler)
                .put(update_handler)
                .delete(delete_handler),
        )
        .route("/shorten/{code}/stats", get(stats_handler))
}
