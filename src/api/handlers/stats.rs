//! Handler for link statistics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::url_record::UrlRecordResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the record behind a short code without counting an access.
///
/// # Endpoint
///
/// `GET /shorten/{code}/stats`
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn stats_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UrlRecordResponse>, AppError> {
    let record = state.url_service.stats(&code).await?;
    Ok(Json(record.into()))
}
