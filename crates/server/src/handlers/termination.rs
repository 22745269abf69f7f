//! Upload termination (tus `terminate`).

use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{header_str, parse_upload_id};
use crate::metrics::UPLOADS_TERMINATED;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_LENGTH;
use axum::http::{HeaderMap, StatusCode};

/// DELETE /files/{upload_id} - cancel an upload and remove its files.
#[tracing::instrument(skip(state, headers), fields(upload_id = %upload_id))]
pub async fn delete_upload(
    State(state): State<AppState>,
    Path(upload_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    // Content-Length must be absent or 0.
    if let Some(raw) = header_str(&headers, CONTENT_LENGTH.as_str())
        && raw.trim().parse::<u64>().map(|n| n > 0).unwrap_or(true)
    {
        return Err(ApiError::BadRequest(
            "DELETE must not carry a body".to_string(),
        ));
    }

    let id = parse_upload_id(&upload_id)?;
    let mut lease = state.files.acquire(id)?;
    lease.mark_delete();
    // Files are unlinked when the lease is released.
    drop(lease);

    UPLOADS_TERMINATED.inc();
    tracing::info!(upload_id = %id, "upload terminated");
    Ok(StatusCode::NO_CONTENT)
}
