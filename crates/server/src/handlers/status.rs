//! Upload state queries.

use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{num_header, parse_upload_id};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header::CACHE_CONTROL;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use betus_core::protocol;

/// HEAD /files/{upload_id} - report the current offset of an upload.
#[tracing::instrument(skip(state), fields(upload_id = %upload_id))]
pub async fn head_upload(
    State(state): State<AppState>,
    Path(upload_id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_upload_id(&upload_id)?;
    let lease = state.files.acquire(id)?;

    let md = lease.metadata().await;
    if md.is_corrupted() {
        if lease.data_file_missing().await {
            return Err(ApiError::Internal(format!("data file missing for {id}")));
        }
        return Err(ApiError::Gone(format!("metadata unreadable for {id}")));
    }

    let mut resp = StatusCode::NO_CONTENT.into_response();
    let headers = resp.headers_mut();
    headers.insert(
        HeaderName::from_static(protocol::UPLOAD_OFFSET),
        num_header(md.offset as u64),
    );
    if md.length > 0 {
        headers.insert(
            HeaderName::from_static(protocol::UPLOAD_LENGTH),
            num_header(md.length),
        );
    }
    if !md.comment.is_empty()
        && let Ok(value) = HeaderValue::from_str(&md.comment)
    {
        headers.insert(HeaderName::from_static(protocol::UPLOAD_METADATA), value);
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(resp)
}
