//! Data appends with optional integrity verification (tus `checksum`).

use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{header_str, header_u64, num_header, parse_upload_id};
use crate::metrics::{BYTES_RECEIVED, CHECKSUM_MISMATCHES, OFFSET_CONFLICTS};
use crate::state::AppState;
use axum::extract::{Path, Request, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use betus_core::{UploadChecksum, protocol};

/// Slack added to the declared length when buffering request bodies.
const BODY_READ_SLACK: usize = 1024;

/// PATCH /files/{upload_id} - append a chunk at the declared offset.
#[tracing::instrument(skip(state, req), fields(upload_id = %upload_id))]
pub async fn patch_upload(
    State(state): State<AppState>,
    Path(upload_id): Path<String>,
    req: Request,
) -> ApiResult<Response> {
    let headers = req.headers();

    if header_str(headers, CONTENT_TYPE.as_str()) != Some(protocol::OFFSET_OCTET_STREAM) {
        return Err(ApiError::UnsupportedMediaType(format!(
            "PATCH requires Content-Type {}",
            protocol::OFFSET_OCTET_STREAM
        )));
    }
    let Some(content_len) = header_u64(headers, CONTENT_LENGTH.as_str()).filter(|n| *n > 0) else {
        return Err(ApiError::BadRequest(
            "Content-Length must be present and positive".to_string(),
        ));
    };
    let Some(upload_offset) = header_u64(headers, protocol::UPLOAD_OFFSET) else {
        return Err(ApiError::BadRequest(
            "Upload-Offset must be present".to_string(),
        ));
    };
    let checksum = match header_str(headers, protocol::UPLOAD_CHECKSUM) {
        Some(value) => {
            let checksum = UploadChecksum::parse(value)
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            if !checksum.is_supported() {
                return Err(ApiError::BadRequest(format!(
                    "unsupported checksum algorithm: {}",
                    checksum.algorithm
                )));
            }
            Some(checksum)
        }
        None => None,
    };

    let id = parse_upload_id(&upload_id)?;
    let mut lease = state.files.acquire(id)?;

    let md = lease.metadata().await;
    if md.is_corrupted() {
        if lease.data_file_missing().await {
            return Err(ApiError::Internal(format!("data file missing for {id}")));
        }
        return Err(ApiError::NotFound(format!("metadata unreadable for {id}")));
    }
    if md.offset as u64 != upload_offset {
        OFFSET_CONFLICTS.inc();
        return Err(ApiError::Conflict(format!(
            "recorded offset is {}, request declared {}",
            md.offset, upload_offset
        )));
    }
    // The data file is never truncated after creation, so a write past the
    // declared length would silently break offset <= length.
    match upload_offset.checked_add(content_len) {
        Some(end) if end <= md.length => {}
        _ => {
            return Err(ApiError::PayloadTooLarge(format!(
                "appending {} bytes at offset {} exceeds Upload-Length {}",
                content_len, upload_offset, md.length
            )));
        }
    }

    let limit = state.config.server.max_upload_size as usize + BODY_READ_SLACK;
    let body = axum::body::to_bytes(req.into_body(), limit)
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read body: {e}")))?;
    let written = lease.write_at(upload_offset, &body).await;
    if written == 0 {
        return Err(ApiError::Internal("write failed".to_string()));
    }

    if let Some(checksum) = checksum {
        let computed = lease.checksum_sha1_hex(upload_offset, written).await;
        if !checksum.matches_sha1_hex(&computed) {
            CHECKSUM_MISMATCHES.inc();
            // The offset is not committed; the range is re-writable.
            return Err(ApiError::ChecksumMismatch {
                client: checksum.digest_b64,
                computed,
            });
        }
    }

    let new_offset = upload_offset + written;
    if !lease.commit_offset(new_offset as i64).await {
        return Err(ApiError::Internal("offset commit failed".to_string()));
    }
    BYTES_RECEIVED.inc_by(written);

    let mut resp = StatusCode::NO_CONTENT.into_response();
    resp.headers_mut().insert(
        HeaderName::from_static(protocol::UPLOAD_OFFSET),
        num_header(new_offset),
    );
    Ok(resp)
}
