//! Upload creation (tus `creation` and `creation-with-upload`).

use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{header_str, header_u64, num_header};
use crate::metrics::{BYTES_RECEIVED, UPLOADS_CREATED};
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, HOST, LOCATION};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use betus_core::protocol;

/// Slack added to the declared length when buffering request bodies,
/// covering HTTP framing overhead.
const BODY_READ_SLACK: usize = 1024;

/// Base URL for `Location` headers: the configured public base URL when set,
/// otherwise derived from the request's `Host` header.
fn location_base(state: &AppState, host: Option<&str>) -> String {
    if let Some(base) = &state.config.server.public_base_url {
        return base.trim_end_matches('/').to_string();
    }
    match host {
        Some(host) => format!("http://{host}"),
        None => "http://127.0.0.1:8080".to_string(),
    }
}

/// POST /files - create a new upload, optionally with initial content.
#[tracing::instrument(skip(state, req))]
pub async fn create_upload(State(state): State<AppState>, req: Request) -> ApiResult<Response> {
    let headers = req.headers();

    let Some(upload_len) = header_u64(headers, protocol::UPLOAD_LENGTH).filter(|n| *n > 0) else {
        // Deferred length is not supported; zero-length uploads are not a thing.
        return Err(ApiError::BadRequest(
            "Upload-Length must be present and positive".to_string(),
        ));
    };
    if upload_len > state.config.server.max_upload_size {
        return Err(ApiError::PayloadTooLarge(format!(
            "Upload-Length {} exceeds Tus-Max-Size {}",
            upload_len, state.config.server.max_upload_size
        )));
    }

    let comment = header_str(headers, protocol::UPLOAD_METADATA)
        .unwrap_or_default()
        .to_string();
    let content_len = header_u64(headers, CONTENT_LENGTH.as_str()).unwrap_or(0);
    let content_type_ok =
        header_str(headers, CONTENT_TYPE.as_str()) == Some(protocol::OFFSET_OCTET_STREAM);
    let base = location_base(&state, header_str(headers, HOST.as_str()));

    let mut tmp = state.files.new_temporary();
    tmp.initialize(upload_len, &comment)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to initialize upload: {e}")))?;

    let mut initial_offset = None;
    if content_len > 0 {
        // Validated before persist: a rejected body drops the temporary and
        // leaves no state behind.
        if !content_type_ok {
            return Err(ApiError::UnsupportedMediaType(format!(
                "initial content requires Content-Type {}",
                protocol::OFFSET_OCTET_STREAM
            )));
        }
        let limit = state.config.server.max_upload_size as usize + BODY_READ_SLACK;
        let body = axum::body::to_bytes(req.into_body(), limit)
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read body: {e}")))?;
        let written = tmp.write_initial(&body).await;
        if written == 0 {
            return Err(ApiError::Internal("initial write failed".to_string()));
        }
        BYTES_RECEIVED.inc_by(written);
        initial_offset = Some(written);
    }

    tmp.persist();
    UPLOADS_CREATED.inc();
    tracing::info!(upload_id = %tmp.id(), length = upload_len, "upload created");

    let location = format!("{base}{}/{}", protocol::FILES_PREFIX, tmp.id());
    let mut resp = StatusCode::CREATED.into_response();
    let resp_headers = resp.headers_mut();
    resp_headers.insert(
        LOCATION,
        HeaderValue::from_str(&location)
            .map_err(|e| ApiError::Internal(format!("invalid Location value: {e}")))?,
    );
    if let Some(offset) = initial_offset {
        resp_headers.insert(
            HeaderName::from_static(protocol::UPLOAD_OFFSET),
            num_header(offset),
        );
    }
    Ok(resp)
}
