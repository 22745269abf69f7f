//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use betus_core::protocol::STATUS_CHECKSUM_MISMATCH;
use betus_files::FilesError;

/// API error type.
///
/// tus responses carry their meaning in the status code alone, so errors
/// render as empty-bodied responses; the message is kept for logs.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("gone: {0}")]
    Gone(String),

    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("checksum mismatch: client sent {client}, server computed {computed}")]
    ChecksumMismatch { client: String, computed: String },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("storage error: {0}")]
    Files(#[from] FilesError),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::PreconditionFailed(_) => "precondition_failed",
            Self::UnsupportedMediaType(_) => "unsupported_media_type",
            Self::Conflict(_) => "conflict",
            Self::Gone(_) => "gone",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::ChecksumMismatch { .. } => "checksum_mismatch",
            Self::Internal(_) => "internal_error",
            Self::Files(_) => "storage_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Gone(_) => StatusCode::GONE,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ChecksumMismatch { .. } => StatusCode::from_u16(STATUS_CHECKSUM_MISMATCH)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Files(e) => match e {
                FilesError::NotFound(_) => StatusCode::NOT_FOUND,
                FilesError::Busy(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.code(), error = %self, "request rejected");
        }
        status.into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
