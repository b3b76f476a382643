use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::reports::ReportError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid `{field}` parameter: {value:?}")]
    InvalidParam { field: &'static str, value: String },
    #[error("range spans {days} days, limit is {max}")]
    RangeTooLong { days: i64, max: i64 },
    #[error(transparent)]
    Report(#[from] ReportError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidParam { .. } | ApiError::RangeTooLong { .. } => StatusCode::BAD_REQUEST,
            ApiError::Report(ReportError::UnknownKind(_)) => StatusCode::NOT_FOUND,
            ApiError::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        } else {
            tracing::debug!("Rejected request: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
