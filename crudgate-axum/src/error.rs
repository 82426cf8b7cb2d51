//! HTTP error responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use crudgate_query::QueryError;
use http::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// A failure turned into an `{"error": message}` response.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A query, store or entity error.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The request body could not be read as the entity.
    #[error("{0}")]
    Payload(String),
}

impl ApiError {
    /// Status code for this error.
    ///
    /// Request errors map to 400, missing records to 404 and everything
    /// else to 500.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Payload(_) => StatusCode::BAD_REQUEST,
            Self::Query(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Query(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Payload(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                Self::Query(e) => error!(code = %e.code, error = %e.display_full(), "request failed"),
                Self::Payload(msg) => error!(error = %msg, "request failed"),
            }
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
