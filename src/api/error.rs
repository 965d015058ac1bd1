//! API error responses

use crate::tracker::TrackerError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error returned by a handler
#[derive(Debug)]
pub enum ApiError {
    /// Request content is invalid
    BadRequest(String),
    /// Body could not be extracted as JSON
    Rejected(JsonRejection),
    /// Tracker rejected the operation
    Tracker(TrackerError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Rejected(rejection) => rejection.status(),
            Self::Tracker(TrackerError::AlreadyTracked(_) | TrackerError::NotTracked(_)) => {
                StatusCode::CONFLICT
            }
            Self::Tracker(TrackerError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Tracker(TrackerError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected(rejection)
    }
}

impl From<TrackerError> for ApiError {
    fn from(error: TrackerError) -> Self {
        Self::Tracker(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::BadRequest(msg) => msg.clone(),
            Self::Rejected(rejection) => rejection.body_text(),
            Self::Tracker(e) => e.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %message, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %message, "Request rejected");
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
