//! HTTP-facing errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session {0} not found")]
    SessionNotFound(Uuid),

    #[error("A turn is already in progress for session {0}")]
    TurnInProgress(Uuid),

    #[error("Failed to render page: {0}")]
    Render(#[from] handlebars::RenderError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TurnInProgress(_) => StatusCode::CONFLICT,
            ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::SessionNotFound(_) => "session_not_found",
            ApiError::TurnInProgress(_) => "turn_in_progress",
            ApiError::Render(_) => "render_failed",
        }
    }
}

/// Error body: `{"error": {"message", "type", "code"}}`.
#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    r#type: String,
    code: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        let body = ErrorResponse {
            error: ErrorBody {
                message: self.to_string(),
                r#type: "error".to_string(),
                code: Some(self.code().to_string()),
            },
        };
        (status, Json(body)).into_response()
    }
}
