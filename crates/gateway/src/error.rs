use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use notify_core::api::ErrorResponse;
use notify_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("task {0} not found")]
    NotFound(String),
    #[error("job store unavailable: {0}")]
    Unavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: &str) -> Self {
        Self::Validation(msg.to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the caller. Backend detail stays in the logs.
    fn public_message(&self) -> String {
        match self {
            ApiError::Validation(_) | ApiError::NotFound(_) => self.to_string(),
            ApiError::Unavailable(_) => "job queue unavailable".to_string(),
            ApiError::Internal(_) => "internal server error".to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(m) => ApiError::Unavailable(m),
            StoreError::NotFound(id) => ApiError::NotFound(id.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.status();
        if code.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        let body = Json(ErrorResponse {
            error: self.public_message(),
        });
        (code, body).into_response()
    }
}
