use axum::{http::StatusCode, response::IntoResponse, Json};
use floorwise_core::AppError;
use serde_json::json;
use thiserror::Error;

/// Shown to clients for every failure that is not their fault.
pub const GENERIC_FAILURE: &str = "Something went wrong while answering. Please try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// The message a client may see.
    pub fn public_message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Internal(_) => GENERIC_FAILURE,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::InvalidPartition(_) => ApiError::BadRequest(err.to_string()),
            other => {
                tracing::error!(error = %other, upstream = other.is_upstream(), "Request failed");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(json!({ "status": "error", "message": self.public_message() }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_partition_is_client_error() {
        let err = ApiError::from(AppError::InvalidPartition("rugs".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.public_message().contains("rugs"));
    }

    #[test]
    fn test_upstream_details_are_hidden() {
        let err = ApiError::from(AppError::Store("password authentication failed".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), GENERIC_FAILURE);
    }
}
