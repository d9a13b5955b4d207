//! API error type that maps internal failures to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::data::LoadError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("data load failed: {0}")]
    DataLoad(#[from] LoadError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (error_type, message) = match &self {
            ApiError::DataLoad(err) => ("data_load_error", err.to_string()),
            ApiError::Internal(msg) => ("internal_error", msg.clone()),
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
