use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::domain::DomainError;

const GENERIC_ERROR: &str = "internal server error";

/// Maps a [`DomainError`] to an HTTP response. Only input errors carry their
/// message; everything else gets a generic body.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self(error)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self.0 {
            DomainError::InvalidInput(message) => message,
            _ => GENERIC_ERROR.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
