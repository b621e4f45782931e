//! Error taxonomy of the HTTP surface and its status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::location::LocationError;
use crate::normalize::NormalizeError;
use crate::views::DivisionNotFound;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    DivisionNotFound(#[from] DivisionNotFound),
    #[error("Chart computation failed: {0:#}")]
    Engine(anyhow::Error),
}

impl From<NormalizeError> for ApiError {
    fn from(err: NormalizeError) -> Self {
        ApiError::Validation {
            field: err.field(),
            message: err.to_string(),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Location(err) => match err {
                LocationError::NotFound(_) => StatusCode::NOT_FOUND,
                LocationError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                LocationError::Service(_) | LocationError::TimezoneService(_) => StatusCode::SERVICE_UNAVAILABLE,
                LocationError::TimezoneIndeterminate(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::DivisionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Engine(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("Request failed ({}): {}", status, self);
        } else {
            debug!("Request rejected ({}): {}", status, self);
        }

        let mut body = json!({ "detail": self.to_string() });
        match &self {
            ApiError::Validation { field, .. } => body["field"] = json!(field),
            ApiError::DivisionNotFound(err) => body["available"] = json!(err.available),
            _ => {}
        }
        (status, Json(body)).into_response()
    }
}
