pub mod pods;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::fabric::FabricError;

/// Error response — `{"error": "message"}`.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: msg.into() }
    }

    pub fn not_found(resource: &str) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: format!("{} not found", resource) }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self { status: StatusCode::CONFLICT, message: msg.into() }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: msg.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

/// Maps the typed `FabricError` enum to HTTP status codes, the same way the
/// decision table in §4.3 maps to the typed-error table in §7.
impl From<FabricError> for ApiError {
    fn from(err: FabricError) -> Self {
        match err {
            FabricError::PodNotFound(_) => Self::not_found(&err.to_string()),
            FabricError::AmbiguousPod(_) => Self::internal(err.to_string()),
            FabricError::TopologyInvalid(_) => Self::bad_request(err.to_string()),
            FabricError::AddressSpaceExhausted(_) => Self::bad_request(err.to_string()),
            FabricError::UnknownDeviceFamily(_) => Self::bad_request(err.to_string()),
            FabricError::RecreateRequired(_) => Self::conflict(err.to_string()),
            FabricError::InvalidDescription(_) => Self::bad_request(err.to_string()),
            FabricError::StoreFailure(_) => Self::internal(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}

pub async fn healthcheck() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "fabricgen",
    }))
}
