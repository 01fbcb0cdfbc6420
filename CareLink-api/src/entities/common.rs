use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;

use care_link_domain::services::ServiceError;

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable code such as `validation_error` or `not_found`
    pub error: String,

    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
        }
    }
}

/// Errors produced while handling a request
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Malformed body or form before it reaches a service
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::Service(ServiceError::Validation(message)) | ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new("validation_error", message.clone()))
            }
            ApiError::Service(ServiceError::Authentication(message)) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("authentication_error", message.clone()),
            ),
            ApiError::Service(ServiceError::Forbidden(message)) => {
                (StatusCode::FORBIDDEN, ErrorResponse::new("forbidden", message.clone()))
            }
            ApiError::Service(ServiceError::NotFound(message)) => {
                (StatusCode::NOT_FOUND, ErrorResponse::new("not_found", message.clone()))
            }
            ApiError::PayloadTooLarge(message) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorResponse::new("payload_too_large", message.clone()),
            ),
            ApiError::Service(ServiceError::Internal(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("internal_error", "An unexpected error occurred"),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected with {}: {}", status.as_u16(), body.message);
        }
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// JSON body extractor whose rejections use [`ErrorResponse`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Multipart fields of an upload, for the OpenAPI document
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadHealthRecordForm {
    /// The document itself
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// lab_report, prescription, medical_document or imaging
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    pub title: Option<String>,
    pub notes: Option<String>,
}
