use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use tracing::instrument;

use care_link_domain::auth::Principal;
use care_link_domain::entities::{CreatePrescriptionRequest, Prescription};

use crate::api::state::PrescriptionServiceRef;
use crate::entities::{ApiJson, ApiResult};
use crate::entities::ErrorResponse;

/// Prescriptions written for or by the caller
#[utoipa::path(
    get,
    path = "/api/prescriptions",
    responses(
        (status = 200, description = "Prescriptions, newest first", body = [Prescription]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "prescriptions"
)]
#[instrument(skip(service))]
pub async fn list_prescriptions(
    State(service): State<PrescriptionServiceRef>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<Prescription>>> {
    Ok(Json(service.list(&principal).await?))
}

/// Write a prescription for a patient
#[utoipa::path(
    post,
    path = "/api/prescriptions",
    request_body = CreatePrescriptionRequest,
    responses(
        (status = 201, description = "Prescription created", body = Prescription),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Only doctors can prescribe", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "prescriptions"
)]
#[instrument(skip(service, request))]
pub async fn create_prescription(
    State(service): State<PrescriptionServiceRef>,
    Extension(principal): Extension<Principal>,
    ApiJson(request): ApiJson<CreatePrescriptionRequest>,
) -> ApiResult<impl IntoResponse> {
    let prescription = service.create(&principal, request).await?;
    Ok((StatusCode::CREATED, Json(prescription)))
}
