use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::instrument;

use care_link_domain::auth::Principal;
use care_link_domain::entities::{CreateMedicationRequest, Medication, UpdateMedicationRequest};

use crate::api::state::MedicationServiceRef;
use crate::entities::{ApiJson, ApiResult};
use crate::entities::ErrorResponse;

/// The caller's medications with their stock level
#[utoipa::path(
    get,
    path = "/api/medications",
    responses(
        (status = 200, description = "Medications ordered by time", body = [Medication]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(service))]
pub async fn list_medications(
    State(service): State<MedicationServiceRef>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<Medication>>> {
    Ok(Json(service.list(&principal).await?))
}

#[utoipa::path(
    get,
    path = "/api/medications/{id}",
    params(("id" = i64, Path, description = "Medication ID")),
    responses(
        (status = 200, description = "Medication found", body = Medication),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Medication not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(service))]
pub async fn get_medication(
    State(service): State<MedicationServiceRef>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Medication>> {
    Ok(Json(service.get(&principal, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/medications",
    request_body = CreateMedicationRequest,
    responses(
        (status = 201, description = "Medication added", body = Medication),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(service, request))]
pub async fn create_medication(
    State(service): State<MedicationServiceRef>,
    Extension(principal): Extension<Principal>,
    ApiJson(request): ApiJson<CreateMedicationRequest>,
) -> ApiResult<impl IntoResponse> {
    let medication = service.create(&principal, request).await?;
    Ok((StatusCode::CREATED, Json(medication)))
}

/// Change only the fields present in the body
#[utoipa::path(
    put,
    path = "/api/medications/{id}",
    params(("id" = i64, Path, description = "Medication ID")),
    request_body = UpdateMedicationRequest,
    responses(
        (status = 200, description = "Medication updated", body = Medication),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Medication not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(service, request))]
pub async fn update_medication(
    State(service): State<MedicationServiceRef>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdateMedicationRequest>,
) -> ApiResult<Json<Medication>> {
    Ok(Json(service.update(&principal, id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/medications/{id}",
    params(("id" = i64, Path, description = "Medication ID")),
    responses(
        (status = 204, description = "Medication deleted"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Medication not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(service))]
pub async fn delete_medication(
    State(service): State<MedicationServiceRef>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    service.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
