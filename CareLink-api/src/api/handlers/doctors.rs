use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::instrument;

use care_link_domain::auth::Principal;
use care_link_domain::entities::{PatientRecords, User};

use crate::api::state::DoctorServiceRef;
use crate::entities::ApiResult;
use crate::entities::ErrorResponse;

/// Patients with at least one appointment with the calling doctor
#[utoipa::path(
    get,
    path = "/api/doctors/patients",
    responses(
        (status = 200, description = "Patients ordered by name", body = [User]),
        (status = 403, description = "Only doctors have patients", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "doctors"
)]
#[instrument(skip(service))]
pub async fn list_patients(
    State(service): State<DoctorServiceRef>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(service.list_patients(&principal).await?))
}

/// Health records and recent symptoms of a linked patient
#[utoipa::path(
    get,
    path = "/api/doctors/patient/{patient_id}/records",
    params(("patient_id" = i64, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient records", body = PatientRecords),
        (status = 403, description = "Only doctors can view patient records", body = ErrorResponse),
        (status = 404, description = "Unknown patient or no appointment with them", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "doctors"
)]
#[instrument(skip(service))]
pub async fn patient_records(
    State(service): State<DoctorServiceRef>,
    Extension(principal): Extension<Principal>,
    Path(patient_id): Path<i64>,
) -> ApiResult<Json<PatientRecords>> {
    Ok(Json(service.patient_records(&principal, patient_id).await?))
}
