use axum::{extract::State, Extension, Json};
use tracing::instrument;

use care_link_domain::auth::Principal;
use care_link_domain::entities::PatientDashboard;

use crate::api::state::DashboardServiceRef;
use crate::entities::ApiResult;
use crate::entities::ErrorResponse;

/// Medications, reminders, upcoming approved appointments and refill alerts
#[utoipa::path(
    get,
    path = "/api/patients/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = PatientDashboard),
        (status = 403, description = "Only patients have a dashboard", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "patients"
)]
#[instrument(skip(service))]
pub async fn dashboard(
    State(service): State<DashboardServiceRef>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<PatientDashboard>> {
    Ok(Json(service.patient_dashboard(&principal).await?))
}
