use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{info, instrument};

use care_link_domain::auth::Principal;
use care_link_domain::entities::{Appointment, CreateAppointmentRequest, UpdateAppointmentStatusRequest};

use crate::api::state::AppointmentServiceRef;
use crate::entities::{ApiJson, ApiResult};
use crate::entities::ErrorResponse;

/// Appointments of the caller, as patient or as doctor
#[utoipa::path(
    get,
    path = "/api/appointments",
    responses(
        (status = 200, description = "Appointments, newest first", body = [Appointment]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "appointments"
)]
#[instrument(skip(service))]
pub async fn list_appointments(
    State(service): State<AppointmentServiceRef>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<Appointment>>> {
    Ok(Json(service.list(&principal).await?))
}

/// Book an appointment with a doctor
#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked as pending", body = Appointment),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Only patients can book", body = ErrorResponse),
        (status = 404, description = "Doctor not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "appointments"
)]
#[instrument(skip(service, request))]
pub async fn create_appointment(
    State(service): State<AppointmentServiceRef>,
    Extension(principal): Extension<Principal>,
    ApiJson(request): ApiJson<CreateAppointmentRequest>,
) -> ApiResult<impl IntoResponse> {
    let appointment = service.create(&principal, request).await?;
    info!("Appointment {} booked", appointment.id);
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Change the status of an appointment
#[utoipa::path(
    put,
    path = "/api/appointments/{id}",
    params(("id" = i64, Path, description = "Appointment ID")),
    request_body = UpdateAppointmentStatusRequest,
    responses(
        (status = 200, description = "Appointment updated", body = Appointment),
        (status = 403, description = "Not the appointment's doctor", body = ErrorResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "appointments"
)]
#[instrument(skip(service, request))]
pub async fn update_appointment_status(
    State(service): State<AppointmentServiceRef>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdateAppointmentStatusRequest>,
) -> ApiResult<Json<Appointment>> {
    Ok(Json(service.update_status(&principal, id, request).await?))
}

/// Delete an appointment
#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    params(("id" = i64, Path, description = "Appointment ID")),
    responses(
        (status = 204, description = "Appointment deleted"),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "appointments"
)]
#[instrument(skip(service))]
pub async fn delete_appointment(
    State(service): State<AppointmentServiceRef>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    service.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
