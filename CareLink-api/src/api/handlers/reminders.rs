use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::instrument;

use care_link_domain::auth::Principal;
use care_link_domain::entities::{CreateReminderRequest, Reminder, UpdateReminderRequest};

use crate::api::state::ReminderServiceRef;
use crate::entities::{ApiJson, ApiResult};
use crate::entities::ErrorResponse;

/// Active reminders of the caller
#[utoipa::path(
    get,
    path = "/api/reminders",
    responses(
        (status = 200, description = "Active reminders ordered by time", body = [Reminder]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reminders"
)]
#[instrument(skip(service))]
pub async fn list_reminders(
    State(service): State<ReminderServiceRef>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<Reminder>>> {
    Ok(Json(service.list(&principal).await?))
}

#[utoipa::path(
    post,
    path = "/api/reminders",
    request_body = CreateReminderRequest,
    responses(
        (status = 201, description = "Reminder created", body = Reminder),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reminders"
)]
#[instrument(skip(service, request))]
pub async fn create_reminder(
    State(service): State<ReminderServiceRef>,
    Extension(principal): Extension<Principal>,
    ApiJson(request): ApiJson<CreateReminderRequest>,
) -> ApiResult<impl IntoResponse> {
    let reminder = service.create(&principal, request).await?;
    Ok((StatusCode::CREATED, Json(reminder)))
}

#[utoipa::path(
    put,
    path = "/api/reminders/{id}",
    params(("id" = i64, Path, description = "Reminder ID")),
    request_body = UpdateReminderRequest,
    responses(
        (status = 200, description = "Reminder updated", body = Reminder),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Reminder not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reminders"
)]
#[instrument(skip(service, request))]
pub async fn update_reminder(
    State(service): State<ReminderServiceRef>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdateReminderRequest>,
) -> ApiResult<Json<Reminder>> {
    Ok(Json(service.update(&principal, id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/reminders/{id}",
    params(("id" = i64, Path, description = "Reminder ID")),
    responses(
        (status = 204, description = "Reminder deleted"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Reminder not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reminders"
)]
#[instrument(skip(service))]
pub async fn delete_reminder(
    State(service): State<ReminderServiceRef>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    service.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
