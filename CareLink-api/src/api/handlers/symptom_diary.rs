use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::instrument;

use care_link_domain::auth::Principal;
use care_link_domain::entities::{CreateSymptomEntryRequest, SymptomEntry};

use crate::api::state::SymptomDiaryServiceRef;
use crate::entities::{ApiJson, ApiResult};
use crate::entities::ErrorResponse;

#[utoipa::path(
    get,
    path = "/api/symptom-diary",
    responses(
        (status = 200, description = "Diary entries, newest first", body = [SymptomEntry]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "symptom_diary"
)]
#[instrument(skip(service))]
pub async fn list_symptom_entries(
    State(service): State<SymptomDiaryServiceRef>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<SymptomEntry>>> {
    Ok(Json(service.list(&principal).await?))
}

/// Record symptoms. The date defaults to now.
#[utoipa::path(
    post,
    path = "/api/symptom-diary",
    request_body = CreateSymptomEntryRequest,
    responses(
        (status = 201, description = "Entry recorded", body = SymptomEntry),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "symptom_diary"
)]
#[instrument(skip(service, request))]
pub async fn create_symptom_entry(
    State(service): State<SymptomDiaryServiceRef>,
    Extension(principal): Extension<Principal>,
    ApiJson(request): ApiJson<CreateSymptomEntryRequest>,
) -> ApiResult<impl IntoResponse> {
    let entry = service.create(&principal, request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    delete,
    path = "/api/symptom-diary/{id}",
    params(("id" = i64, Path, description = "Diary entry ID")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "symptom_diary"
)]
#[instrument(skip(service))]
pub async fn delete_symptom_entry(
    State(service): State<SymptomDiaryServiceRef>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    service.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
