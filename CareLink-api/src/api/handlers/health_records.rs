use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{debug, info, instrument};

use care_link_domain::auth::Principal;
use care_link_domain::entities::{HealthRecord, RecordType, UploadHealthRecord};

use crate::api::state::HealthRecordServiceRef;
use crate::entities::{ApiError, ApiResult};
use crate::entities::{ErrorResponse, UploadHealthRecordForm};

/// The caller's uploaded documents
#[utoipa::path(
    get,
    path = "/api/health-records",
    responses(
        (status = 200, description = "Health records, newest first", body = [HealthRecord]),
        (status = 403, description = "Only patients keep health records", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "health_records"
)]
#[instrument(skip(service))]
pub async fn list_health_records(
    State(service): State<HealthRecordServiceRef>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<HealthRecord>>> {
    Ok(Json(service.list(&principal).await?))
}

/// Upload a document as `multipart/form-data`
#[utoipa::path(
    post,
    path = "/api/health-records",
    request_body(content = UploadHealthRecordForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document stored", body = HealthRecord),
        (status = 400, description = "Missing, empty or oversized file", body = ErrorResponse),
        (status = 403, description = "Only patients can upload", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "health_records"
)]
#[instrument(skip(service, multipart))]
pub async fn upload_health_record(
    State(service): State<HealthRecordServiceRef>,
    Extension(principal): Extension<Principal>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    // Deny before buffering the file
    service.authorize_upload(&principal).await?;
    let upload = read_upload(multipart).await?;
    info!(
        "Received {} ({} bytes) as {}",
        upload.original_filename,
        upload.content.len(),
        upload.record_type
    );
    let record = service.upload(&principal, upload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    delete,
    path = "/api/health-records/{id}",
    params(("id" = i64, Path, description = "Health record ID")),
    responses(
        (status = 204, description = "Record and file deleted"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Record not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "health_records"
)]
#[instrument(skip(service))]
pub async fn delete_health_record(
    State(service): State<HealthRecordServiceRef>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    service.delete(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn read_upload(mut multipart: Multipart) -> ApiResult<UploadHealthRecord> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut record_type = RecordType::default();
    let mut title = None;
    let mut notes = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("document").to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some((filename, bytes.to_vec()));
            }
            "type" => {
                let value = field.text().await.map_err(multipart_error)?;
                if !value.trim().is_empty() {
                    record_type = value.trim().parse().map_err(ApiError::BadRequest)?;
                }
            }
            "title" => title = Some(field.text().await.map_err(multipart_error)?),
            "notes" => notes = Some(field.text().await.map_err(multipart_error)?),
            other => debug!("Ignoring unknown form field {:?}", other),
        }
    }

    let (original_filename, content) =
        file.ok_or_else(|| ApiError::BadRequest("The form must include a file field".to_string()))?;

    Ok(UploadHealthRecord {
        record_type,
        title,
        notes,
        original_filename,
        content,
    })
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}
