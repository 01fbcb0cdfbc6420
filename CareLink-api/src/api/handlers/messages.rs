use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::instrument;

use care_link_domain::auth::Principal;
use care_link_domain::entities::{Message, SendMessageRequest};

use crate::api::state::MessageServiceRef;
use crate::entities::{ApiJson, ApiResult};
use crate::entities::ErrorResponse;

/// Messages sent or received by the caller
#[utoipa::path(
    get,
    path = "/api/messages",
    responses(
        (status = 200, description = "Messages, newest first", body = [Message]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "messages"
)]
#[instrument(skip(service))]
pub async fn list_messages(
    State(service): State<MessageServiceRef>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<Message>>> {
    Ok(Json(service.list(&principal).await?))
}

#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Receiver not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "messages"
)]
#[instrument(skip(service, request))]
pub async fn send_message(
    State(service): State<MessageServiceRef>,
    Extension(principal): Extension<Principal>,
    ApiJson(request): ApiJson<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let message = service.send(&principal, request).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Conversation between the caller and another user, oldest first
#[utoipa::path(
    get,
    path = "/api/messages/chat/{user_id}",
    params(("user_id" = i64, Path, description = "The other participant")),
    responses(
        (status = 200, description = "Conversation", body = [Message]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "messages"
)]
#[instrument(skip(service))]
pub async fn chat_history(
    State(service): State<MessageServiceRef>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<Message>>> {
    Ok(Json(service.chat_history(&principal, user_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/messages/{id}/read",
    params(("id" = i64, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message marked as read", body = Message),
        (status = 403, description = "Not the receiver", body = ErrorResponse),
        (status = 404, description = "Message not found", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "messages"
)]
#[instrument(skip(service))]
pub async fn mark_message_read(
    State(service): State<MessageServiceRef>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Message>> {
    Ok(Json(service.mark_read(&principal, id).await?))
}
