use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use tracing::{info, instrument};

use care_link_domain::auth::{AuthResponse, LoginRequest, Principal, RegisterRequest};
use care_link_domain::entities::User;

use crate::api::state::CredentialServiceRef;
use crate::entities::{ApiJson, ApiResult};
use crate::entities::ErrorResponse;

/// Create an account and return an access token
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input, role or duplicate email", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn register(
    State(credentials): State<CredentialServiceRef>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let response = credentials.register(request).await?;
    info!("Account {} registered", response.user.id);
    Ok((StatusCode::CREATED, Json(response)))
}

/// Exchange email and password for an access token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    State(credentials): State<CredentialServiceRef>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    Ok(Json(credentials.login(request).await?))
}

/// The authenticated user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(skip(credentials))]
pub async fn me(
    State(credentials): State<CredentialServiceRef>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<User>> {
    Ok(Json(credentials.current_user(&principal).await?))
}

/// Delete the authenticated account
#[utoipa::path(
    delete,
    path = "/api/auth/me",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 400, description = "Account is still referenced by shared records", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(skip(credentials))]
pub async fn delete_me(
    State(credentials): State<CredentialServiceRef>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<StatusCode> {
    credentials.delete_account(&principal).await?;
    Ok(StatusCode::NO_CONTENT)
}
