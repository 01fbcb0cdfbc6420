//! Authentication and authorization for the CareLink API
//!
//! Passwords are hashed with PBKDF2, access tokens are HS256 JWTs, and every
//! resource access goes through the [`authorize::Authorizer`].

#[cfg(feature = "with-axum")]
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
#[cfg(feature = "with-axum")]
use serde_json::json;
#[cfg(feature = "with-axum")]
use std::sync::Arc;
#[cfg(feature = "with-axum")]
use tracing::{debug, error};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::Role;
#[cfg(feature = "with-axum")]
use crate::auth::logging::{log_auth_event, AuthEvent, AuthEventType};
#[cfg(feature = "with-axum")]
use crate::services::ServiceError;

pub mod authorize;
pub mod credentials;
pub mod logging;
pub mod password;
pub mod token;

pub use credentials::{AuthResponse, CredentialService, CredentialServiceTrait, LoginRequest, RegisterRequest};

/// Authentication claims for JSON Web Tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// The authenticated caller. Passed explicitly to every service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: i64,
    pub role: Role,
}

/// Authentication middleware for protected routes.
///
/// Resolves the bearer token and stores the [`Principal`] in the request
/// extensions. Missing or invalid credentials end the request with 401.
#[cfg(feature = "with-axum")]
pub async fn auth_middleware(
    State(credentials): State<Arc<dyn CredentialServiceTrait>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let request_path = req.uri().path().to_string();
    let start_time = std::time::Instant::now();

    let token = match bearer_token(&req) {
        Ok(token) => token.to_string(),
        Err(reason) => {
            debug!("Rejected request to {}: {}", request_path, reason);
            log_auth_event(
                AuthEvent::new(AuthEventType::TokenValidation, None, false)
                    .with_details(reason)
                    .with_resource(request_path)
                    .with_duration(start_time.elapsed().as_millis() as u64)
                    .with_auth_method("jwt"),
            );
            return unauthorized(reason);
        }
    };

    match credentials.authenticate(&token).await {
        Ok(principal) => {
            debug!("Authenticated user {} ({}) for {}", principal.user_id, principal.role, request_path);
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(ServiceError::Authentication(message)) => unauthorized(&message),
        Err(err) => {
            error!("Authentication lookup failed for {}: {}", request_path, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An internal error occurred",
                })),
            )
                .into_response()
        }
    }
}

#[cfg(feature = "with-axum")]
fn bearer_token(req: &Request<Body>) -> Result<&str, &'static str> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err("Authorization header does not contain a Bearer token"),
    }
}

#[cfg(feature = "with-axum")]
fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        Json(json!({
            "error": "authentication_error",
            "message": message,
        })),
    )
        .into_response()
}
