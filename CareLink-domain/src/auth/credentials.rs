use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use validator::Validate;
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use care_link_data::models::user::NewUser;
use care_link_data::repository::{RepositoryError, UserRepositoryTrait};

use crate::auth::logging::{
    log_account_deletion, log_auth_event, log_failed_login, log_registration, log_successful_login, AuthEvent,
    AuthEventType,
};
use crate::auth::password::PasswordHasher;
use crate::auth::token::{generate_token, validate_token, TokenConfig};
use crate::auth::Principal;
use crate::entities::conversions::convert_to_domain_user;
use crate::entities::{Role, User};
use crate::services::{validate_request, ServiceError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,
    /// "patient" or "doctor"
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token issued on registration and login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AuthResponse {
    pub access_token: String,
    /// Always "bearer"
    pub token_type: String,
    pub user: User,
}

/// Registration, login and bearer token checks
#[async_trait]
pub trait CredentialServiceTrait: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, ServiceError>;

    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ServiceError>;

    /// Resolve a bearer token to the principal it was issued for.
    /// The role is read from storage, never from the token.
    async fn authenticate(&self, token: &str) -> Result<Principal, ServiceError>;

    async fn current_user(&self, principal: &Principal) -> Result<User, ServiceError>;

    /// Remove the account and the records only it owns
    async fn delete_account(&self, principal: &Principal) -> Result<(), ServiceError>;
}

pub struct CredentialService {
    users: Arc<dyn UserRepositoryTrait>,
    hasher: PasswordHasher,
    tokens: TokenConfig,
}

impl CredentialService {
    pub fn new(users: Arc<dyn UserRepositoryTrait>, hasher: PasswordHasher, tokens: TokenConfig) -> Self {
        Self { users, hasher, tokens }
    }

    fn issue(&self, user: User) -> Result<AuthResponse, ServiceError> {
        let access_token = generate_token(&self.tokens, user.id).map_err(|e| {
            error!("Failed to issue token for user {}: {}", user.id, e);
            ServiceError::Internal("Could not issue access token".to_string())
        })?;

        Ok(AuthResponse {
            access_token,
            token_type: "bearer".to_string(),
            user,
        })
    }

    /// Runs on the blocking pool
    async fn hash_password(&self, password: String) -> Result<String, ServiceError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ServiceError::Internal(format!("Password hashing task failed: {}", e)))
    }

    async fn verify_password(&self, password: String, encoded: Option<String>) -> Result<bool, ServiceError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || match encoded {
            Some(encoded) => hasher.verify(&password, &encoded),
            None => {
                hasher.verify_dummy(&password);
                Ok(false)
            }
        })
        .await
        .map_err(|e| ServiceError::Internal(format!("Password verification task failed: {}", e)))?
        .map_err(|e| {
            error!("Stored password hash is unusable: {}", e);
            ServiceError::Internal("Stored credentials are corrupt".to_string())
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn invalid_credentials() -> ServiceError {
    ServiceError::Authentication("Invalid email or password".to_string())
}

#[async_trait]
impl CredentialServiceTrait for CredentialService {
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, ServiceError> {
        validate_request(&request)?;

        let role: Role = request.role.parse().map_err(|_| {
            warn!("Registration rejected: invalid role {:?}", request.role);
            ServiceError::Validation("Role must be either patient or doctor".to_string())
        })?;

        let email = normalize_email(&request.email);
        if self.users.find_by_email(&email).await?.is_some() {
            warn!("Registration rejected: email already registered");
            return Err(ServiceError::Validation("Email already registered".to_string()));
        }

        let password_hash = self.hash_password(request.password).await?;
        let created = self
            .users
            .create(NewUser {
                name: request.name.trim().to_string(),
                email,
                password_hash,
                role: role.as_str().to_string(),
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration
                RepositoryError::Conflict(_) => ServiceError::Validation("Email already registered".to_string()),
                other => other.into(),
            })?;

        let user = convert_to_domain_user(created).map_err(ServiceError::Internal)?;
        log_registration(user.id, user.role.as_str());
        info!("Registered user {} as {}", user.id, user.role);
        self.issue(user)
    }

    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ServiceError> {
        validate_request(&request)?;

        let email = normalize_email(&request.email);
        let stored = self.users.find_by_email(&email).await?;

        let encoded = stored.as_ref().map(|row| row.password_hash.clone());
        let matches = self.verify_password(request.password, encoded).await?;

        let row = match stored {
            Some(row) if matches => row,
            Some(_) => {
                log_failed_login(&email, "wrong password");
                return Err(invalid_credentials());
            }
            None => {
                log_failed_login(&email, "unknown email");
                return Err(invalid_credentials());
            }
        };

        let user = convert_to_domain_user(row).map_err(ServiceError::Internal)?;
        log_successful_login(user.id);
        self.issue(user)
    }

    async fn authenticate(&self, token: &str) -> Result<Principal, ServiceError> {
        let claims = validate_token(&self.tokens, token).map_err(|e| {
            log_auth_event(
                AuthEvent::new(AuthEventType::TokenValidation, None, false)
                    .with_details(e.to_string())
                    .with_auth_method("jwt"),
            );
            ServiceError::Authentication("Invalid or expired token".to_string())
        })?;

        let user_id = claims
            .user_id()
            .map_err(|e| ServiceError::Authentication(e.to_string()))?;

        let row = self.users.find_by_id(user_id).await?.ok_or_else(|| {
            log_auth_event(
                AuthEvent::new(AuthEventType::TokenValidation, Some(&claims.sub), false)
                    .with_details("subject no longer exists")
                    .with_auth_method("jwt"),
            );
            ServiceError::Authentication("User no longer exists".to_string())
        })?;

        let role: Role = row.role.parse().map_err(ServiceError::Internal)?;
        Ok(Principal { user_id, role })
    }

    async fn current_user(&self, principal: &Principal) -> Result<User, ServiceError> {
        let row = self
            .users
            .find_by_id(principal.user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", principal.user_id)))?;
        convert_to_domain_user(row).map_err(ServiceError::Internal)
    }

    async fn delete_account(&self, principal: &Principal) -> Result<(), ServiceError> {
        self.users
            .delete_with_owned_records(principal.user_id)
            .await
            .map_err(|e| match e {
                RepositoryError::ForeignKey(_) => ServiceError::Validation(
                    "Account is still referenced by appointments, prescriptions, messages or health records"
                        .to_string(),
                ),
                other => other.into(),
            })?;

        log_account_deletion(principal.user_id);
        Ok(())
    }
}
