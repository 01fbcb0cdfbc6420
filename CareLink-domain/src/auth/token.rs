use std::env;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::auth::Claims;

/// Security errors for authentication and token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// JWT validation error
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Invalid token structure
    #[error("Invalid token format")]
    InvalidToken,

    /// Token issued by someone else
    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// Subject claim is not a user id
    #[error("Invalid token subject")]
    InvalidSubject,

    /// Stored password hash could not be parsed
    #[error("Malformed password hash")]
    MalformedHash,

    /// Configuration error
    #[error("Security configuration error: {0}")]
    ConfigError(String),
}

const DEFAULT_ISSUER: &str = "care-link-api";
const DEFAULT_EXPIRATION_MINUTES: i64 = 30;

/// Settings for issuing and checking access tokens
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub issuer: String,
    pub expiration: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("issuer", &self.issuer)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>, expiration: Duration) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            expiration,
        }
    }

    /// Read `JWT_SECRET` (required), `JWT_ISSUER` and `ACCESS_TOKEN_EXPIRATION_MINUTES`
    pub fn from_env() -> Result<Self, SecurityError> {
        let secret = env::var("JWT_SECRET").map_err(|e| {
            error!("JWT_SECRET environment variable not found: {}", e);
            SecurityError::ConfigError("JWT_SECRET environment variable not found".to_string())
        })?;
        if secret.is_empty() {
            return Err(SecurityError::ConfigError("JWT_SECRET must not be empty".to_string()));
        }

        let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.to_string());
        let expiration_minutes = env::var("ACCESS_TOKEN_EXPIRATION_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(DEFAULT_EXPIRATION_MINUTES);

        Ok(Self::new(secret, issuer, Duration::minutes(expiration_minutes)))
    }
}

/// Issue an access token for a user
pub fn generate_token(config: &TokenConfig, user_id: i64) -> Result<String, SecurityError> {
    let now = Utc::now();
    let expiration = now + config.expiration;

    let claims = Claims {
        sub: user_id.to_string(),
        iss: config.issuer.clone(),
        iat: now.timestamp(),
        exp: expiration.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| {
        error!("Failed to encode JWT token: {}", e);
        SecurityError::TokenValidation(e.to_string())
    })?;

    // Log token generation (but not the token itself)
    info!("Generated access token for user {}", user_id);
    debug!("Token expiration: {}", expiration);

    Ok(token)
}

/// Validate a JWT token and return the decoded claims
pub fn validate_token(config: &TokenConfig, token: &str) -> Result<Claims, SecurityError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.set_issuer(&[config.issuer.as_str()]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidToken => SecurityError::InvalidToken,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => SecurityError::InvalidIssuer,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            SecurityError::TokenValidation("Invalid signature".to_string())
        }
        _ => SecurityError::TokenValidation(e.to_string()),
    })?;

    Ok(token_data.claims)
}

impl Claims {
    /// The user id carried in `sub`
    pub fn user_id(&self) -> Result<i64, SecurityError> {
        self.sub.parse().map_err(|_| SecurityError::InvalidSubject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TokenConfig {
        TokenConfig::new("test_secret_key_for_testing_only", "test-issuer", Duration::minutes(30))
    }

    #[test]
    fn test_generate_and_validate_token() {
        let config = test_config();
        let token = generate_token(&config, 42).unwrap();
        assert!(!token.is_empty());

        let claims = validate_token(&config, &token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_token_expiration() {
        let config = test_config();
        let claims = Claims {
            sub: "7".to_string(),
            iss: "test-issuer".to_string(),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test_secret_key_for_testing_only"),
        )
        .unwrap();

        match validate_token(&config, &token) {
            Err(SecurityError::TokenExpired) => {}
            other => panic!("Expected TokenExpired error but got: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = generate_token(&test_config(), 1).unwrap();
        let other = TokenConfig::new("another_secret", "test-issuer", Duration::minutes(30));
        assert!(validate_token(&other, &token).is_err());
    }

    #[test]
    fn test_wrong_issuer_is_rejected() {
        let token = generate_token(&test_config(), 1).unwrap();
        let other = TokenConfig::new("test_secret_key_for_testing_only", "someone-else", Duration::minutes(30));
        assert!(matches!(validate_token(&other, &token), Err(SecurityError::InvalidIssuer)));
    }

    #[test]
    fn test_invalid_token() {
        match validate_token(&test_config(), "invalid.token.format") {
            Err(SecurityError::InvalidToken) | Err(SecurityError::TokenValidation(_)) => {}
            other => panic!("Expected InvalidToken or TokenValidation error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_subject() {
        let claims = Claims {
            sub: "auth0|abc".to_string(),
            iss: "test-issuer".to_string(),
            iat: 0,
            exp: 0,
        };
        assert!(matches!(claims.user_id(), Err(SecurityError::InvalidSubject)));
    }
}
