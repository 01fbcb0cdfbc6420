use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Types of authentication events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventType {
    /// Successful login
    Login,
    /// User registration
    Registration,
    /// Failed login attempt
    FailedLogin,
    /// Access denied to resource
    AccessDenied,
    /// Bearer token check
    TokenValidation,
    /// Account removed by its owner
    AccountDeletion,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventType::Login => write!(f, "LOGIN"),
            AuthEventType::Registration => write!(f, "REGISTRATION"),
            AuthEventType::FailedLogin => write!(f, "FAILED_LOGIN"),
            AuthEventType::AccessDenied => write!(f, "ACCESS_DENIED"),
            AuthEventType::TokenValidation => write!(f, "TOKEN_VALIDATION"),
            AuthEventType::AccountDeletion => write!(f, "ACCOUNT_DELETION"),
        }
    }
}

/// Authentication event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub event_type: AuthEventType,
    /// User id or email, when known
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub details: Option<String>,
    /// The resource being accessed (if applicable)
    pub resource: Option<String>,
    /// Duration of the operation in milliseconds (if applicable)
    pub duration_ms: Option<u64>,
    /// Authentication method used (password, jwt)
    pub auth_method: Option<String>,
}

impl AuthEvent {
    /// Create a new authentication event
    pub fn new(event_type: AuthEventType, user_id: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            user_id: user_id.map(String::from),
            timestamp: Utc::now(),
            success,
            details: None,
            resource: None,
            duration_ms: None,
            auth_method: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_auth_method(mut self, auth_method: impl Into<String>) -> Self {
        self.auth_method = Some(auth_method.into());
        self
    }

    /// Render the audit line
    pub fn log_line(&self) -> String {
        let user_id_str = self.user_id.as_deref().unwrap_or("anonymous");
        let status = if self.success { "SUCCESS" } else { "FAILURE" };
        let mut details = self.details.clone().unwrap_or_default();
        if let Some(resource) = &self.resource {
            if !details.is_empty() {
                details.push(' ');
            }
            details.push_str(&format!("resource={}", resource));
        }

        format!(
            "AUTH-LOG [{}] [{}] [{}] [{}] {}",
            self.event_type,
            user_id_str,
            status,
            self.timestamp.to_rfc3339(),
            details
        )
    }
}

/// Log an authentication event
pub fn log_auth_event(event: AuthEvent) {
    if event.success {
        info!("{}", event.log_line());
    } else {
        warn!("{}", event.log_line());
    }
}

pub fn log_registration(user_id: i64, role: &str) {
    let event = AuthEvent::new(AuthEventType::Registration, Some(&user_id.to_string()), true)
        .with_details(format!("role={}", role))
        .with_auth_method("password");
    log_auth_event(event);
}

/// Log a successful login
pub fn log_successful_login(user_id: i64) {
    let event = AuthEvent::new(AuthEventType::Login, Some(&user_id.to_string()), true)
        .with_auth_method("password");
    log_auth_event(event);
}

/// Log a failed login attempt
pub fn log_failed_login(email: &str, reason: &str) {
    let event = AuthEvent::new(AuthEventType::FailedLogin, Some(email), false)
        .with_details(reason)
        .with_auth_method("password");
    log_auth_event(event);
}

/// Log an access denied event
pub fn log_access_denied(user_id: i64, resource: &str, details: &str) {
    let event = AuthEvent::new(AuthEventType::AccessDenied, Some(&user_id.to_string()), false)
        .with_resource(resource)
        .with_details(details);
    log_auth_event(event);
}

pub fn log_account_deletion(user_id: i64) {
    let event = AuthEvent::new(AuthEventType::AccountDeletion, Some(&user_id.to_string()), true);
    log_auth_event(event);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_auth_event() {
        let event = AuthEvent::new(AuthEventType::Login, Some("user123"), true)
            .with_details("Login from dashboard")
            .with_resource("/api/auth/login")
            .with_duration(150)
            .with_auth_method("password");

        assert_eq!(event.event_type, AuthEventType::Login);
        assert_eq!(event.user_id, Some("user123".to_string()));
        assert!(event.success);
        assert_eq!(event.details, Some("Login from dashboard".to_string()));
        assert_eq!(event.resource, Some("/api/auth/login".to_string()));
        assert_eq!(event.duration_ms, Some(150));
        assert_eq!(event.auth_method, Some("password".to_string()));
    }

    #[test]
    fn test_event_type_display() {
        assert_eq!(AuthEventType::AccessDenied.to_string(), "ACCESS_DENIED");
        assert_eq!(AuthEventType::FailedLogin.to_string(), "FAILED_LOGIN");
        assert_eq!(AuthEventType::TokenValidation.to_string(), "TOKEN_VALIDATION");
    }

    #[test]
    fn test_log_line_format() {
        let line = AuthEvent::new(AuthEventType::AccessDenied, Some("5"), false)
            .with_details("action=update reason=not_owner")
            .with_resource("appointment")
            .log_line();

        assert!(line.starts_with("AUTH-LOG [ACCESS_DENIED] [5] [FAILURE] ["));
        assert!(line.ends_with("action=update reason=not_owner resource=appointment"));
    }

    #[test]
    fn test_anonymous_event() {
        let line = AuthEvent::new(AuthEventType::TokenValidation, None, false).log_line();
        assert!(line.contains("[anonymous]"));
    }
}
