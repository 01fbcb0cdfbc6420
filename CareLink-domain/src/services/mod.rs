// Domain services
// Each service checks input, asks the authorizer, then talks to its repositories.
pub mod appointment;
pub mod dashboard;
pub mod doctor;
pub mod health_record;
pub mod medication;
pub mod message;
pub mod prescription;
pub mod reminder;
pub mod symptom_diary;

use thiserror::Error;
use tracing::error;
use validator::{Validate, ValidationErrors};

use care_link_data::repository::RepositoryError;

use crate::auth::authorize::DenyReason;

// Re-export service traits and implementations
pub use appointment::{AppointmentService, AppointmentServiceTrait};
pub use dashboard::{DashboardService, DashboardServiceTrait};
pub use doctor::{DoctorService, DoctorServiceTrait};
pub use health_record::{HealthRecordService, HealthRecordServiceTrait};
pub use medication::{MedicationService, MedicationServiceTrait};
pub use message::{MessageService, MessageServiceTrait};
pub use prescription::{PrescriptionService, PrescriptionServiceTrait};
pub use reminder::{ReminderService, ReminderServiceTrait};
pub use symptom_diary::{SymptomDiaryService, SymptomDiaryServiceTrait};

/// Errors returned by every domain service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Bad input, duplicate email, invalid role
    #[error("Validation error: {0}")]
    Validation(String),

    /// Bad credentials or token
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Wrong role or not the owner
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Missing record, or a record the caller has no relationship to
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage or configuration failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => ServiceError::Validation(msg),
            RepositoryError::Conflict(msg) => ServiceError::Validation(msg),
            RepositoryError::ForeignKey(msg) => ServiceError::Validation(msg),
            other => {
                error!("Repository failure: {}", other);
                ServiceError::Internal(other.to_string())
            }
        }
    }
}

impl From<DenyReason> for ServiceError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::WrongRole { required } => {
                ServiceError::Forbidden(format!("Only a {} can perform this action", required))
            }
            DenyReason::NotOwner => {
                ServiceError::Forbidden("You do not have access to this resource".to_string())
            }
            DenyReason::NotLinked => {
                ServiceError::NotFound("No appointment links you to this patient".to_string())
            }
            DenyReason::NotFound(kind) => ServiceError::NotFound(format!("{} not found", kind)),
        }
    }
}

/// Turn validator field errors into one readable message
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let error_msgs: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, error_msgs.join(", "))
        })
        .collect();
    // HashMap order is unstable
    messages.sort();
    messages.join("; ")
}

/// Run the validator derive on a request
pub fn validate_request<T: Validate>(request: &T) -> Result<(), ServiceError> {
    request
        .validate()
        .map_err(|errors| ServiceError::Validation(validation_message(&errors)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::authorize::ResourceKind;
    use crate::entities::Role;

    #[test]
    fn test_deny_reasons_map_to_taxonomy() {
        assert!(matches!(
            ServiceError::from(DenyReason::WrongRole { required: Role::Doctor }),
            ServiceError::Forbidden(_)
        ));
        assert!(matches!(ServiceError::from(DenyReason::NotOwner), ServiceError::Forbidden(_)));
        assert!(matches!(ServiceError::from(DenyReason::NotLinked), ServiceError::NotFound(_)));
        assert!(matches!(
            ServiceError::from(DenyReason::NotFound(ResourceKind::Appointment)),
            ServiceError::NotFound(_)
        ));
    }

    #[test]
    fn test_repository_errors_map_to_taxonomy() {
        assert!(matches!(
            ServiceError::from(RepositoryError::Conflict("email".into())),
            ServiceError::Validation(_)
        ));
        assert!(matches!(
            ServiceError::from(RepositoryError::NotFound("user 1".into())),
            ServiceError::NotFound(_)
        ));
    }
}
