use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Prescription written by a doctor for a patient
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Prescription {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub medicine: String,
    pub dosage: String,
    pub timing: String,
    pub duration: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub patient_name: Option<String>,
    pub doctor_name: Option<String>,
}

/// Request payload for writing a prescription. The doctor is always the caller.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreatePrescriptionRequest {
    pub patient_id: i64,
    #[validate(length(min = 1, max = 100, message = "Medicine must be between 1 and 100 characters"))]
    pub medicine: String,
    #[validate(length(min = 1, max = 50, message = "Dosage must be between 1 and 50 characters"))]
    pub dosage: String,
    #[validate(length(min = 1, max = 100, message = "Timing must be between 1 and 100 characters"))]
    pub timing: String,
    #[validate(length(max = 50, message = "Duration cannot exceed 50 characters"))]
    pub duration: Option<String>,
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}
