use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage model for a prescription, joined with both participant names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionRow {
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

/// Input data for writing a prescription
#[derive(Debug, Clone)]
pub struct NewPrescription {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub medicine: String,
    pub dosage: String,
    pub timing: String,
    pub duration: Option<String>,
    pub notes: Option<String>,
}
