use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage model for an uploaded health record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRecordRow {
    pub id: i64,
    pub patient_id: i64,
    /// "lab_report", "prescription", "medical_document" or "imaging"
    pub record_type: String,
    pub title: String,
    /// Public path of the stored file
    pub file_url: String,
    pub notes: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewHealthRecord {
    pub patient_id: i64,
    pub record_type: String,
    pub title: String,
    pub file_url: String,
    pub notes: Option<String>,
}
