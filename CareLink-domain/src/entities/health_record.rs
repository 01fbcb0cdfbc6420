use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Kind of uploaded document. Each kind is stored in its own bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    LabReport,
    Prescription,
    MedicalDocument,
    Imaging,
}

impl RecordType {
    pub const ALL: [RecordType; 4] = [
        RecordType::LabReport,
        RecordType::Prescription,
        RecordType::MedicalDocument,
        RecordType::Imaging,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::LabReport => "lab_report",
            RecordType::Prescription => "prescription",
            RecordType::MedicalDocument => "medical_document",
            RecordType::Imaging => "imaging",
        }
    }

    /// Upload sub-directory for this kind
    pub fn bucket(&self) -> &'static str {
        match self {
            RecordType::LabReport => "lab_reports",
            RecordType::Prescription => "prescriptions",
            RecordType::MedicalDocument => "medical_documents",
            RecordType::Imaging => "imaging",
        }
    }
}

impl Default for RecordType {
    fn default() -> Self {
        RecordType::MedicalDocument
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown record type: {}", s))
    }
}

/// Uploaded health record metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HealthRecord {
    pub id: i64,
    pub patient_id: i64,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub title: String,
    /// Public path the file is served from
    pub file_url: String,
    pub notes: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// A file upload as received from the client
#[derive(Debug, Clone)]
pub struct UploadHealthRecord {
    pub record_type: RecordType,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub original_filename: String,
    pub content: Vec<u8>,
}
